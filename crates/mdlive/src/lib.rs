// mdlive library exports

pub mod config;
pub mod export;
pub mod headless;
pub mod layout;
pub mod render;
pub mod scroll_sync;
pub mod session;
pub mod status_label;
pub mod store;
pub mod surface;
pub mod template;
pub mod theme;

pub use config::Config;
pub use layout::{LayoutEvent, SplitLayout};
pub use render::RenderPipeline;
pub use scroll_sync::{ScrollSync, SourceScroll};
pub use session::{Session, SessionEvent, Surfaces};
pub use store::{FileBackend, MemoryBackend, SessionStore, StorageBackend};
