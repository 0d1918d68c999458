//! Seams between the engine and whatever hosts it.
//!
//! The engine never looks anything up globally: every pane, control and
//! asynchronous service it talks to is handed in as one of these traits.

use anyhow::Result;
use async_trait::async_trait;

use crate::export::{ExportDecision, ExportForm, ExportOptions};
use crate::layout::ContainerGeometry;

/// The text-editing widget.
pub trait EditorWidget {
    fn get_value(&self) -> String;
    fn set_value(&mut self, text: &str);
    /// Move the cursor to a 1-based position and scroll it into view.
    fn reveal_position(&mut self, line: usize, column: usize);
    fn focus(&mut self);
    fn set_theme(&mut self, theme: &str);
    fn scroll_to_top(&mut self);
}

/// Anything with a vertical scroll offset.
pub trait ScrollPane {
    fn scroll_top(&self) -> f64;
    fn scroll_height(&self) -> f64;
    fn client_height(&self) -> f64;
    fn scroll_to(&mut self, top: f64);
}

/// The rendered preview region.
pub trait PreviewPane: ScrollPane {
    /// Replace everything currently displayed.
    fn replace_contents(&mut self, html: &str);
}

/// Buttons, labels and modal prompts around the two panes.
pub trait Controls {
    fn set_sync_checkbox(&mut self, checked: bool);
    fn set_copy_label(&mut self, label: &str);
    fn set_theme_label(&mut self, label: &str);
    fn set_code_theme_label(&mut self, label: &str);
    fn set_markdown_stylesheet(&mut self, href: &str);
    /// Blocking yes/no prompt.
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

/// Divider, panes and document-wide pointer state of the split view.
pub trait SplitSurface {
    fn geometry(&self) -> ContainerGeometry;
    fn set_pane_widths(&mut self, left: f64, right: f64);
    fn set_divider_hover(&mut self, hover: bool);
    fn set_divider_active(&mut self, active: bool);
    fn set_resize_cursor(&mut self, resizing: bool);
    fn set_selection_suppressed(&mut self, suppressed: bool);
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

#[async_trait]
pub trait ExportDialog: Send + Sync {
    /// Suspends until the user confirms or cancels the options form.
    async fn request_export_options(&mut self, defaults: &ExportForm) -> ExportDecision;
}

#[async_trait]
pub trait DocumentExporter: Send + Sync {
    async fn save(&mut self, html: &str, options: &ExportOptions) -> Result<()>;
}
