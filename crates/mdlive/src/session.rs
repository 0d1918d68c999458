use anyhow::Result;
use chrono::Local;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::export::{ExportDecision, ExportForm, ExportOptions, NOTHING_TO_EXPORT};
use crate::layout::{LayoutEvent, SplitLayout};
use crate::render::RenderPipeline;
use crate::scroll_sync::{ScrollSync, SourceScroll};
use crate::status_label::TransientLabel;
use crate::store::{far_future, SessionStore};
use crate::surface::{
    Clipboard, Controls, DocumentExporter, EditorWidget, ExportDialog, PreviewPane,
};
use crate::template::DEFAULT_TEMPLATE;
use crate::theme::{ThemeChange, ThemeState};

pub const RESET_CONFIRMATION: &str = "Are you sure you want to reset? Your changes will be lost.";

/// Everything the host delivers to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The editor's content changed; the new text is read from the widget.
    ContentChanged,
    SourceScrolled(SourceScroll),
    ScrollSyncToggled(bool),
    ResetRequested,
    CopyRequested,
    ExportRequested,
    ThemeToggled,
    CodeThemeToggled,
    Layout(LayoutEvent),
    /// Clock tick used to expire transient labels.
    Tick(Instant),
}

/// Mutable per-session flags, owned by the controller.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Content has diverged from the default template since the last
    /// programmatic install.
    pub has_edited: bool,
    /// Last content seen from the editor.
    pub content: String,
}

/// Panes, controls and asynchronous services the controller drives.
pub struct Surfaces {
    pub editor: Box<dyn EditorWidget>,
    pub preview: Box<dyn PreviewPane>,
    pub controls: Box<dyn Controls>,
    pub clipboard: Box<dyn Clipboard>,
    pub export_dialog: Box<dyn ExportDialog>,
    pub exporter: Box<dyn DocumentExporter>,
}

pub struct Session {
    config: Config,
    state: SessionState,
    store: SessionStore,
    pipeline: RenderPipeline,
    scroll_sync: ScrollSync,
    layout: SplitLayout,
    theme: ThemeState,
    copy_label: TransientLabel,
    surfaces: Surfaces,
}

impl Session {
    /// Restore the previous session or start from the default template.
    pub async fn boot(
        config: Config,
        store: SessionStore,
        surfaces: Surfaces,
        layout: SplitLayout,
        prefers_dark: bool,
    ) -> Result<Self> {
        Self::boot_with_pipeline(config, store, surfaces, layout, RenderPipeline::new(), prefers_dark)
            .await
    }

    pub async fn boot_with_pipeline(
        config: Config,
        store: SessionStore,
        surfaces: Surfaces,
        layout: SplitLayout,
        pipeline: RenderPipeline,
        prefers_dark: bool,
    ) -> Result<Self> {
        let copy_label = TransientLabel::new(config.feedback.copy_label.clone());
        let mut session = Self {
            config,
            state: SessionState::default(),
            store,
            pipeline,
            scroll_sync: ScrollSync::default(),
            layout,
            theme: ThemeState::from_system(prefers_dark),
            copy_label,
            surfaces,
        };

        let storage = session.config.storage.clone();
        let restored = session
            .store
            .get_typed::<String>(&storage.namespace, &storage.content_key)
            .await
            .filter(|content| !content.is_empty());
        match restored {
            Some(content) => {
                log::info!("Restoring previous session ({} bytes)", content.len());
                session.install_content(&content).await;
            }
            None => {
                log::info!("No previous session, loading the default template");
                session.install_content(DEFAULT_TEMPLATE).await;
            }
        }

        let sync_enabled = session
            .store
            .get_typed::<bool>(&storage.namespace, &storage.scroll_sync_key)
            .await
            .unwrap_or(false);
        session.scroll_sync.set_enabled(sync_enabled);
        session.surfaces.controls.set_sync_checkbox(sync_enabled);

        let theme = session.theme.current();
        session.apply_theme(&theme);
        let label = session.copy_label.text().to_string();
        session.surfaces.controls.set_copy_label(&label);

        Ok(session)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn has_edited(&self) -> bool {
        self.state.has_edited
    }

    pub fn scroll_sync_enabled(&self) -> bool {
        self.scroll_sync.is_enabled()
    }

    pub fn layout(&self) -> &SplitLayout {
        &self.layout
    }

    pub fn theme(&self) -> &ThemeState {
        &self.theme
    }

    pub fn rendered(&self) -> &str {
        self.pipeline.displayed()
    }

    pub async fn handle(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::ContentChanged => self.on_content_changed().await,
            SessionEvent::SourceScrolled(scroll) => {
                self.scroll_sync
                    .handle(&scroll, self.surfaces.preview.as_mut());
            }
            SessionEvent::ScrollSyncToggled(enabled) => self.set_scroll_sync(enabled).await,
            SessionEvent::ResetRequested => {
                self.reset().await;
            }
            SessionEvent::CopyRequested => self.copy_to_clipboard(Instant::now()).await,
            SessionEvent::ExportRequested => self.export().await?,
            SessionEvent::ThemeToggled => {
                let change = self.theme.toggle_page();
                self.apply_theme(&change);
            }
            SessionEvent::CodeThemeToggled => {
                let change = self.theme.toggle_code();
                self.apply_theme(&change);
            }
            SessionEvent::Layout(event) => self.layout.handle(event),
            SessionEvent::Tick(now) => self.tick(now),
        }
        Ok(())
    }

    async fn on_content_changed(&mut self) {
        let content = self.surfaces.editor.get_value();
        if content != self.state.content {
            if content != DEFAULT_TEMPLATE {
                self.state.has_edited = true;
            }
            self.state.content = content;
        }
        self.render_and_persist().await;
    }

    async fn render_and_persist(&mut self) {
        self.pipeline
            .handle(&self.state.content, self.surfaces.preview.as_mut());

        let storage = &self.config.storage;
        self.store
            .set(
                &storage.namespace,
                &storage.content_key,
                Value::String(self.state.content.clone()),
                far_future(),
            )
            .await;
    }

    /// Programmatically set the editor content. Never marks the session
    /// as edited.
    async fn install_content(&mut self, content: &str) {
        self.surfaces.editor.set_value(content);
        self.state.content = content.to_string();
        self.render_and_persist().await;
        self.surfaces.editor.reveal_position(1, 1);
        self.surfaces.editor.focus();
        self.state.has_edited = false;
    }

    /// Restore the default template, asking first when there is anything
    /// to lose. Returns false when the user declined.
    pub async fn reset(&mut self) -> bool {
        let changed = self.surfaces.editor.get_value() != DEFAULT_TEMPLATE;
        if (self.state.has_edited || changed)
            && !self.surfaces.controls.confirm(RESET_CONFIRMATION)
        {
            log::debug!("Reset declined");
            return false;
        }

        self.install_content(DEFAULT_TEMPLATE).await;
        self.surfaces.editor.scroll_to_top();
        self.surfaces.preview.scroll_to(0.0);
        log::info!("Session reset to the default template");
        true
    }

    async fn set_scroll_sync(&mut self, enabled: bool) {
        self.scroll_sync.set_enabled(enabled);
        let storage = &self.config.storage;
        self.store
            .set(
                &storage.namespace,
                &storage.scroll_sync_key,
                Value::Bool(enabled),
                far_future(),
            )
            .await;
        log::debug!("Scroll sync {}", if enabled { "enabled" } else { "disabled" });
    }

    async fn copy_to_clipboard(&mut self, now: Instant) {
        let content = self.surfaces.editor.get_value();
        match self.surfaces.clipboard.write_text(&content).await {
            Ok(()) => {
                let feedback = &self.config.feedback;
                self.copy_label.show(
                    feedback.copied_label.clone(),
                    Duration::from_millis(feedback.copied_duration_ms),
                    now,
                );
                self.surfaces.controls.set_copy_label(self.copy_label.text());
            }
            Err(e) => log::debug!("Clipboard write failed, ignoring: {}", e),
        }
    }

    fn tick(&mut self, now: Instant) {
        if self.copy_label.update(now) {
            self.surfaces.controls.set_copy_label(self.copy_label.text());
        }
    }

    async fn export(&mut self) -> Result<()> {
        let html = self.pipeline.displayed().to_string();
        if html.trim().is_empty() {
            self.surfaces.controls.alert(NOTHING_TO_EXPORT);
            return Ok(());
        }

        let now = Local::now();
        let defaults = ExportForm::defaults(&self.config.export);
        let form = match self
            .surfaces
            .export_dialog
            .request_export_options(&defaults)
            .await
        {
            ExportDecision::Confirmed(form) => form,
            ExportDecision::Cancelled => {
                log::debug!("Export cancelled");
                return Ok(());
            }
        };

        let options = ExportOptions::from_form(&form, &self.config.export, &now);
        log::debug!("Export options: {}", serde_json::to_string(&options)?);
        if let Err(e) = self.surfaces.exporter.save(&html, &options).await {
            log::error!("Export of {} failed: {}", options.filename, e);
        }
        Ok(())
    }

    fn apply_theme(&mut self, change: &ThemeChange) {
        let controls = &mut self.surfaces.controls;
        controls.set_theme_label(change.page_label);
        controls.set_code_theme_label(change.code_label);
        if let Some(href) = change.stylesheet {
            controls.set_markdown_stylesheet(href);
        }
        self.surfaces.editor.set_theme(change.editor_theme);
    }
}
