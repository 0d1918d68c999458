//! In-memory implementations of every surface.
//!
//! Each adapter is a cheap handle over shared state, so a caller can hand
//! one clone to the engine and keep another to inspect what the engine did.
//! The `mdlive` binary runs on these, and so do the tests.

use anyhow::Result;
use async_trait::async_trait;
use ropey::Rope;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::export::{ExportDecision, ExportForm, ExportOptions};
use crate::layout::ContainerGeometry;
use crate::surface::{
    Clipboard, Controls, DocumentExporter, EditorWidget, ExportDialog, PreviewPane, ScrollPane,
    SplitSurface,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct EditorState {
    rope: Rope,
    cursor_line: usize,
    cursor_col: usize,
    scroll_top: f64,
    focused: bool,
    theme: String,
}

#[derive(Clone, Default)]
pub struct HeadlessEditor {
    inner: Arc<Mutex<EditorState>>,
}

impl HeadlessEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate typing: append text at the end of the document.
    pub fn type_text(&self, text: &str) {
        let mut state = lock(&self.inner);
        let end = state.rope.len_chars();
        state.rope.insert(end, text);
    }

    /// 0-based cursor position.
    pub fn cursor(&self) -> (usize, usize) {
        let state = lock(&self.inner);
        (state.cursor_line, state.cursor_col)
    }

    pub fn set_scroll_top(&self, top: f64) {
        lock(&self.inner).scroll_top = top;
    }

    pub fn scroll_top(&self) -> f64 {
        lock(&self.inner).scroll_top
    }

    pub fn is_focused(&self) -> bool {
        lock(&self.inner).focused
    }

    pub fn theme(&self) -> String {
        lock(&self.inner).theme.clone()
    }
}

impl EditorWidget for HeadlessEditor {
    fn get_value(&self) -> String {
        lock(&self.inner).rope.to_string()
    }

    fn set_value(&mut self, text: &str) {
        let mut state = lock(&self.inner);
        state.rope = Rope::from_str(text);
        state.cursor_line = 0;
        state.cursor_col = 0;
    }

    fn reveal_position(&mut self, line: usize, column: usize) {
        let mut state = lock(&self.inner);
        let max_line = state.rope.len_lines().saturating_sub(1);
        let line_idx = line.saturating_sub(1).min(max_line);
        let line_len = state
            .rope
            .get_line(line_idx)
            .map(|l| l.len_chars())
            .unwrap_or(0);
        state.cursor_line = line_idx;
        state.cursor_col = column.saturating_sub(1).min(line_len);
        if line_idx == 0 {
            state.scroll_top = 0.0;
        }
    }

    fn focus(&mut self) {
        lock(&self.inner).focused = true;
    }

    fn set_theme(&mut self, theme: &str) {
        lock(&self.inner).theme = theme.to_string();
    }

    fn scroll_to_top(&mut self) {
        lock(&self.inner).scroll_top = 0.0;
    }
}

#[derive(Debug, Default)]
struct PaneState {
    html: String,
    scroll_top: f64,
    scroll_height: f64,
    client_height: f64,
    replacements: usize,
}

#[derive(Clone, Default)]
pub struct HeadlessPane {
    inner: Arc<Mutex<PaneState>>,
}

impl HeadlessPane {
    pub fn new(client_height: f64) -> Self {
        let pane = Self::default();
        {
            let mut state = lock(&pane.inner);
            state.client_height = client_height;
            state.scroll_height = client_height;
        }
        pane
    }

    pub fn html(&self) -> String {
        lock(&self.inner).html.clone()
    }

    pub fn set_scroll_height(&self, scroll_height: f64) {
        lock(&self.inner).scroll_height = scroll_height;
    }

    /// How many times the contents were replaced.
    pub fn replacements(&self) -> usize {
        lock(&self.inner).replacements
    }
}

impl ScrollPane for HeadlessPane {
    fn scroll_top(&self) -> f64 {
        lock(&self.inner).scroll_top
    }

    fn scroll_height(&self) -> f64 {
        lock(&self.inner).scroll_height
    }

    fn client_height(&self) -> f64 {
        lock(&self.inner).client_height
    }

    fn scroll_to(&mut self, top: f64) {
        let mut state = lock(&self.inner);
        let max = (state.scroll_height - state.client_height).max(0.0);
        state.scroll_top = top.clamp(0.0, max);
    }
}

impl PreviewPane for HeadlessPane {
    fn replace_contents(&mut self, html: &str) {
        let mut state = lock(&self.inner);
        state.html = html.to_string();
        state.replacements += 1;
    }
}

#[derive(Debug)]
struct ControlsState {
    sync_checked: bool,
    copy_label: String,
    theme_label: String,
    code_theme_label: String,
    stylesheet: String,
    answers: VecDeque<bool>,
    default_answer: bool,
    prompts: Vec<String>,
    alerts: Vec<String>,
}

/// Controls that answer confirmation prompts from a script.
#[derive(Clone)]
pub struct HeadlessControls {
    inner: Arc<Mutex<ControlsState>>,
}

impl HeadlessControls {
    /// `default_answer` is used once scripted answers run out.
    pub fn new(default_answer: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControlsState {
                sync_checked: false,
                copy_label: String::new(),
                theme_label: String::new(),
                code_theme_label: String::new(),
                stylesheet: String::new(),
                answers: VecDeque::new(),
                default_answer,
                prompts: Vec::new(),
                alerts: Vec::new(),
            })),
        }
    }

    pub fn answer_next(&self, answer: bool) {
        lock(&self.inner).answers.push_back(answer);
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.inner).prompts.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        lock(&self.inner).alerts.clone()
    }

    pub fn sync_checked(&self) -> bool {
        lock(&self.inner).sync_checked
    }

    pub fn copy_label(&self) -> String {
        lock(&self.inner).copy_label.clone()
    }

    pub fn theme_label(&self) -> String {
        lock(&self.inner).theme_label.clone()
    }

    pub fn code_theme_label(&self) -> String {
        lock(&self.inner).code_theme_label.clone()
    }

    pub fn stylesheet(&self) -> String {
        lock(&self.inner).stylesheet.clone()
    }
}

impl Controls for HeadlessControls {
    fn set_sync_checkbox(&mut self, checked: bool) {
        lock(&self.inner).sync_checked = checked;
    }

    fn set_copy_label(&mut self, label: &str) {
        lock(&self.inner).copy_label = label.to_string();
    }

    fn set_theme_label(&mut self, label: &str) {
        lock(&self.inner).theme_label = label.to_string();
    }

    fn set_code_theme_label(&mut self, label: &str) {
        lock(&self.inner).code_theme_label = label.to_string();
    }

    fn set_markdown_stylesheet(&mut self, href: &str) {
        lock(&self.inner).stylesheet = href.to_string();
    }

    fn confirm(&mut self, message: &str) -> bool {
        let mut state = lock(&self.inner);
        state.prompts.push(message.to_string());
        let default_answer = state.default_answer;
        state.answers.pop_front().unwrap_or(default_answer)
    }

    fn alert(&mut self, message: &str) {
        log::info!("{}", message);
        lock(&self.inner).alerts.push(message.to_string());
    }
}

#[derive(Debug, Default)]
struct SplitState {
    geometry: Option<ContainerGeometry>,
    left: f64,
    right: f64,
    hover: bool,
    active: bool,
    resize_cursor: bool,
    selection_suppressed: bool,
}

#[derive(Clone, Default)]
pub struct HeadlessSplit {
    inner: Arc<Mutex<SplitState>>,
}

impl HeadlessSplit {
    pub fn new(geometry: ContainerGeometry) -> Self {
        let split = Self::default();
        lock(&split.inner).geometry = Some(geometry);
        split
    }

    pub fn set_container_width(&self, width: f64) {
        let mut state = lock(&self.inner);
        if let Some(ref mut geometry) = state.geometry {
            geometry.width = width;
        }
    }

    pub fn pane_widths(&self) -> (f64, f64) {
        let state = lock(&self.inner);
        (state.left, state.right)
    }

    pub fn divider_hover(&self) -> bool {
        lock(&self.inner).hover
    }

    pub fn divider_active(&self) -> bool {
        lock(&self.inner).active
    }

    pub fn resize_cursor(&self) -> bool {
        lock(&self.inner).resize_cursor
    }

    pub fn selection_suppressed(&self) -> bool {
        lock(&self.inner).selection_suppressed
    }
}

impl SplitSurface for HeadlessSplit {
    fn geometry(&self) -> ContainerGeometry {
        lock(&self.inner).geometry.unwrap_or(ContainerGeometry {
            left: 0.0,
            width: 0.0,
            divider_width: 0.0,
        })
    }

    fn set_pane_widths(&mut self, left: f64, right: f64) {
        let mut state = lock(&self.inner);
        state.left = left;
        state.right = right;
    }

    fn set_divider_hover(&mut self, hover: bool) {
        lock(&self.inner).hover = hover;
    }

    fn set_divider_active(&mut self, active: bool) {
        lock(&self.inner).active = active;
    }

    fn set_resize_cursor(&mut self, resizing: bool) {
        lock(&self.inner).resize_cursor = resizing;
    }

    fn set_selection_suppressed(&mut self, suppressed: bool) {
        lock(&self.inner).selection_suppressed = suppressed;
    }
}

#[derive(Debug, Default)]
struct ClipboardState {
    contents: Option<String>,
    deny: bool,
}

#[derive(Clone, Default)]
pub struct HeadlessClipboard {
    inner: Arc<Mutex<ClipboardState>>,
}

impl HeadlessClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, as a denied clipboard permission would.
    pub fn deny(&self) {
        lock(&self.inner).deny = true;
    }

    pub fn contents(&self) -> Option<String> {
        lock(&self.inner).contents.clone()
    }
}

#[async_trait]
impl Clipboard for HeadlessClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let mut state = lock(&self.inner);
        if state.deny {
            anyhow::bail!("clipboard write denied");
        }
        state.contents = Some(text.to_string());
        Ok(())
    }
}

/// Dialog that answers with queued decisions, cancelling when none are left.
#[derive(Clone, Default)]
pub struct HeadlessExportDialog {
    decisions: Arc<Mutex<VecDeque<ExportDecision>>>,
    requests: Arc<Mutex<Vec<ExportForm>>>,
}

impl HeadlessExportDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_decision(&self, decision: ExportDecision) {
        lock(&self.decisions).push_back(decision);
    }

    /// Form defaults the dialog was opened with, one per request.
    pub fn requests(&self) -> Vec<ExportForm> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ExportDialog for HeadlessExportDialog {
    async fn request_export_options(&mut self, defaults: &ExportForm) -> ExportDecision {
        lock(&self.requests).push(defaults.clone());
        lock(&self.decisions)
            .pop_front()
            .unwrap_or(ExportDecision::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub html: String,
    pub options: ExportOptions,
}

/// Exporter that records jobs instead of producing documents.
#[derive(Clone, Default)]
pub struct HeadlessExporter {
    jobs: Arc<Mutex<Vec<ExportJob>>>,
}

impl HeadlessExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<ExportJob> {
        lock(&self.jobs).clone()
    }
}

#[async_trait]
impl DocumentExporter for HeadlessExporter {
    async fn save(&mut self, html: &str, options: &ExportOptions) -> Result<()> {
        log::info!("Export requested: {}", options.filename);
        lock(&self.jobs).push(ExportJob {
            html: html.to_string(),
            options: options.clone(),
        });
        Ok(())
    }
}
