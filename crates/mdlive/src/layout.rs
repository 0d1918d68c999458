//! Resizable two-pane split.
//!
//! ```text
//! Idle --pointer down on divider--> Dragging --pointer up--> Idle
//! ```
//!
//! Double-click and viewport resize are accepted in either state. Widths
//! are always derived from the last ratio the user chose, never from pixel
//! widths recorded earlier, so proportions survive window resizes.

use crate::surface::SplitSurface;

/// Live geometry of the split container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerGeometry {
    /// Left edge of the container in pointer coordinates.
    pub left: f64,
    pub width: f64,
    pub divider_width: f64,
}

impl ContainerGeometry {
    /// Width shared by the two panes.
    pub fn available(&self) -> f64 {
        (self.width - self.divider_width).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutEvent {
    DividerEnter,
    DividerLeave,
    DividerPointerDown,
    /// Pointer moved anywhere in the document.
    PointerMove { client_x: f64 },
    /// Pointer released anywhere in the document.
    PointerUp,
    DividerDoubleClick,
    ViewportResize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneWidths {
    pub left: f64,
    pub right: f64,
}

pub struct SplitLayout {
    surface: Box<dyn SplitSurface>,
    min_width: f64,
    ratio: f64,
    widths: PaneWidths,
    state: DragState,
    hovering: bool,
    selection_suppressed: bool,
}

impl SplitLayout {
    pub fn new(surface: Box<dyn SplitSurface>, min_width: f64, initial_ratio: f64) -> Self {
        let mut layout = Self {
            surface,
            min_width,
            ratio: if initial_ratio.is_finite() {
                initial_ratio.clamp(0.0, 1.0)
            } else {
                0.5
            },
            widths: PaneWidths {
                left: 0.0,
                right: 0.0,
            },
            state: DragState::Idle,
            hovering: false,
            selection_suppressed: false,
        };
        layout.relayout();
        layout
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Last ratio chosen by the user (left pane share of available width).
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn widths(&self) -> PaneWidths {
        self.widths
    }

    pub fn min_width(&self) -> f64 {
        self.min_width
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn handle(&mut self, event: LayoutEvent) {
        match (self.state, event) {
            (_, LayoutEvent::DividerEnter) => {
                self.set_hover(true);
            }
            (DragState::Idle, LayoutEvent::DividerLeave) => {
                self.set_hover(false);
            }
            (DragState::Dragging, LayoutEvent::DividerLeave) => {}
            (DragState::Idle, LayoutEvent::DividerPointerDown) => {
                self.state = DragState::Dragging;
                self.surface.set_divider_active(true);
                self.surface.set_resize_cursor(true);
                log::debug!("Divider drag started at ratio {:.3}", self.ratio);
            }
            (DragState::Dragging, LayoutEvent::DividerPointerDown) => {}
            (DragState::Dragging, LayoutEvent::PointerMove { client_x }) => {
                self.drag_to(client_x);
            }
            (DragState::Idle, LayoutEvent::PointerMove { .. }) => {}
            (DragState::Dragging, LayoutEvent::PointerUp) => {
                self.state = DragState::Idle;
                self.surface.set_divider_active(false);
                self.set_hover(false);
                self.surface.set_resize_cursor(false);
                if self.selection_suppressed {
                    self.selection_suppressed = false;
                    self.surface.set_selection_suppressed(false);
                }
                log::debug!("Divider drag finished at ratio {:.3}", self.ratio);
            }
            (DragState::Idle, LayoutEvent::PointerUp) => {}
            (_, LayoutEvent::DividerDoubleClick) => {
                self.ratio = 0.5;
                let available = self.surface.geometry().available();
                self.apply(available / 2.0, available);
            }
            (_, LayoutEvent::ViewportResize) => {
                self.relayout();
            }
        }
    }

    fn drag_to(&mut self, client_x: f64) {
        if !self.selection_suppressed {
            self.selection_suppressed = true;
            self.surface.set_selection_suppressed(true);
        }

        let geometry = self.surface.geometry();
        let available = geometry.available();
        if !client_x.is_finite() || !(available > 0.0) {
            return;
        }

        let left = self.clamp_left(client_x - geometry.left, available);
        self.ratio = left / available;
        self.apply(left, available);
    }

    /// Recompute both widths from the stored ratio.
    fn relayout(&mut self) {
        let available = self.surface.geometry().available();
        let left = self.clamp_left(available * self.ratio, available);
        self.apply(left, available);
    }

    /// Keep both panes at or above the floor. When the container is too
    /// narrow to honour it on both sides the panes split evenly.
    fn clamp_left(&self, left: f64, available: f64) -> f64 {
        if available < self.min_width * 2.0 {
            return available / 2.0;
        }
        left.clamp(self.min_width, available - self.min_width)
    }

    fn apply(&mut self, left: f64, available: f64) {
        self.widths = PaneWidths {
            left,
            right: available - left,
        };
        self.surface.set_pane_widths(self.widths.left, self.widths.right);
    }

    fn set_hover(&mut self, hover: bool) {
        if self.hovering != hover {
            self.hovering = hover;
            self.surface.set_divider_hover(hover);
        }
    }
}
