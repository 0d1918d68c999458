use crate::surface::ScrollPane;

/// Scroll notification from the editing widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceScroll {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    Disabled,
    /// The source has nothing to scroll; the output pane is left where it is.
    NoOverflow,
    Applied { target: f64 },
}

/// One-way mapping from the source pane's scroll position to the preview's.
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    enabled: bool,
}

impl ScrollSync {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn handle<P>(&self, event: &SourceScroll, output: &mut P) -> SyncOutcome
    where
        P: ScrollPane + ?Sized,
    {
        if !self.enabled {
            return SyncOutcome::Disabled;
        }

        let Some(ratio) = scroll_ratio(event) else {
            return SyncOutcome::NoOverflow;
        };

        let output_range = (output.scroll_height() - output.client_height()).max(0.0);
        let target = ratio * output_range;
        output.scroll_to(target);
        log::debug!("Synced preview to {:.1} (ratio {:.3})", target, ratio);
        SyncOutcome::Applied { target }
    }
}

/// Fraction of the source's scrollable range that has been scrolled, or
/// `None` when there is no range.
fn scroll_ratio(event: &SourceScroll) -> Option<f64> {
    let max_scroll_top = event.scroll_height - event.viewport_height;
    if !(max_scroll_top > 0.0) || !event.scroll_top.is_finite() {
        return None;
    }
    Some((event.scroll_top / max_scroll_top).clamp(0.0, 1.0))
}
