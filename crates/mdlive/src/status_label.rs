use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct TransientText {
    content: String,
    shown_at: Instant,
    duration: Duration,
}

impl TransientText {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

/// A control label that can show a temporary text and fall back to its
/// resting text once the display window has passed.
#[derive(Debug, Clone)]
pub struct TransientLabel {
    resting: String,
    current: Option<TransientText>,
}

impl TransientLabel {
    pub fn new(resting: String) -> Self {
        Self {
            resting,
            current: None,
        }
    }

    /// Show `content` until `now + duration`. Showing again restarts the
    /// window.
    pub fn show(&mut self, content: String, duration: Duration, now: Instant) {
        self.current = Some(TransientText {
            content,
            shown_at: now,
            duration,
        });
    }

    /// Drop an expired text. Returns true when the label reverted.
    pub fn update(&mut self, now: Instant) -> bool {
        if let Some(ref text) = self.current {
            if text.is_expired(now) {
                self.current = None;
                return true;
            }
        }
        false
    }

    pub fn text(&self) -> &str {
        self.current
            .as_ref()
            .map(|text| text.content.as_str())
            .unwrap_or(&self.resting)
    }

    pub fn is_showing(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_text() {
        let label = TransientLabel::new("Copy".to_string());
        assert_eq!(label.text(), "Copy");
        assert!(!label.is_showing());
    }

    #[test]
    fn test_reverts_after_duration() {
        let mut label = TransientLabel::new("Copy".to_string());
        let start = Instant::now();
        label.show("Copied!".to_string(), Duration::from_millis(1000), start);

        assert!(!label.update(start + Duration::from_millis(999)));
        assert_eq!(label.text(), "Copied!");

        assert!(label.update(start + Duration::from_millis(1000)));
        assert_eq!(label.text(), "Copy");
        assert!(!label.update(start + Duration::from_millis(2000)));
    }

    #[test]
    fn test_show_again_restarts_window() {
        let mut label = TransientLabel::new("Copy".to_string());
        let start = Instant::now();
        label.show("Copied!".to_string(), Duration::from_millis(1000), start);
        label.show(
            "Copied!".to_string(),
            Duration::from_millis(1000),
            start + Duration::from_millis(600),
        );

        assert!(!label.update(start + Duration::from_millis(1200)));
        assert!(label.update(start + Duration::from_millis(1600)));
    }
}
