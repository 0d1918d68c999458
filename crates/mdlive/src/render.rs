use anyhow::Result;
use mdcore::{sanitize_html, RenderOptions};

use crate::surface::PreviewPane;

/// Shown above the last good output when a conversion fails.
pub const RENDER_ERROR_MARKER: &str =
    "<p><strong>Preview unavailable:</strong> the document could not be rendered.</p>\n";

/// Markdown-to-markup conversion step.
pub trait MarkdownConverter {
    fn to_markup(&self, text: &str, options: &RenderOptions) -> Result<String>;
}

pub struct ComrakConverter;

impl MarkdownConverter for ComrakConverter {
    fn to_markup(&self, text: &str, options: &RenderOptions) -> Result<String> {
        mdcore::to_html(text, options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// Conversion failed; the previous output is still on screen.
    Recovered,
}

pub struct RenderPipeline {
    converter: Box<dyn MarkdownConverter>,
    options: RenderOptions,
    last_good: String,
    displayed: String,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::with_converter(Box::new(ComrakConverter))
    }

    pub fn with_converter(converter: Box<dyn MarkdownConverter>) -> Self {
        Self {
            converter,
            options: RenderOptions::default(),
            last_good: String::new(),
            displayed: String::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Convert and sanitize without touching the display.
    pub fn render(&self, raw: &str) -> Result<String> {
        let markup = self.converter.to_markup(raw, &self.options)?;
        Ok(sanitize_html(&markup))
    }

    /// Render `raw` and replace the whole preview with the result.
    pub fn handle(&mut self, raw: &str, output: &mut dyn PreviewPane) -> RenderOutcome {
        match self.render(raw) {
            Ok(html) => {
                self.last_good = html.clone();
                self.displayed = html;
                output.replace_contents(&self.displayed);
                RenderOutcome::Rendered
            }
            Err(e) => {
                log::error!("Render failed, keeping previous preview: {}", e);
                self.displayed = format!("{}{}", RENDER_ERROR_MARKER, self.last_good);
                output.replace_contents(&self.displayed);
                RenderOutcome::Recovered
            }
        }
    }

    /// What the preview currently shows.
    pub fn displayed(&self) -> &str {
        &self.displayed
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPane;
    use std::cell::Cell;

    struct FlakyConverter {
        fail: std::rc::Rc<Cell<bool>>,
    }

    impl MarkdownConverter for FlakyConverter {
        fn to_markup(&self, text: &str, options: &RenderOptions) -> Result<String> {
            if self.fail.get() {
                anyhow::bail!("converter choked");
            }
            mdcore::to_html(text, options)
        }
    }

    struct RawPassthrough;

    impl MarkdownConverter for RawPassthrough {
        fn to_markup(&self, text: &str, _options: &RenderOptions) -> Result<String> {
            Ok(text.to_string())
        }
    }

    #[test]
    fn test_render_replaces_preview() {
        let mut pipeline = RenderPipeline::new();
        let pane = HeadlessPane::new(800.0);
        let mut output = pane.clone();

        pipeline.handle("# One", &mut output);
        pipeline.handle("# Two", &mut output);

        assert_eq!(pane.html().trim_end(), "<h1>Two</h1>");
        assert_eq!(pipeline.displayed(), pane.html());
    }

    #[test]
    fn test_fixed_options_are_off() {
        let pipeline = RenderPipeline::new();
        assert!(!pipeline.options().generate_heading_ids);
        assert!(!pipeline.options().mangle_entities);
    }

    #[test]
    fn test_sanitizes_converter_output() {
        let pipeline = RenderPipeline::with_converter(Box::new(RawPassthrough));
        let html = pipeline
            .render(r#"<p onclick="x()">hi</p><script>alert(1)</script>"#)
            .unwrap();
        assert!(!html.contains("script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("hi"));
    }

    #[test]
    fn test_conversion_failure_keeps_last_good_output() {
        let fail = std::rc::Rc::new(Cell::new(false));
        let mut pipeline = RenderPipeline::with_converter(Box::new(FlakyConverter {
            fail: fail.clone(),
        }));
        let pane = HeadlessPane::new(800.0);
        let mut output = pane.clone();

        assert_eq!(pipeline.handle("good *text*", &mut output), RenderOutcome::Rendered);
        fail.set(true);
        assert_eq!(pipeline.handle("broken", &mut output), RenderOutcome::Recovered);

        let shown = pane.html();
        assert!(shown.starts_with(RENDER_ERROR_MARKER));
        assert!(shown.contains("<em>text</em>"));

        fail.set(false);
        assert_eq!(pipeline.handle("fixed", &mut output), RenderOutcome::Rendered);
        assert!(!pane.html().contains("Preview unavailable"));
    }
}
