use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;
use comrak::{markdown_to_html, ComrakOptions};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref MAILTO_LINK: Regex = Regex::new(r#"<a href="mailto:([^"]*)">([^<]*)</a>"#)
        .expect("Invalid MAILTO_LINK regex pattern");
}

/// Options handed to the markdown converter.
///
/// Both switches are off for the preview pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Emit `id` attributes on headings.
    pub generate_heading_ids: bool,
    /// Encode `mailto:` links as numeric character references.
    pub mangle_entities: bool,
}

/// Convert markdown to (unsanitized) HTML.
///
/// The converter runs behind an unwind guard so a panic on pathological
/// input comes back as an error instead of tearing down the session.
pub fn to_html(src: &str, options: &RenderOptions) -> Result<String> {
    let opt = create_comrak_options(options);
    let html = panic::catch_unwind(AssertUnwindSafe(|| markdown_to_html(src, &opt))).map_err(|payload| {
        let reason = panic_message(&payload);
        log::warn!("Converter panicked on {} bytes of input: {}", src.len(), reason);
        anyhow::anyhow!("markdown conversion failed: {}", reason)
    })?;

    if options.mangle_entities {
        Ok(mangle_mailto_links(&html))
    } else {
        Ok(html)
    }
}

fn create_comrak_options(options: &RenderOptions) -> ComrakOptions<'static> {
    let mut opt = ComrakOptions::default();

    // GitHub flavoured extensions
    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;

    if options.generate_heading_ids {
        opt.extension.header_ids = Some(String::new());
    }

    // Raw HTML is passed through here and stripped by the sanitizer.
    opt.render.unsafe_ = true;

    opt
}

pub fn mangle_mailto_links(html: &str) -> String {
    MAILTO_LINK
        .replace_all(html, |caps: &Captures<'_>| {
            let target = format!("mailto:{}", &caps[1]);
            format!(
                r#"<a href="{}">{}</a>"#,
                encode_entities(&target),
                encode_entities(&caps[2])
            )
        })
        .into_owned()
}

fn encode_entities(text: &str) -> String {
    text.chars().map(|c| format!("&#{};", c as u32)).collect()
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let md = "# Hello\n\nThis is **bold** and *italic*.";
        let html = to_html(md, &RenderOptions::default()).unwrap();
        assert!(html.contains("<h1>"));
        assert!(html.contains("<strong>"));
        assert!(html.contains("<em>"));
    }

    #[test]
    fn test_gfm_table() {
        let md = "| Header 1 | Header 2 |\n|----------|----------|\n| Cell 1   | Cell 2   |";
        let html = to_html(md, &RenderOptions::default()).unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<thead>"));
        assert!(html.contains("<tbody>"));
    }

    #[test]
    fn test_heading_ids_disabled_by_default() {
        let html = to_html("## Lists", &RenderOptions::default()).unwrap();
        assert!(html.contains("<h2>Lists</h2>"));
        assert!(!html.contains("id="));
    }

    #[test]
    fn test_heading_ids_when_enabled() {
        let options = RenderOptions {
            generate_heading_ids: true,
            ..RenderOptions::default()
        };
        let html = to_html("## Lists", &options).unwrap();
        assert!(html.contains(r#"id="lists""#));
    }

    #[test]
    fn test_raw_html_passes_conversion() {
        let html = to_html("<kbd>Ctrl</kbd>", &RenderOptions::default()).unwrap();
        assert!(html.contains("<kbd>Ctrl</kbd>"));
    }

    #[test]
    fn test_mailto_left_alone_without_mangle() {
        let html = to_html("<mailto:me@example.com>", &RenderOptions::default()).unwrap();
        assert!(html.contains(r#"href="mailto:me@example.com""#));
    }

    #[test]
    fn test_mangle_encodes_mailto() {
        let html = r#"<p><a href="mailto:a@b">a@b</a></p>"#;
        let mangled = mangle_mailto_links(html);
        assert!(!mangled.contains("a@b"));
        assert!(mangled.contains("&#97;&#64;&#98;"));
        assert_eq!(mangled, mangle_mailto_links(html));
    }

    #[test]
    fn test_panic_payload_is_reported() {
        let payload = panic::catch_unwind(|| panic!("converter exploded")).unwrap_err();
        assert_eq!(panic_message(&payload), "converter exploded");

        let payload = panic::catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
        assert_eq!(panic_message(&payload), "unknown panic");
    }
}
