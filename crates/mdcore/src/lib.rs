pub mod markdown;
pub mod sanitize;

use anyhow::Result;

pub use markdown::{to_html, RenderOptions};
pub use sanitize::sanitize_html;

/// Convert and sanitize in one step.
///
/// Raw converter output never leaves this function unsanitized.
pub fn render(src: &str, options: &RenderOptions) -> Result<String> {
    let html = to_html(src, options)?;
    Ok(sanitize_html(&html))
}

#[cfg(test)]
mod tests;
