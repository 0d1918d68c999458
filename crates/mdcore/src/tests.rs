#[cfg(test)]
mod unit_tests {
    use super::super::*;

    #[test]
    fn test_sanitize_html_removes_scripts() {
        let html = r#"<p>Hello</p><script>alert('XSS')</script><p>World</p>"#;
        let sanitized = sanitize::sanitize_html(html);
        assert!(!sanitized.contains("<script"));
        assert!(!sanitized.contains("alert"));
        assert!(sanitized.contains("Hello"));
        assert!(sanitized.contains("World"));
    }

    #[test]
    fn test_sanitize_removes_dangerous_attributes() {
        let html = r#"<a href="javascript:alert('XSS')">Click me</a>"#;
        let sanitized = sanitize::sanitize_html(html);
        assert!(!sanitized.contains("javascript:"));
        assert!(sanitized.contains("Click me"));
    }

    #[test]
    fn test_render_strips_embedded_script_tags() {
        let markdown = "# Title\n\n<script>alert('XSS')</script>\n\nbody text";
        let html = render(markdown, &RenderOptions::default()).unwrap();
        assert!(!html.contains("<script"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("body text"));
    }

    #[test]
    fn test_render_strips_event_handler_attributes() {
        let markdown = r#"<img src="cat.png" onerror="alert(1)"> and <b onclick="steal()">bold</b>"#;
        let html = render(markdown, &RenderOptions::default()).unwrap();
        assert!(!html.contains("onerror"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_render_strips_javascript_links() {
        let html = render("[x](javascript:alert(1))", &RenderOptions::default()).unwrap();
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let markdown = "* one\n* two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n<div onmouseover=\"x()\">hi</div>";
        let first = render(markdown, &RenderOptions::default()).unwrap();
        let second = render(markdown, &RenderOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_heading_snapshot() {
        let html = render("# Hi", &RenderOptions::default()).unwrap();
        insta::assert_snapshot!(html.trim_end(), @"<h1>Hi</h1>");
    }

    #[test]
    fn test_render_emphasis_snapshot() {
        let html = render("*a* and **b**", &RenderOptions::default()).unwrap();
        insta::assert_snapshot!(html.trim_end(), @"<p><em>a</em> and <strong>b</strong></p>");
    }

    #[test]
    fn test_render_empty_input() {
        let html = render("", &RenderOptions::default()).unwrap();
        assert!(html.trim().is_empty());
    }
}
