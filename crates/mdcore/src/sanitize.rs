use ammonia::Builder;

/// Strip anything executable from converter output.
///
/// Uses ammonia's default allow-list unchanged.
pub fn sanitize_html(html: &str) -> String {
    create_secure_sanitizer().clean(html).to_string()
}

fn create_secure_sanitizer() -> Builder<'static> {
    Builder::default()
}
