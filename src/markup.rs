use comrak::{markdown_to_html, Options};

/// Render stored markdown source to display HTML.
///
/// Pure function: no state, no failure mode. Malformed input is rendered
/// best-effort by comrak, which never errors.
pub fn render(source: &str) -> String {
    markdown_to_html(source, &Options::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraph() {
        let html = render("Hello, world");
        assert_eq!(html, "<p>Hello, world</p>\n");
    }

    #[test]
    fn renders_headings_and_emphasis() {
        let html = render("# Title\n\nSome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn escapes_raw_html_by_default() {
        let html = render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn malformed_input_renders_best_effort() {
        let html = render("[broken](link **unclosed `tick");
        assert!(!html.is_empty());
    }

    #[test]
    fn empty_input_is_fine() {
        assert_eq!(render(""), "");
    }
}
