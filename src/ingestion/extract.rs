//! Paragraph extraction from fetched HTML.

use scraper::{Html, Selector};

/// Collects the text of every `<p>` element in document order, drops the
/// empty ones, and joins the rest with newlines.
///
/// This never fails: a page without paragraphs yields an empty string.
pub fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);
    let paragraphs = Selector::parse("p").expect("paragraph selector");

    document
        .select(&paragraphs)
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_non_empty_paragraphs_in_order() {
        let html = "<html><body><p>A</p><p></p><p>B</p></body></html>";
        assert_eq!(extract_paragraphs(html), "A\nB");
    }

    #[test]
    fn no_paragraphs_yields_empty_string() {
        assert_eq!(extract_paragraphs("<html><body><h1>Title</h1></body></html>"), "");
    }

    #[test]
    fn inline_markup_contributes_its_text() {
        let html = "<p>Hello <strong>world</strong>!</p>";
        assert_eq!(extract_paragraphs(html), "Hello world!");
    }

    #[test]
    fn nested_and_surrounding_content_is_ignored() {
        let html = r#"
            <html><body>
                <div><p>first</p></div>
                <span>not a paragraph</span>
                <p>second</p>
            </body></html>
        "#;
        assert_eq!(extract_paragraphs(html), "first\nsecond");
    }

    #[test]
    fn whitespace_only_paragraph_survives_the_empty_filter() {
        // Only strictly empty text is dropped; whitespace is preserved as-is.
        let html = "<p> </p><p>text</p>";
        assert_eq!(extract_paragraphs(html), " \ntext");
    }
}
