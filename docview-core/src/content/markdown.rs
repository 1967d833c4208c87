use pulldown_cmark::{Options, Parser, html};

/// Renders CommonMark text to an HTML fragment.
///
/// Tables and strikethrough are enabled; everything else uses parser defaults.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let html = render_markdown("# Introduction\n\nWelcome to **EC2**.\n");
        assert_eq!(
            html,
            "<h1>Introduction</h1>\n<p>Welcome to <strong>EC2</strong>.</p>\n"
        );
    }

    #[test]
    fn tables_are_enabled() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_markdown("").is_empty());
    }
}
