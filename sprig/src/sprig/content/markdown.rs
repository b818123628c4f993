use std::path::Path;

use crate::sprig::error::{BuildError, Result};

/// Render a Markdown body to an HTML fragment (CommonMark plus GFM tables,
/// strikethrough, autolinks and task lists). Raw HTML in the source is passed
/// through untouched.
pub fn render_markdown(body: &str, path: &Path) -> Result<String> {
    markdown::to_html_with_options(
        body,
        &markdown::Options {
            parse: markdown::ParseOptions::gfm(),
            compile: markdown::CompileOptions {
                allow_dangerous_html: true,
                ..markdown::CompileOptions::gfm()
            },
        },
    )
    .map_err(|e| BuildError::Markdown {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(body: &str) -> String {
        render_markdown(body, Path::new("test.md")).unwrap()
    }

    #[test]
    fn renders_common_constructs() {
        let html = render("# Heading\n\n- one\n- two\n\n*em* and **strong** [link](https://example.com)\n\n> quoted\n\n```rust\nfn main() {}\n```");
        assert!(html.contains("<h1>Heading</h1>"), "{html}");
        assert!(html.contains("<li>one</li>"), "{html}");
        assert!(html.contains("<em>em</em>"), "{html}");
        assert!(html.contains("<strong>strong</strong>"), "{html}");
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#), "{html}");
        assert!(html.contains("<blockquote>"), "{html}");
        assert!(html.contains(r#"<code class="language-rust">"#), "{html}");
    }

    #[test]
    fn passes_raw_html_through() {
        let html = render("<div class=\"note\">hi</div>");
        assert!(html.contains("<div class=\"note\">hi</div>"), "{html}");
    }

    #[test]
    fn empty_body_is_empty_html() {
        assert_eq!(render(""), "");
    }
}
