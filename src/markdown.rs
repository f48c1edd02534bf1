//! Conversions for the post editor's markdown mode.
//!
//! [`html_to_markdown`] is a fixed sequence of substitutions over the handful
//! of tags the rich-text editor emits, not an HTML parser. Substitutions run
//! in order, so nested or malformed markup can come out mangled; whatever
//! tags are left at the end are stripped.
//!
//! [`markdown_to_html`] goes the other way with a real CommonMark parser,
//! since posts are always stored as HTML.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

static RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"<h1>(.*?)</h1>", "# ${1}\n\n"),
        (r"<h2>(.*?)</h2>", "## ${1}\n\n"),
        (r"<p>(.*?)</p>", "${1}\n\n"),
        (r"<strong>(.*?)</strong>", "**${1}**"),
        (r"<em>(.*?)</em>", "*${1}*"),
        (r"<blockquote>(.*?)</blockquote>", "> ${1}\n\n"),
        (r"(?s)<ul>(.*?)</ul>", "${1}\n"),
        (r"(?s)<ol>(.*?)</ol>", "${1}\n"),
        (r"<li>(.*?)</li>", "- ${1}\n"),
        (r#"<a href="(.*?)">(.*?)</a>"#, "[${2}](${1})"),
        (r#"<img src="(.*?)" alt="(.*?)">"#, "![${2}](${1})"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static REMAINING_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[^>]+(>|$)").unwrap());

pub fn html_to_markdown(html: &str) -> String {
    let mut markdown = html.to_string();
    for (pattern, replacement) in RULES.iter() {
        markdown = pattern.replace_all(&markdown, *replacement).into_owned();
    }
    REMAINING_TAGS
        .replace_all(&markdown, "")
        .trim()
        .to_string()
}

/// Render markdown (GitHub-style tables and strikethrough included) to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let html = "<h1>Title</h1><h2>Sub</h2><p>Body text</p>";
        assert_eq!(html_to_markdown(html), "# Title\n\n## Sub\n\nBody text");
    }

    #[test]
    fn inline_emphasis_and_links() {
        let html = r#"<p><strong>bold</strong> and <em>it</em> with <a href="https://x.dev">a link</a></p>"#;
        assert_eq!(
            html_to_markdown(html),
            "**bold** and *it* with [a link](https://x.dev)"
        );
    }

    #[test]
    fn lists_span_lines() {
        let html = "<ul>\n<li>one</li>\n<li>two</li>\n</ul>";
        assert_eq!(html_to_markdown(html), "- one\n\n- two");
    }

    #[test]
    fn images_and_blockquotes() {
        let html = r#"<blockquote>quoted</blockquote><img src="https://x.dev/a.png" alt="pic">"#;
        assert_eq!(
            html_to_markdown(html),
            "> quoted\n\n![pic](https://x.dev/a.png)"
        );
    }

    #[test]
    fn unknown_tags_are_stripped() {
        let html = r#"<div class="x"><span>plain</span></div><pre><code>let x = 1;</code></pre>"#;
        assert_eq!(html_to_markdown(html), "plainlet x = 1;");
    }

    #[test]
    fn unterminated_tag_at_end_is_dropped() {
        assert_eq!(html_to_markdown("text <img src=\"broken"), "text");
    }

    #[test]
    fn paragraphs_do_not_match_across_lines() {
        assert_eq!(html_to_markdown("<p>a\nb</p>"), "a\nb");
    }

    #[test]
    fn markdown_renders_to_html() {
        assert_eq!(
            markdown_to_html("# Rust\n\nOwnership **rules**."),
            "<h1>Rust</h1>\n<p>Ownership <strong>rules</strong>.</p>\n"
        );
        assert_eq!(markdown_to_html("~~gone~~"), "<p><del>gone</del></p>\n");
        assert_eq!(
            markdown_to_html("- one\n- two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
    }

    #[test]
    fn markdown_tables_and_code() {
        let html = markdown_to_html("| a |\n|---|\n| 1 |\n\n```rust\nlet x = 1;\n```");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<pre><code class=\"language-rust\">let x = 1;\n</code></pre>"));
    }

    #[test]
    fn editor_html_survives_a_trip_through_markdown() {
        let html = "<h2>Intro</h2><p>Some <strong>bold</strong> words</p>";
        assert_eq!(
            markdown_to_html(&html_to_markdown(html)),
            "<h2>Intro</h2>\n<p>Some <strong>bold</strong> words</p>\n"
        );
    }
}
