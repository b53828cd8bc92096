//! Conversion of lyrics markup into plain text.
//!
//! Line-producing elements (`<br>` and block elements such as `<p>` and
//! `<div>`) become newlines, every other tag is dropped and only its text is
//! kept. Source formatting whitespace collapses to single spaces, lines are
//! trimmed, and runs of blank lines collapse to a single blank line so stanza
//! breaks survive.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Elements that start and end a line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Elements whose content is never visible text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "iframe"];

/// Convert an HTML fragment (typically an element's inner HTML) to plain text
/// with preserved line breaks.
#[must_use]
pub fn html_to_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let mut raw = String::new();
    for child in html.root_element().children() {
        walk(child, &mut raw);
    }
    normalize_lines(&raw)
}

fn walk(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => push_text(out, text),
        Node::Element(element) => {
            let name = element.name();
            if SKIPPED_ELEMENTS.contains(&name) {
                return;
            }
            if name == "br" {
                out.push('\n');
                return;
            }

            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                end_line(out);
            }
            for child in node.children() {
                walk(child, out);
            }
            if block {
                end_line(out);
            }
        }
        _ => {}
    }
}

/// Append text, collapsing whitespace runs and dropping leading whitespace at line start
fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !(out.is_empty() || out.ends_with('\n') || out.ends_with(' ')) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

/// Finish the current line unless it is already empty.
///
/// Unlike `<br>`, consecutive block boundaries never produce blank lines.
fn end_line(out: &mut String) {
    let line_start = out.rfind('\n').map_or(0, |i| i + 1);
    if out[line_start..].trim().is_empty() {
        out.truncate(line_start);
    } else {
        out.push('\n');
    }
}

fn normalize_lines(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !previous_blank {
                lines.push("");
            }
            previous_blank = true;
        } else {
            lines.push(line);
            previous_blank = false;
        }
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_become_lines() {
        assert_eq!(html_to_text("<p>line one</p><p>line two</p>"), "line one\nline two");
    }

    #[test]
    fn test_br_becomes_newline() {
        assert_eq!(html_to_text("line one<br>line two"), "line one\nline two");
        assert_eq!(html_to_text("line one<br/>line two<br />"), "line one\nline two");
    }

    #[test]
    fn test_double_br_keeps_stanza_break() {
        assert_eq!(
            html_to_text("verse one<br><br>verse two"),
            "verse one\n\nverse two"
        );
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        assert_eq!(html_to_text("a<br><br><br><br>b"), "a\n\nb");
    }

    #[test]
    fn test_pretty_printed_markup() {
        let fragment = "\n    <p>\n      line one\n    </p>\n    <p>line   two</p>\n  ";
        assert_eq!(html_to_text(fragment), "line one\nline two");
    }

    #[test]
    fn test_source_newlines_are_not_breaks() {
        assert_eq!(html_to_text("one\ntwo<br>\n   three"), "one two\nthree");
    }

    #[test]
    fn test_inline_markup_stripped() {
        let fragment = r#"<i>[Chorus]</i><br><a href="/x">Annie</a>, are you <b>OK</b>?"#;
        assert_eq!(html_to_text(fragment), "[Chorus]\nAnnie, are you OK?");
    }

    #[test]
    fn test_scripts_and_comments_dropped() {
        let fragment = "<!-- ad -->line<script>var x = 1;</script><style>p{}</style><br>next";
        assert_eq!(html_to_text(fragment), "line\nnext");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(html_to_text("rock &amp; roll<br>it&#39;s"), "rock & roll\nit's");
    }

    #[test]
    fn test_nested_divs_do_not_add_blank_lines() {
        let fragment = "<div><div>one</div></div><div><p>two</p></div>";
        assert_eq!(html_to_text(fragment), "one\ntwo");
    }

    #[test]
    fn test_empty_fragment() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<br><p> </p>"), "");
    }
}
