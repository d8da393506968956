//! ToC fragment rendering.
//!
//! Produces the markup embedded at the top of exported documents:
//!
//! ```html
//! <div id="toc-wrapper" class="toc-wrapper"><div class="toc">
//! <ul id="navigate_menu" class="toc toc-level-1">
//!   <li class="toc-item"><span><h1>Intro</h1></span>
//!     <ul class="toc-sublist toc-level-2">...</ul>
//!   </li>
//! </ul></div></div>
//! ```
//!
//! No whitespace is emitted between elements. The `toc-level-N` class counts
//! list nesting, so stylesheets can indent by depth independently of the
//! heading levels.

use std::fmt::{self, Write};

use crate::heading::{HeadingNode, escape_html};

/// Highest heading tag available in HTML.
const MAX_HEADING_TAG: u32 = 6;

/// Rendered ToC markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFragment(String);

impl RenderedFragment {
    /// The fragment markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the fragment, returning the markup.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a ToC forest.
///
/// An empty forest renders the wrapper with an empty list.
#[must_use]
pub fn render_toc(forest: &[HeadingNode]) -> RenderedFragment {
    let mut html = String::with_capacity(256);
    html.push_str("<div id=\"toc-wrapper\" class=\"toc-wrapper\"><div class=\"toc\">");
    html.push_str("<ul id=\"navigate_menu\" class=\"toc toc-level-1\">");
    render_items(&mut html, forest);
    html.push_str("</ul></div></div>");
    RenderedFragment(html)
}

/// Render the list items of `forest` and of every nested list.
fn render_items(html: &mut String, forest: &[HeadingNode]) {
    // One iterator per open list; the stack length is the list depth.
    let mut lists = vec![forest.iter()];

    while let Some(items) = lists.last_mut() {
        let Some(node) = items.next() else {
            lists.pop();
            if !lists.is_empty() {
                html.push_str("</ul></li>");
            }
            continue;
        };

        let tag = heading_tag(node.heading.level);
        let _ = write!(
            html,
            "<li class=\"toc-item\"><span><{tag}>{}</{tag}></span>",
            escape_html(&node.heading.text),
        );

        if node.children.is_empty() {
            html.push_str("</li>");
        } else {
            let _ = write!(html, "<ul class=\"toc-sublist toc-level-{}\">", lists.len() + 1);
            lists.push(node.children.iter());
        }
    }
}

fn heading_tag(level: u32) -> String {
    format!("h{}", level.clamp(1, MAX_HEADING_TAG))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::heading::Heading;
    use crate::synthesize::synthesize;

    #[test]
    fn test_render_empty_forest() {
        let fragment = render_toc(&[]);
        assert_eq!(
            fragment.as_str(),
            "<div id=\"toc-wrapper\" class=\"toc-wrapper\"><div class=\"toc\">\
             <ul id=\"navigate_menu\" class=\"toc toc-level-1\"></ul></div></div>"
        );
    }

    #[test]
    fn test_render_nested_sections() {
        let forest = synthesize(&[
            Heading::new("Intro", 1),
            Heading::new("Background", 2),
            Heading::new("Related Work", 2),
            Heading::new("Method", 1),
        ]);
        let fragment = render_toc(&forest);
        assert_eq!(
            fragment.as_str(),
            "<div id=\"toc-wrapper\" class=\"toc-wrapper\"><div class=\"toc\">\
             <ul id=\"navigate_menu\" class=\"toc toc-level-1\">\
             <li class=\"toc-item\"><span><h1>Intro</h1></span>\
             <ul class=\"toc-sublist toc-level-2\">\
             <li class=\"toc-item\"><span><h2>Background</h2></span></li>\
             <li class=\"toc-item\"><span><h2>Related Work</h2></span></li>\
             </ul></li>\
             <li class=\"toc-item\"><span><h1>Method</h1></span></li>\
             </ul></div></div>"
        );
    }

    #[test]
    fn test_depth_class_follows_nesting_not_level() {
        let forest = synthesize(&[Heading::new("A", 1), Heading::new("B", 3)]);
        let html = render_toc(&forest).into_string();
        assert!(html.contains("<ul class=\"toc-sublist toc-level-2\"><li class=\"toc-item\"><span><h3>B</h3>"));
        assert!(!html.contains("toc-level-3"));
    }

    #[test]
    fn test_heading_tag_is_clamped() {
        let forest = synthesize(&[Heading::new("Deep", 9)]);
        let html = render_toc(&forest).into_string();
        assert!(html.contains("<h6>Deep</h6>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let forest = synthesize(&[Heading::new("<b>A & B</b>", 1)]);
        let html = render_toc(&forest).into_string();
        assert!(html.contains("<h1>&lt;b&gt;A &amp; B&lt;/b&gt;</h1>"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let forest = synthesize(&[
            Heading::new("A", 1),
            Heading::new("B", 2),
            Heading::new("C", 4),
            Heading::new("D", 1),
        ]);
        assert_eq!(render_toc(&forest), render_toc(&forest));
    }

    #[test]
    fn test_dropped_headings_leave_no_items() {
        let forest = synthesize(&[Heading::new("A", 1), Heading::new("", 2)]);
        let html = render_toc(&forest).into_string();
        assert_eq!(html.matches("<li").count(), 1);
        assert!(!html.contains("toc-sublist"));
    }

    #[test]
    fn test_render_deep_chain() {
        let forest = synthesize(
            &(1..=30_000u32)
                .map(|level| Heading::new("x", level))
                .collect::<Vec<_>>(),
        );
        let html = render_toc(&forest).into_string();

        assert_eq!(html.matches("<li").count(), 30_000);
        assert_eq!(html.matches("<ul").count(), 30_000);
        assert_eq!(html.matches("</ul>").count(), 30_000);
        assert!(html.contains("<ul class=\"toc-sublist toc-level-30000\">"));
        assert!(html.ends_with("</li></ul></li></ul></div></div>"));
    }

    #[test]
    fn test_display_matches_markup() {
        let fragment = render_toc(&[]);
        assert_eq!(fragment.to_string(), fragment.as_str());
    }
}
