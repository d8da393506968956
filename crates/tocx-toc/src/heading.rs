//! Heading model and synthesized tree nodes.

use serde::{Deserialize, Serialize};

/// A document heading in document order.
///
/// Produced by the heading collaborator for one document snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading text. Empty text marks a heading that is excluded from the ToC.
    pub text: String,
    /// Nesting level (1 for top-level headings).
    pub level: u32,
}

impl Heading {
    /// Create a heading.
    pub fn new(text: impl Into<String>, level: u32) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    /// Whether the heading has no text and therefore never reaches the tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A heading together with the headings nested under it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeadingNode {
    /// The heading this node represents.
    pub heading: Heading,
    /// Nested headings, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HeadingNode>,
}

impl HeadingNode {
    /// Create a node without children.
    pub fn leaf(heading: Heading) -> Self {
        Self {
            heading,
            children: Vec::new(),
        }
    }

    /// Depth of the subtree rooted at this node (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Iterate over this node and its descendants in pre-order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

// Dropping a long chain of nested nodes must not recurse once per level.
impl Drop for HeadingNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over a heading subtree.
pub struct Preorder<'a> {
    stack: Vec<&'a HeadingNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Heading;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(&node.heading)
    }
}

/// Total number of nodes in a forest.
#[must_use]
pub fn count_nodes(forest: &[HeadingNode]) -> usize {
    forest.iter().map(|node| node.preorder().count()).sum()
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
