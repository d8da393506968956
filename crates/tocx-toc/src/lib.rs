//! Table of contents synthesis and rendering.
//!
//! Turns the flat, ordered heading list of a document into a nested forest
//! and renders that forest as embeddable list markup.
//!
//! # Architecture
//!
//! - [`Heading`]: one heading in document order (text and level)
//! - [`synthesize`]: rebuilds parent/child nesting from heading levels
//! - [`render_toc`]: emits the `toc-wrapper` fragment for a forest
//!
//! # Example
//!
//! ```
//! use tocx_toc::{Heading, render_toc, synthesize};
//!
//! let headings = vec![
//!     Heading::new("Intro", 1),
//!     Heading::new("Background", 2),
//!     Heading::new("Method", 1),
//! ];
//! let forest = synthesize(&headings);
//! assert_eq!(forest.len(), 2);
//!
//! let fragment = render_toc(&forest);
//! assert!(fragment.as_str().contains("<h2>Background</h2>"));
//! ```

mod heading;
mod render;
mod synthesize;

pub use heading::{Heading, HeadingNode, Preorder, count_nodes, escape_html};
pub use render::{RenderedFragment, render_toc};
pub use synthesize::synthesize;
