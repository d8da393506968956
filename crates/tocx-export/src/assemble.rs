//! Document assembly.
//!
//! Parses the rendered source page into an HTML5 tree (html5ever + rcdom),
//! prepends the ToC to `<body>` and appends the stylesheet to `<head>`.
//! Everything else in the page is left untouched.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{LocalName, QualName, ns, parse_document, serialize};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use tocx_toc::RenderedFragment;

use crate::error::ExportError;

/// A parsed page with located `<head>` and `<body>` insertion points.
pub struct AssembledDocument {
    dom: RcDom,
    head: Handle,
    body: Handle,
}

impl AssembledDocument {
    /// Parse a rendered page.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::StructuralInvariant`] if the tree has no
    /// `<html>`, `<head>` or `<body>` element.
    pub fn parse(html: &str) -> Result<Self, ExportError> {
        let dom = parse_html(html);
        let (head, body) = locate_sections(&dom)?;
        Ok(Self { dom, head, body })
    }

    /// The `<head>` element.
    pub fn head(&self) -> &Handle {
        &self.head
    }

    /// The `<body>` element.
    pub fn body(&self) -> &Handle {
        &self.body
    }

    /// Insert the ToC, wrapped in a `<div>`, as the first child of `<body>`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::StructuralInvariant`] if the fragment cannot be
    /// parsed into body content.
    pub fn insert_toc(&self, fragment: &RenderedFragment) -> Result<(), ExportError> {
        let parsed = parse_html(fragment.as_str());
        let (_, fragment_body) = locate_sections(&parsed)?;

        let container = create_element("div");
        let nodes = fragment_body.children.take();
        for node in nodes {
            append_child(&container, node);
        }
        prepend_child(&self.body, container);
        Ok(())
    }

    /// Append a `<style>` element holding `css` to `<head>`.
    pub fn append_stylesheet(&self, css: &str) {
        let style = create_element("style");
        append_child(&style, create_text(css));
        append_child(&self.head, style);
    }

    /// Serialize the document, doctype included.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Html`] if serialization fails.
    pub fn to_html(&self) -> Result<String, ExportError> {
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        let mut output = Vec::new();
        let document = SerializableHandle::from(Rc::clone(&self.dom.document));
        serialize(&mut output, &document, opts).map_err(ExportError::Html)?;

        String::from_utf8(output).map_err(|e| {
            ExportError::Html(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

/// Merge a rendered page, a ToC fragment and a stylesheet.
///
/// # Errors
///
/// Returns [`ExportError::StructuralInvariant`] if the page has no head or body.
pub fn assemble(
    source_html: &str,
    fragment: &RenderedFragment,
    stylesheet: &str,
) -> Result<AssembledDocument, ExportError> {
    let document = AssembledDocument::parse(source_html)?;
    document.insert_toc(fragment)?;
    document.append_stylesheet(stylesheet);
    Ok(document)
}

fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Find `<head>` and `<body>` under the document's `<html>` element.
fn locate_sections(dom: &RcDom) -> Result<(Handle, Handle), ExportError> {
    let root = find_child_element(&dom.document, "html")
        .ok_or(ExportError::StructuralInvariant("html"))?;
    let head = find_child_element(&root, "head").ok_or(ExportError::StructuralInvariant("head"))?;
    let body = find_child_element(&root, "body").ok_or(ExportError::StructuralInvariant("body"))?;
    Ok((head, body))
}

fn find_child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, NodeData::Element { name, .. } if &*name.local == tag))
        .map(Rc::clone)
}

fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

fn prepend_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

/// Create an HTML element without attributes.
fn create_element(tag: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs: RefCell::new(Vec::new()),
            template_contents: RefCell::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(StrTendril::from(text)),
        },
    })
}
