//! Thin helpers over the `markup5ever_rcdom` tree.
//!
//! The scanner and the normalizers only need a handful of queries: tag and
//! class tests, attribute reads, descendant searches in document order and
//! the text content of a cell. Parent links in `rcdom` are weak, so walking
//! upwards goes through [`parent`].

use std::rc::Rc;

use html5ever::driver::ParseOpts;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parses a full HTML document.
#[must_use]
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// Returns the local tag name of an element node.
#[must_use]
pub fn tag(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Returns `true` if `handle` is an element named `name`.
#[must_use]
pub fn is_tag(handle: &Handle, name: &str) -> bool {
    tag(handle).is_some_and(|t| t.eq_ignore_ascii_case(name))
}

/// Reads an attribute value.
#[must_use]
pub fn attr(handle: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
        .map(|a| a.value.to_string())
}

/// Sets an attribute, replacing any previous value.
pub fn set_attr(handle: &Handle, name: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    if let Some(existing) = attrs
        .iter_mut()
        .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
    {
        existing.value = StrTendril::from_slice(value);
        return;
    }
    attrs.push(Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from_slice(value),
    });
}

/// Returns `true` if the `class` attribute lists `class` as one of its tokens.
#[must_use]
pub fn has_class(handle: &Handle, class: &str) -> bool {
    attr(handle, "class").is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
}

/// Element children of `handle`, in order.
#[must_use]
pub fn element_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|c| matches!(c.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Collects every descendant element (excluding `handle` itself) matching
/// `pred`, in document order.
pub fn descendants<F>(handle: &Handle, pred: F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut out = Vec::new();
    collect_descendants(handle, &pred, &mut out);
    out
}

fn collect_descendants<F>(handle: &Handle, pred: &F, out: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
{
    for child in handle.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) && pred(child) {
            out.push(child.clone());
        }
        collect_descendants(child, pred, out);
    }
}

/// First descendant element matching `pred`, in document order.
pub fn first_descendant<F>(handle: &Handle, pred: F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    find_first(handle, &pred)
}

fn find_first<F>(handle: &Handle, pred: &F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    for child in handle.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) && pred(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, pred) {
            return Some(found);
        }
    }
    None
}

/// Returns `true` if any descendant element satisfies `pred`.
pub fn any_descendant<F>(handle: &Handle, pred: F) -> bool
where
    F: Fn(&Handle) -> bool,
{
    find_first(handle, &pred).is_some()
}

/// Text content of a node with leading and trailing whitespace removed.
///
/// Inner whitespace, including newlines, is kept as written.
#[must_use]
pub fn node_text(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out.trim().to_string()
}

/// Recursively appends text nodes from `handle` to `out`.
fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            if tag.eq_ignore_ascii_case("script")
                || tag.eq_ignore_ascii_case("style")
                || tag.eq_ignore_ascii_case("noscript")
                || tag.eq_ignore_ascii_case("template")
            {
                return;
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

/// Upgrades the weak parent link of `handle`.
#[must_use]
pub fn parent(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(std::rc::Weak::upgrade);
    handle.parent.set(weak);
    parent
}

/// Returns `true` if `handle` can still be reached from `root` by walking
/// parent links.
#[must_use]
pub fn is_attached(handle: &Handle, root: &Handle) -> bool {
    let mut current = handle.clone();
    loop {
        if Rc::ptr_eq(&current, root) {
            return true;
        }
        match parent(&current) {
            Some(p) => current = p,
            None => return false,
        }
    }
}

/// Returns `true` if some ancestor of `handle` strictly below `stop`
/// satisfies `pred`.
pub fn has_ancestor_below<F>(handle: &Handle, stop: &Handle, pred: F) -> bool
where
    F: Fn(&Handle) -> bool,
{
    let mut current = parent(handle);
    while let Some(node) = current {
        if Rc::ptr_eq(&node, stop) {
            return false;
        }
        if pred(&node) {
            return true;
        }
        current = parent(&node);
    }
    false
}

/// Returns `true` if `handle` or one of its ancestors is hidden through the
/// `hidden` attribute, `aria-hidden="true"` or an inline `display: none`.
#[must_use]
pub fn is_hidden(handle: &Handle) -> bool {
    let mut current = Some(handle.clone());
    while let Some(node) = current {
        if hides_itself(&node) {
            return true;
        }
        current = parent(&node);
    }
    false
}

fn hides_itself(handle: &Handle) -> bool {
    if attr(handle, "hidden").is_some() {
        return true;
    }
    if attr(handle, "aria-hidden").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        return true;
    }
    attr(handle, "style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none")
    })
}

/// Removes `handle` from its parent.
pub fn detach(handle: &Handle) {
    if let Some(parent) = parent(handle) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, handle));
    }
    handle.parent.set(None);
}

/// Appends `child` as the last child of `parent`, detaching it first.
pub fn append(parent: &Handle, child: &Handle) {
    detach(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// First `<body>` element of a parsed document.
#[must_use]
pub fn body(dom: &RcDom) -> Option<Handle> {
    first_descendant(&dom.document, |h| is_tag(h, "body"))
}
