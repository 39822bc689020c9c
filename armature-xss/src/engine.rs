use crate::encoder::EntityCodec;
use crate::error::{Result, XssError};
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{ParseOpts, QualName, local_name, namespace_url, ns, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

/// Decides what happens to each parsed element.
pub trait ElementPolicy {
    /// Whether the element stays markup.
    fn keeps(&self, tag: &str) -> bool;

    /// Inert text that replaces a rejected element, given its outer markup.
    fn neutralize(&self, markup: &str) -> String;
}

/// HTML fragment engine used by the tidy filter.
///
/// Implementations parse `markup`, hand every element (never the synthetic
/// container) to `policy`, replace rejected elements together with their
/// subtree, and serialize the result. Without a policy the markup is only
/// parsed and re-serialized.
pub trait FragmentEngine: Send + Sync {
    fn rewrite(&self, markup: &str, policy: Option<&dyn ElementPolicy>) -> Result<String>;
}

/// [`FragmentEngine`] backed by html5ever.
///
/// A fresh DOM is built for every call, so one engine can be shared across
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5everEngine;

impl Html5everEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether markup is a full document rather than a fragment.
    pub fn is_document(markup: &str) -> bool {
        markup.to_ascii_lowercase().contains("<html")
    }

    fn parse_fragment(markup: &str) -> Result<(RcDom, Handle)> {
        let dom = parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            QualName::new(None, ns!(html), local_name!("div")),
            Vec::new(),
        )
        .one(markup);

        // The parser puts the fragment below a single <html> root
        let root = dom
            .document
            .children
            .borrow()
            .iter()
            .find(|node| matches!(node.data, NodeData::Element { .. }))
            .cloned()
            .ok_or_else(|| XssError::Parse("fragment has no root element".to_string()))?;

        Ok((dom, root))
    }
}

impl FragmentEngine for Html5everEngine {
    fn rewrite(&self, markup: &str, policy: Option<&dyn ElementPolicy>) -> Result<String> {
        let (_dom, root) = if Self::is_document(markup) {
            let dom = parse_document(RcDom::default(), ParseOpts::default()).one(markup);
            let root = dom.document.clone();
            (dom, root)
        } else {
            Self::parse_fragment(markup)?
        };

        if let Some(policy) = policy {
            neutralize_elements(&root, policy)?;
        }

        serialize_handle(&root, TraversalScope::ChildrenOnly(None))
    }
}

/// Replace every rejected element below `root` with inert text.
///
/// Rejected elements are not descended into; their subtree becomes part of
/// the replacement text.
fn neutralize_elements(root: &Handle, policy: &dyn ElementPolicy) -> Result<()> {
    let mut pending = vec![root.clone()];

    while let Some(parent) = pending.pop() {
        let children = parent.children.borrow().clone();

        for (index, child) in children.into_iter().enumerate() {
            let keep = match &child.data {
                NodeData::Element { name, .. } => policy.keeps(&name.local),
                _ => continue,
            };

            if keep {
                pending.push(child);
                continue;
            }

            // The text node is escaped again on output
            let markup = EntityCodec::decode_entities(&serialize_handle(
                &child,
                TraversalScope::IncludeNode,
            )?);
            let text = Node::new(NodeData::Text {
                contents: RefCell::new(StrTendril::from(policy.neutralize(&markup))),
            });
            text.parent.set(Some(Rc::downgrade(&parent)));
            child.parent.set(None);
            parent.children.borrow_mut()[index] = text;
        }
    }

    Ok(())
}

fn serialize_handle(handle: &Handle, traversal_scope: TraversalScope) -> Result<String> {
    let mut buffer = Vec::new();
    serialize(
        &mut buffer,
        &SerializableHandle::from(handle.clone()),
        SerializeOpts {
            traversal_scope,
            ..Default::default()
        },
    )?;

    Ok(String::from_utf8(buffer)?)
}
