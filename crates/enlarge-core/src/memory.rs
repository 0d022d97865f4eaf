//! Deterministic in-memory document.
//!
//! [`MemoryDom`] models just enough of the DOM for the controller: a node
//! arena with ids, classes, attributes, and ordered inline styles, plus the
//! window's vertical scroll position. Handles are shared like browser
//! documents: cloning a `MemoryDom` yields another handle to the same tree.
//!
//! Every write through the [`Dom`] trait bumps [`MemoryDom::mutation_count`],
//! which lets tests assert that an operation left the document untouched.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::Dom;
use crate::error::DomError;

/// Index of a node in a [`MemoryDom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Inner {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    scroll_y: f64,
    scroll_log: Vec<(f64, f64)>,
    mutations: u64,
}

impl Inner {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        id
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != child);
        }
    }

    fn clone_subtree(&mut self, source: NodeId) -> NodeId {
        let mut copy = self.node(source).clone();
        let children = std::mem::take(&mut copy.children);
        copy.parent = None;
        let id = NodeId(self.nodes.len());
        self.nodes.push(copy);
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.node_mut(child_copy).parent = Some(id);
            self.node_mut(id).children.push(child_copy);
        }
        id
    }

    fn find_by_id(&self, start: NodeId, wanted: &str) -> Option<NodeId> {
        let node = self.node(start);
        if node.id.as_deref() == Some(wanted) {
            return Some(start);
        }
        node.children
            .iter()
            .find_map(|&child| self.find_by_id(child, wanted))
    }

    fn check(&self, id: NodeId, op: &'static str) -> Result<(), DomError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(DomError::new(op, format!("unknown node {}", id.0)))
        }
    }
}

/// Shared handle to an in-memory document.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    inner: Rc<RefCell<Inner>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// A document with an `<html>` root and an empty `<body>`, scrolled to 0.
    #[must_use]
    pub fn new() -> Self {
        let mut inner = Inner {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            scroll_y: 0.0,
            scroll_log: Vec::new(),
            mutations: 0,
        };
        let root = inner.alloc("html");
        let body = inner.alloc("body");
        inner.node_mut(body).parent = Some(root);
        inner.node_mut(root).children.push(body);
        inner.root = root;
        inner.body = body;
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Build a child element under `parent`. Setup helper; does not count as
    /// a mutation.
    pub fn insert(&self, parent: NodeId, tag: &str, id: Option<&str>, classes: &[&str]) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let node = inner.alloc(tag);
        {
            let n = inner.node_mut(node);
            n.id = id.map(str::to_string);
            n.classes = classes.iter().map(|c| (*c).to_string()).collect();
            n.parent = Some(parent);
        }
        inner.node_mut(parent).children.push(node);
        node
    }

    #[must_use]
    pub fn body_id(&self) -> NodeId {
        self.inner.borrow().body
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> String {
        self.inner.borrow().node(node).tag.clone()
    }

    #[must_use]
    pub fn element_id(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().node(node).id.clone()
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.inner.borrow().node(node).classes.clone()
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.borrow().node(node).attributes.get(name).cloned()
    }

    /// Inline style value, `None` when the property is not set.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.inner
            .borrow()
            .node(node)
            .style
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.clone())
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().node(node).children.clone()
    }

    /// Whether `node` is reachable from the document root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        inner.is_inclusive_ancestor(inner.root, node)
    }

    /// Connected nodes carrying `class`, in tree order.
    #[must_use]
    pub fn connected_with_class(&self, class: &str) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        let mut out = Vec::new();
        let mut stack = vec![inner.root];
        while let Some(node) = stack.pop() {
            let n = inner.node(node);
            if n.classes.iter().any(|c| c == class) {
                out.push(node);
            }
            stack.extend(n.children.iter().rev().copied());
        }
        out
    }

    /// Move the simulated viewport without going through `scroll_to`.
    pub fn set_scroll_y(&self, y: f64) {
        self.inner.borrow_mut().scroll_y = y;
    }

    /// Every `scroll_to(x, y)` call, oldest first.
    #[must_use]
    pub fn scroll_log(&self) -> Vec<(f64, f64)> {
        self.inner.borrow().scroll_log.clone()
    }

    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.inner.borrow().mutations
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Inner) -> Result<T, DomError>) -> Result<T, DomError> {
        let mut inner = self.inner.borrow_mut();
        let out = f(&mut inner)?;
        inner.mutations += 1;
        Ok(out)
    }
}

impl Dom for MemoryDom {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        inner.find_by_id(inner.root, id)
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.inner.borrow().body)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() {
            return Err(DomError::new("create_element", "InvalidCharacterError"));
        }
        self.mutate(|inner| Ok(inner.alloc(tag)))
    }

    fn set_id(&self, element: &NodeId, id: &str) {
        let _ = self.mutate(|inner| {
            inner.check(*element, "set_id")?;
            inner.node_mut(*element).id = Some(id.to_string());
            Ok(())
        });
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.mutate(|inner| {
            inner.check(*element, "set_attribute")?;
            inner
                .node_mut(*element)
                .attributes
                .insert(name.to_string(), value.to_string());
            Ok(())
        })
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.mutate(|inner| {
            inner.check(*element, "set_style")?;
            let style = &mut inner.node_mut(*element).style;
            match style.iter_mut().find(|(name, _)| name == property) {
                Some(entry) => entry.1 = value.to_string(),
                None => style.push((property.to_string(), value.to_string())),
            }
            Ok(())
        })
    }

    fn remove_style(&self, element: &NodeId, property: &str) -> Result<(), DomError> {
        self.mutate(|inner| {
            inner.check(*element, "remove_style")?;
            inner
                .node_mut(*element)
                .style
                .retain(|(name, _)| name != property);
            Ok(())
        })
    }

    fn add_class(&self, element: &NodeId, class: &str) -> Result<(), DomError> {
        self.mutate(|inner| {
            inner.check(*element, "add_class")?;
            let classes = &mut inner.node_mut(*element).classes;
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
            Ok(())
        })
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .node(*element)
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.mutate(|inner| {
            inner.check(*parent, "append_child")?;
            inner.check(*child, "append_child")?;
            if inner.is_inclusive_ancestor(*child, *parent) {
                return Err(DomError::new("append_child", "HierarchyRequestError"));
            }
            inner.detach(*child);
            inner.node_mut(*child).parent = Some(*parent);
            inner.node_mut(*parent).children.push(*child);
            Ok(())
        })
    }

    fn remove_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.mutate(|inner| {
            inner.check(*child, "remove_child")?;
            if inner.node(*child).parent != Some(*parent) {
                return Err(DomError::new("remove_child", "NotFoundError"));
            }
            inner.detach(*child);
            Ok(())
        })
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.inner.borrow().node(*element).parent
    }

    fn deep_clone(&self, element: &NodeId) -> Result<NodeId, DomError> {
        self.mutate(|inner| {
            inner.check(*element, "deep_clone")?;
            Ok(inner.clone_subtree(*element))
        })
    }

    fn closest_with_class(&self, element: &NodeId, class: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        let mut cursor = Some(*element);
        while let Some(current) = cursor {
            let node = inner.node(current);
            if node.classes.iter().any(|c| c == class) {
                return Some(current);
            }
            cursor = node.parent;
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.inner.borrow().is_inclusive_ancestor(*ancestor, *node)
    }

    fn scroll_y(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    fn scroll_to(&self, x: f64, y: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.scroll_y = y;
        inner.scroll_log.push((x, y));
        inner.mutations += 1;
    }
}
