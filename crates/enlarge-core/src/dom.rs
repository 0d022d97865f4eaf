//! Host DOM seam.
//!
//! The controller only needs a handful of document operations. Hosts expose
//! them through [`Dom`]; element handles are cheap, comparable by identity, and
//! shared with the host (like `web_sys::Element`), so every method borrows the
//! host immutably.

use core::fmt;

use crate::error::DomError;

pub trait Dom {
    /// Identity handle to an element. Equality means "same node".
    type Element: Clone + PartialEq + fmt::Debug;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// `document.body`.
    fn body(&self) -> Option<Self::Element>;

    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;

    fn set_id(&self, element: &Self::Element, id: &str);

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str)
    -> Result<(), DomError>;

    /// Set one inline style property (kebab-case name).
    fn set_style(&self, element: &Self::Element, property: &str, value: &str)
    -> Result<(), DomError>;

    /// Remove one inline style property, restoring the stylesheet value.
    fn remove_style(&self, element: &Self::Element, property: &str) -> Result<(), DomError>;

    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), DomError>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError>;

    fn remove_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError>;

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Deep copy of `element` and its subtree, detached from the document.
    fn deep_clone(&self, element: &Self::Element) -> Result<Self::Element, DomError>;

    /// Nearest inclusive ancestor of `element` carrying `class`.
    fn closest_with_class(&self, element: &Self::Element, class: &str) -> Option<Self::Element>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;

    /// Current vertical scroll offset of the page, `0.0` if unknown.
    fn scroll_y(&self) -> f64;

    fn scroll_to(&self, x: f64, y: f64);
}
