use enlarge_core::{Dom, DomError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement, Window};

/// [`Dom`] over the live browser document.
#[derive(Debug, Clone)]
pub(crate) struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub(crate) fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }
}

fn js_detail(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn dom_err(op: &'static str) -> impl FnOnce(JsValue) -> DomError {
    move |err| DomError::new(op, js_detail(&err))
}

fn inline_style(element: &Element, op: &'static str) -> Result<CssStyleDeclaration, DomError> {
    element
        .dyn_ref::<HtmlElement>()
        .map(HtmlElement::style)
        .ok_or_else(|| DomError::new(op, "element has no inline style"))
}

impl Dom for WebDom {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        self.document
            .create_element(tag)
            .map_err(dom_err("create_element"))
    }

    fn set_id(&self, element: &Element, id: &str) {
        element.set_id(id);
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), DomError> {
        element
            .set_attribute(name, value)
            .map_err(dom_err("set_attribute"))
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) -> Result<(), DomError> {
        inline_style(element, "set_style")?
            .set_property(property, value)
            .map_err(dom_err("set_style"))
    }

    fn remove_style(&self, element: &Element, property: &str) -> Result<(), DomError> {
        inline_style(element, "remove_style")?
            .remove_property(property)
            .map(|_| ())
            .map_err(dom_err("remove_style"))
    }

    fn add_class(&self, element: &Element, class: &str) -> Result<(), DomError> {
        element
            .class_list()
            .add_1(class)
            .map_err(dom_err("add_class"))
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(dom_err("append_child"))
    }

    fn remove_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent
            .remove_child(child)
            .map(|_| ())
            .map_err(dom_err("remove_child"))
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn deep_clone(&self, element: &Element) -> Result<Element, DomError> {
        element
            .clone_node_with_deep(true)
            .map_err(dom_err("deep_clone"))?
            .dyn_into::<Element>()
            .map_err(|_| DomError::new("deep_clone", "clone is not an element"))
    }

    fn closest_with_class(&self, element: &Element, class: &str) -> Option<Element> {
        // Class names are validated as plain identifiers, no escaping needed.
        element.closest(&format!(".{class}")).ok().flatten()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node))
    }

    fn scroll_y(&self) -> f64 {
        let window_y = self.window.scroll_y().unwrap_or(0.0);
        if window_y > 0.0 {
            return window_y;
        }
        self.document
            .document_element()
            .map_or(0.0, |root| f64::from(root.scroll_top()))
    }

    fn scroll_to(&self, x: f64, y: f64) {
        self.window.scroll_to_with_x_and_y(x, y);
    }
}
