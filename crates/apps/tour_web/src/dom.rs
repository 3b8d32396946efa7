use scene::{SceneHost, Selector};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, NodeList, Window};

/// `SceneHost` over the live page. A-Frame entities are plain DOM elements,
/// so scene attributes (`visible`, `src`, `animation-mixer`) are written
/// with `setAttribute` and the engine picks them up.
pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn log_failure(what: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        web_sys::console::warn_1(&JsValue::from_str(&format!("{what} failed: {err:?}")));
    }
}

impl SceneHost for DomHost {
    type Element = Element;

    fn query_first(&self, selector: &Selector) -> Option<Element> {
        self.document
            .query_selector(&selector.to_string())
            .ok()
            .flatten()
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        elements(self.document.query_selector_all(&selector.to_string()))
    }

    fn query_within(&self, root: &Element, selector: &Selector) -> Vec<Element> {
        elements(root.query_selector_all(&selector.to_string()))
    }

    fn matches(&self, element: &Element, selector: &Selector) -> bool {
        element.matches(&selector.to_string()).unwrap_or(false)
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn closest(&self, element: &Element, selector: &Selector) -> Option<Element> {
        element.closest(&selector.to_string()).ok().flatten()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
        log_failure("setAttribute", element.set_attribute(name, value));
    }

    fn remove_attribute(&mut self, element: &Element, name: &str) {
        log_failure("removeAttribute", element.remove_attribute(name));
    }

    fn element_id(&self, element: &Element) -> Option<String> {
        Some(element.id()).filter(|id| !id.is_empty())
    }

    fn add_class(&mut self, element: &Element, class: &str) {
        log_failure("classList.add", element.class_list().add_1(class));
    }

    fn value(&self, element: &Element) -> Option<String> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else {
            element.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
        }
    }

    fn set_value(&mut self, element: &Element, value: &str) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn set_displayed(&mut self, element: &Element, displayed: bool) {
        if let Some(el) = element.dyn_ref::<HtmlElement>() {
            let display = if displayed { "block" } else { "none" };
            log_failure("style.display", el.style().set_property("display", display));
        }
    }

    fn is_displayed(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlElement>()
            .and_then(|el| el.style().get_property_value("display").ok())
            .is_none_or(|display| display != "none")
    }

    fn create_element(&mut self, tag: &str, parent: Option<&Element>) -> Option<Element> {
        let el = self.document.create_element(tag).ok()?;
        let appended = match parent {
            Some(parent) => parent.append_child(&el),
            None => self.document.body()?.append_child(&el),
        };
        appended.ok()?;
        Some(el)
    }

    fn append_text(&mut self, element: &Element, text: &str) {
        let node = self.document.create_text_node(text);
        log_failure("appendChild", element.append_child(&node).map(|_| ()));
    }

    fn notify(&mut self, message: &str) {
        log_failure("alert", self.window.alert_with_message(message));
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }
}
