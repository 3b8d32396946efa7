use crate::selector::Selector;

/// The surface a scene/document host exposes to the tour controllers.
///
/// Controllers never touch rendering; they only read and write attributes
/// the host interprets (`visible`, `src`, `animation-mixer`, `value`), toggle
/// overlay display, and construct the few overlay elements they own.
///
/// Lookups return `Option`/`Vec` so a missing element is an ordinary value,
/// never a failure of the host.
pub trait SceneHost {
    type Element: Clone + PartialEq + std::fmt::Debug;

    fn query_first(&self, selector: &Selector) -> Option<Self::Element>;

    /// All matches in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Self::Element>;

    /// Matching descendants of `root` (excluding `root`) in document order.
    fn query_within(&self, root: &Self::Element, selector: &Selector) -> Vec<Self::Element>;

    fn matches(&self, element: &Self::Element, selector: &Selector) -> bool;

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// `element` itself or its nearest ancestor matching `selector`.
    fn closest(&self, element: &Self::Element, selector: &Selector) -> Option<Self::Element> {
        let mut cur = Some(element.clone());
        while let Some(el) = cur {
            if self.matches(&el, selector) {
                return Some(el);
            }
            cur = self.parent(&el);
        }
        None
    }

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn has_attribute(&self, element: &Self::Element, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);

    fn remove_attribute(&mut self, element: &Self::Element, name: &str);

    fn element_id(&self, element: &Self::Element) -> Option<String> {
        self.attribute(element, "id")
    }

    fn add_class(&mut self, element: &Self::Element, class: &str);

    /// Current value of a form control.
    fn value(&self, element: &Self::Element) -> Option<String>;

    fn set_value(&mut self, element: &Self::Element, value: &str);

    /// Overlay display (CSS `display`), distinct from the scene `visible` attribute.
    fn set_displayed(&mut self, element: &Self::Element, displayed: bool);

    fn is_displayed(&self, element: &Self::Element) -> bool;

    /// Creates an element and appends it to `parent`, or to the document body.
    ///
    /// Returns `None` if the host could not create it.
    fn create_element(&mut self, tag: &str, parent: Option<&Self::Element>)
    -> Option<Self::Element>;

    /// Appends a text node.
    fn append_text(&mut self, element: &Self::Element, text: &str);

    /// Blocking user notification (`window.alert` in a browser).
    fn notify(&mut self, message: &str);

    /// Viewport width in CSS pixels.
    fn viewport_width(&self) -> f64;
}
