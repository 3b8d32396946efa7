use std::collections::BTreeMap;

use crate::entity::EntityId;
use crate::host::SceneHost;
use crate::selector::{ElementView, Selector};
use foundation::handles::Handle;

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Form control value (a DOM property, not an attribute).
    pub value: Option<String>,
    pub displayed: bool,
    pub text: String,
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
}

impl ElementView for ElementNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One attribute write, as recorded by [`SceneDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeWrite {
    pub element: EntityId,
    pub name: String,
    /// `None` for a removal.
    pub value: Option<String>,
}

/// In-memory element tree implementing [`SceneHost`].
///
/// Used for headless hosting and tests. Index 0 is always the `body` root;
/// elements are never removed, matching the page's "toggle, never destroy"
/// lifecycle.
#[derive(Debug)]
pub struct SceneDocument {
    nodes: Vec<ElementNode>,
    viewport_width: f64,
    notifications: Vec<String>,
    writes: Vec<AttributeWrite>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDocument {
    pub fn new() -> Self {
        let body = ElementNode {
            tag: "body".to_string(),
            attributes: BTreeMap::new(),
            value: None,
            displayed: true,
            text: String::new(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            viewport_width: 1280.0,
            notifications: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn body(&self) -> EntityId {
        EntityId(Handle::new(0))
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Messages passed to [`SceneHost::notify`], oldest first.
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Attribute writes made through [`SceneHost`], oldest first.
    pub fn writes(&self) -> &[AttributeWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn node(&self, id: EntityId) -> Option<&ElementNode> {
        self.nodes.get(id.index() as usize)
    }

    fn node_mut(&mut self, id: EntityId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(id.index() as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Appends a new element under `parent` (or the body) with the given attributes.
    pub fn append(
        &mut self,
        parent: Option<EntityId>,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> EntityId {
        let parent = parent
            .filter(|p| (p.index() as usize) < self.nodes.len())
            .unwrap_or_else(|| self.body());
        let id = EntityId(Handle::new(self.nodes.len() as u32));
        self.nodes.push(ElementNode {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            value: None,
            displayed: true,
            text: String::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index() as usize].children.push(id);
        id
    }

    pub fn text(&self, id: EntityId) -> &str {
        self.node(id).map(|n| n.text.as_str()).unwrap_or("")
    }

    /// Preorder walk of the subtree under `root`, excluding `root`.
    fn descendants(&self, root: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = match self.node(root) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = self.node(id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }
}

impl SceneHost for SceneDocument {
    type Element = EntityId;

    fn query_first(&self, selector: &Selector) -> Option<EntityId> {
        self.descendants(self.body())
            .into_iter()
            .find(|id| self.matches(id, selector))
    }

    fn query_all(&self, selector: &Selector) -> Vec<EntityId> {
        self.query_within(&self.body(), selector)
    }

    fn query_within(&self, root: &EntityId, selector: &Selector) -> Vec<EntityId> {
        self.descendants(*root)
            .into_iter()
            .filter(|id| self.matches(id, selector))
            .collect()
    }

    fn matches(&self, element: &EntityId, selector: &Selector) -> bool {
        self.node(*element).is_some_and(|n| selector.matches(n))
    }

    fn parent(&self, element: &EntityId) -> Option<EntityId> {
        self.node(*element).and_then(|n| n.parent)
    }

    fn attribute(&self, element: &EntityId, name: &str) -> Option<String> {
        self.node(*element)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, element: &EntityId, name: &str, value: &str) {
        let Some(n) = self.node_mut(*element) else {
            return;
        };
        n.attributes.insert(name.to_string(), value.to_string());
        self.writes.push(AttributeWrite {
            element: *element,
            name: name.to_string(),
            value: Some(value.to_string()),
        });
    }

    fn remove_attribute(&mut self, element: &EntityId, name: &str) {
        let Some(n) = self.node_mut(*element) else {
            return;
        };
        if n.attributes.remove(name).is_some() {
            self.writes.push(AttributeWrite {
                element: *element,
                name: name.to_string(),
                value: None,
            });
        }
    }

    fn add_class(&mut self, element: &EntityId, class: &str) {
        let Some(n) = self.node_mut(*element) else {
            return;
        };
        let list = n.attributes.entry("class".to_string()).or_default();
        if list.split_whitespace().any(|c| c == class) {
            return;
        }
        if !list.is_empty() {
            list.push(' ');
        }
        list.push_str(class);
    }

    fn value(&self, element: &EntityId) -> Option<String> {
        self.node(*element).and_then(|n| n.value.clone())
    }

    fn set_value(&mut self, element: &EntityId, value: &str) {
        if let Some(n) = self.node_mut(*element) {
            n.value = Some(value.to_string());
        }
    }

    fn set_displayed(&mut self, element: &EntityId, displayed: bool) {
        if let Some(n) = self.node_mut(*element) {
            n.displayed = displayed;
        }
    }

    fn is_displayed(&self, element: &EntityId) -> bool {
        self.node(*element).is_some_and(|n| n.displayed)
    }

    fn create_element(&mut self, tag: &str, parent: Option<&EntityId>) -> Option<EntityId> {
        Some(self.append(parent.copied(), tag, &[]))
    }

    fn append_text(&mut self, element: &EntityId, text: &str) {
        if let Some(n) = self.node_mut(*element) {
            n.text.push_str(text);
        }
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }
}

#[cfg(test)]
mod tests {
    use super::SceneDocument;
    use crate::host::SceneHost;
    use crate::selector::Selector;
    use pretty_assertions::assert_eq;

    #[test]
    fn queries_follow_document_order() {
        let mut doc = SceneDocument::new();
        let a = doc.append(None, "a-entity", &[("class", "guide")]);
        let a_child = doc.append(Some(a), "a-entity", &[("class", "guide")]);
        let b = doc.append(None, "a-entity", &[("class", "guide")]);

        assert_eq!(doc.query_all(&Selector::class("guide")), vec![a, a_child, b]);
        assert_eq!(doc.query_first(&Selector::class("guide")), Some(a));
        assert_eq!(doc.query_within(&a, &Selector::class("guide")), vec![a_child]);
    }

    #[test]
    fn closest_includes_self_and_walks_up() {
        let mut doc = SceneDocument::new();
        let panel = doc.append(None, "a-entity", &[("class", "info-panel")]);
        let button = doc.append(Some(panel), "a-entity", &[("class", "clickable")]);

        let sel = Selector::class("info-panel");
        assert_eq!(doc.closest(&button, &sel), Some(panel));
        assert_eq!(doc.closest(&panel, &sel), Some(panel));
        assert_eq!(doc.closest(&button, &Selector::class("nope")), None);
    }

    #[test]
    fn attribute_writes_are_recorded_in_order() {
        let mut doc = SceneDocument::new();
        let e = doc.append(None, "a-entity", &[("animation-mixer", "clip: idle")]);
        doc.remove_attribute(&e, "animation-mixer");
        doc.remove_attribute(&e, "animation-mixer");
        doc.set_attribute(&e, "animation-mixer", "clip: *");
        let log: Vec<Option<&str>> = doc.writes().iter().map(|w| w.value.as_deref()).collect();
        assert_eq!(log, vec![None, Some("clip: *")]);
        doc.clear_writes();
        assert!(doc.writes().is_empty());
    }

    #[test]
    fn add_class_is_idempotent() {
        let mut doc = SceneDocument::new();
        let g = doc.append(None, "a-entity", &[("class", "guide")]);
        doc.add_class(&g, "clickable");
        doc.add_class(&g, "clickable");
        assert_eq!(doc.attribute(&g, "class").as_deref(), Some("guide clickable"));
    }

    #[test]
    fn created_elements_land_under_body_and_record_text() {
        let mut doc = SceneDocument::new();
        let overlay = doc.create_element("div", None).unwrap();
        doc.set_attribute(&overlay, "id", "loading-screen");
        doc.append_text(&overlay, "Loading");
        assert_eq!(doc.parent(&overlay), Some(doc.body()));
        assert_eq!(doc.query_first(&Selector::id("loading-screen")), Some(overlay));
        assert_eq!(doc.text(overlay), "Loading");
        doc.set_displayed(&overlay, false);
        assert!(!doc.is_displayed(&overlay));
    }
}
