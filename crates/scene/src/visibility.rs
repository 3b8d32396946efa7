use crate::host::SceneHost;
use crate::selector::Selector;

pub const VISIBLE_ATTR: &str = "visible";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
}

impl Visibility {
    pub fn visible() -> Self {
        Self { visible: true }
    }

    pub fn hidden() -> Self {
        Self { visible: false }
    }

    /// Attribute text the scene engine interprets.
    pub fn as_attr(self) -> &'static str {
        if self.visible { "true" } else { "false" }
    }

    /// An unset or unrecognised attribute is `None`; the scene engine
    /// treats that as visible.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "true" => Some(Self::visible()),
            "false" => Some(Self::hidden()),
            _ => None,
        }
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        Self { visible }
    }
}

/// Typed visibility capability over any [`SceneHost`].
pub trait VisibilityTarget: SceneHost {
    fn set_visible(&mut self, element: &Self::Element, visibility: impl Into<Visibility>) {
        self.set_attribute(element, VISIBLE_ATTR, visibility.into().as_attr());
    }

    fn visibility(&self, element: &Self::Element) -> Option<Visibility> {
        self.attribute(element, VISIBLE_ATTR)
            .and_then(|v| Visibility::from_attr(&v))
    }

    fn is_visible(&self, element: &Self::Element) -> bool {
        self.visibility(element).is_none_or(|v| v.visible)
    }

    /// Hides every match; returns how many elements were touched.
    fn hide_all(&mut self, selector: &Selector) -> usize {
        let targets = self.query_all(selector);
        for el in &targets {
            self.set_visible(el, false);
        }
        targets.len()
    }

    /// Elements matching `selector` whose `visible` attribute is `"true"`.
    fn shown(&self, selector: &Selector) -> Vec<Self::Element> {
        self.query_all(selector)
            .into_iter()
            .filter(|el| self.visibility(el) == Some(Visibility::visible()))
            .collect()
    }
}

impl<H: SceneHost + ?Sized> VisibilityTarget for H {}
