//! Declarative event routing.
//!
//! The page registers one listener per event kind; the router maps the
//! event target, and each of its ancestors in bubbling order, onto
//! [`Intent`]s through a table of selector-keyed routes.

use foundation::ids::{PanelId, RoomId};
use scene::{AttrOp, SceneHost, Selector};

use crate::error::TourError;
use crate::guides::Propagation;
use crate::layout::{self, INFO_ATTR, TARGET_ATTR, TARGET_IMG_ATTR};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
}

impl EventKind {
    pub fn from_dom(name: &str) -> Option<Self> {
        match name {
            "click" => Some(EventKind::Click),
            "submit" => Some(EventKind::Submit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Submit => "submit",
        }
    }
}

/// What a routed gesture asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate {
        room: RoomId,
        background: Option<String>,
    },
    ShowPanel(PanelId),
    /// Close the panel enclosing the control.
    ClosePanel,
    CloseExplanations,
    /// In-VR book button.
    BookRoom,
    CloseBooking,
    GuideClicked,
    OpenBookingForm,
    ShowInfoButtonPanel,
    GoToEntryRoom,
    ShowCurrentGuide,
    SubmitBooking,
    CancelBooking,
}

impl Intent {
    /// Guide clicks never reach ancestor handlers.
    pub fn propagation(&self) -> Propagation {
        match self {
            Intent::GuideClicked => Propagation::Stop,
            _ => Propagation::Continue,
        }
    }

    pub fn prevents_default(&self) -> bool {
        matches!(self, Intent::SubmitBooking)
    }
}

/// Read access to the attributes of the element a route matched.
pub trait Attributes {
    fn get(&self, name: &str) -> Option<String>;
}

struct ElementAttributes<'h, H: SceneHost> {
    host: &'h H,
    element: &'h H::Element,
}

impl<H: SceneHost> Attributes for ElementAttributes<'_, H> {
    fn get(&self, name: &str) -> Option<String> {
        self.host.attribute(self.element, name)
    }
}

pub type IntentFn = fn(&dyn Attributes) -> Option<Intent>;

pub struct Route {
    pub event: EventKind,
    pub pattern: Selector,
    pub intent: IntentFn,
}

/// An intent together with the element whose route produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<E> {
    pub intent: Intent,
    pub element: E,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan<E> {
    pub routed: Vec<Routed<E>>,
    pub prevent_default: bool,
}

impl<E> Default for RoutePlan<E> {
    fn default() -> Self {
        Self {
            routed: Vec::new(),
            prevent_default: false,
        }
    }
}

/// Summary of one dispatched event, returned to the host.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub handled: usize,
    pub prevent_default: bool,
}

#[derive(Default)]
pub struct EventRouter {
    routes: Vec<Route>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page's routes. Order matters only among routes matching the same
    /// element.
    pub fn standard() -> Self {
        let mut router = Self::new();
        router.push(EventKind::Click, layout::all_guides(), |_| {
            Some(Intent::GuideClicked)
        });
        router.push(
            EventKind::Click,
            Selector::class(layout::CLICKABLE_CLASS).with_attr(TARGET_ATTR, AttrOp::Exists),
            |attrs| {
                let room = attrs.get(TARGET_ATTR)?;
                let room = room.trim();
                if room.is_empty() {
                    return None;
                }
                Some(Intent::Navigate {
                    room: RoomId::new(room),
                    background: attrs.get(TARGET_IMG_ATTR).filter(|s| !s.is_empty()),
                })
            },
        );
        router.push(
            EventKind::Click,
            Selector::class(layout::CLICKABLE_CLASS).with_attr(INFO_ATTR, AttrOp::Exists),
            |attrs| {
                attrs
                    .get(INFO_ATTR)
                    .filter(|p| !p.trim().is_empty())
                    .map(|p| Intent::ShowPanel(PanelId::new(p.trim())))
            },
        );
        router.push(EventKind::Click, layout::action("close-panel"), |_| {
            Some(Intent::ClosePanel)
        });
        router.push(EventKind::Click, layout::action("close-explanation"), |_| {
            Some(Intent::CloseExplanations)
        });
        router.push(EventKind::Click, layout::action("book-room"), |_| {
            Some(Intent::BookRoom)
        });
        router.push(EventKind::Click, layout::action("close-booking"), |_| {
            Some(Intent::CloseBooking)
        });
        router.push(EventKind::Click, Selector::id("booking-button"), |_| {
            Some(Intent::OpenBookingForm)
        });
        router.push(EventKind::Click, Selector::id("info-button"), |_| {
            Some(Intent::ShowInfoButtonPanel)
        });
        router.push(EventKind::Click, Selector::id("lobby-button"), |_| {
            Some(Intent::GoToEntryRoom)
        });
        router.push(EventKind::Click, Selector::id("guide-button"), |_| {
            Some(Intent::ShowCurrentGuide)
        });
        router.push(
            EventKind::Click,
            Selector::tag("button")
                .with_class("cancel")
                .with_attr(layout::ACTION_ATTR, AttrOp::Equals("cancel-booking".into())),
            |_| Some(Intent::CancelBooking),
        );
        router.push(
            EventKind::Submit,
            Selector::id(layout::BOOKING_FORM_ELEMENT_ID),
            |_| Some(Intent::SubmitBooking),
        );
        router
    }

    pub fn push(&mut self, event: EventKind, pattern: Selector, intent: IntentFn) {
        self.routes.push(Route {
            event,
            pattern,
            intent,
        });
    }

    /// Adds a route keyed by a selector string.
    pub fn with_route(
        mut self,
        event: EventKind,
        pattern: &str,
        intent: IntentFn,
    ) -> Result<Self, TourError> {
        let pattern = Selector::parse(pattern)?;
        self.push(event, pattern, intent);
        Ok(self)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Walks from `target` up through its ancestors collecting intents.
    ///
    /// The walk ends after the first element that produced an intent whose
    /// propagation is [`Propagation::Stop`]; other routes on that same
    /// element still apply.
    pub fn route<H: SceneHost>(
        &self,
        host: &H,
        event: EventKind,
        target: &H::Element,
    ) -> RoutePlan<H::Element> {
        let mut plan = RoutePlan::default();
        let mut cur = Some(target.clone());
        while let Some(el) = cur {
            let mut stop = false;
            for route in self.routes.iter().filter(|r| r.event == event) {
                if !host.matches(&el, &route.pattern) {
                    continue;
                }
                let attrs = ElementAttributes { host, element: &el };
                let Some(intent) = (route.intent)(&attrs) else {
                    continue;
                };
                stop |= intent.propagation() == Propagation::Stop;
                plan.prevent_default |= intent.prevents_default();
                plan.routed.push(Routed {
                    intent,
                    element: el.clone(),
                });
            }
            if stop {
                break;
            }
            cur = host.parent(&el);
        }
        plan
    }
}
