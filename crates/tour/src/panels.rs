use std::fmt;

use foundation::ids::PanelId;
use runtime::EventBus;
use scene::{SceneHost, Selector, VisibilityTarget};

use crate::error::TourError;
use crate::layout::{self, BOOKING_CONFIRMATION_ID, BOOKING_FORM_ID, NavigableTarget};

const KIND: &str = "panel";

/// The two overlay families that share the one-visible-at-a-time rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelFamily {
    Info,
    Explanation,
}

impl PanelFamily {
    pub fn selector(self) -> Selector {
        match self {
            PanelFamily::Info => layout::info_panels(),
            PanelFamily::Explanation => layout::explanation_panels(),
        }
    }

    /// Both families together.
    pub fn all() -> Selector {
        layout::info_panels().or(layout::explanation_panels())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelKind {
    Info,
    Explanation,
    BookingConfirmation,
    BookingForm,
}

impl PanelKind {
    pub fn of<H: SceneHost + ?Sized>(host: &H, panel: &H::Element) -> Option<Self> {
        if host.matches(panel, &layout::info_panels()) {
            Some(PanelKind::Info)
        } else if host.matches(panel, &layout::explanation_panels()) {
            Some(PanelKind::Explanation)
        } else {
            match host.element_id(panel).as_deref() {
                Some(BOOKING_CONFIRMATION_ID) => Some(PanelKind::BookingConfirmation),
                Some(BOOKING_FORM_ID) => Some(PanelKind::BookingForm),
                _ => None,
            }
        }
    }

    pub fn family(self) -> Option<PanelFamily> {
        match self {
            PanelKind::Info => Some(PanelFamily::Info),
            PanelKind::Explanation => Some(PanelFamily::Explanation),
            PanelKind::BookingConfirmation | PanelKind::BookingForm => None,
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PanelKind::Info => "info",
            PanelKind::Explanation => "explanation",
            PanelKind::BookingConfirmation => "booking-confirmation",
            PanelKind::BookingForm => "booking-form",
        })
    }
}

/// Which panel a close control targets.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseTarget<E> {
    Named(PanelId),
    /// Nearest info panel enclosing the given control.
    Closest(E),
}

/// Mutually exclusive show/hide of the info and explanation overlays.
///
/// Opening a panel in either family clears both families, not only the one
/// the panel belongs to.
pub struct PanelManager<'a, H: SceneHost> {
    host: &'a mut H,
    bus: &'a mut EventBus,
}

impl<'a, H: SceneHost> PanelManager<'a, H> {
    pub fn new(host: &'a mut H, bus: &'a mut EventBus) -> Self {
        Self { host, bus }
    }

    /// Hides every info and explanation panel.
    pub fn clear_families(&mut self) -> usize {
        self.host.hide_all(&PanelFamily::all())
    }

    pub fn clear_family(&mut self, family: PanelFamily) -> usize {
        self.host.hide_all(&family.selector())
    }

    /// Clears both families, then shows `panel`.
    ///
    /// A panel id that resolves to nothing is reported before anything is
    /// hidden.
    pub fn show_panel(&mut self, panel: &PanelId) -> Result<(), TourError> {
        let el = self.resolve(panel)?;
        self.clear_families();
        self.reveal(panel, &el);
        Ok(())
    }

    /// Clears one family only, then shows `panel`.
    pub fn show_in_family(&mut self, panel: &PanelId, family: PanelFamily) -> Result<(), TourError> {
        let el = self.resolve(panel)?;
        self.clear_family(family);
        self.reveal(panel, &el);
        Ok(())
    }

    pub fn close_panel(&mut self, target: CloseTarget<H::Element>) -> Result<(), TourError> {
        let el = match target {
            CloseTarget::Named(id) => self.resolve(&id)?,
            CloseTarget::Closest(control) => self
                .host
                .closest(&control, &layout::info_panels())
                .ok_or_else(|| TourError::missing(&layout::info_panels()))?,
        };
        self.host.set_visible(&el, false);
        Ok(())
    }

    /// Elements of either family that are currently shown.
    pub fn open_panels(&self) -> Vec<H::Element> {
        self.host.shown(&PanelFamily::all())
    }

    fn resolve(&self, panel: &PanelId) -> Result<H::Element, TourError> {
        self.host
            .panel(panel)
            .ok_or_else(|| TourError::missing(&Selector::id(panel.as_str())))
    }

    fn reveal(&mut self, panel: &PanelId, el: &H::Element) {
        let kind = PanelKind::of(&*self.host, el)
            .map(|k| k.to_string())
            .unwrap_or_else(|| "untyped".to_string());
        self.bus.debug(KIND, format!("Showing {kind} panel: {panel}"));
        self.host.set_visible(el, true);
    }
}
