//! Naming conventions shared by the page markup and the controllers.
//!
//! A room `R` exposes `#R-hotspots`, `#R-guide` and `#R-explanation`; a
//! guide's animated model is found by its `animation-mixer` capability,
//! not by name.

use foundation::ids::{PanelId, RoomId};
use scene::{AttrOp, SceneHost, Selector};

pub const SKYBOX_ID: &str = "skybox";
pub const HOME_BUTTON_ID: &str = "home-button";
pub const LOADING_SCREEN_ID: &str = "loading-screen";
pub const BOOKING_FORM_ID: &str = "booking-form";
pub const BOOKING_FORM_ELEMENT_ID: &str = "hotel-booking";
pub const BOOKING_CONFIRMATION_ID: &str = "booking-confirmation";
pub const BOOKING_TEXT_ID: &str = "booking-text";
pub const ROOM_TYPE_ID: &str = "room-type";
pub const CHECK_IN_ID: &str = "check-in";
pub const CHECK_OUT_ID: &str = "check-out";
pub const GUESTS_ID: &str = "guests";

pub const GUIDE_CLASS: &str = "guide";
pub const CLICKABLE_CLASS: &str = "clickable";
pub const INFO_PANEL_CLASS: &str = "info-panel";
pub const EXPLANATION_PANEL_CLASS: &str = "explanation-panel";

pub const ANIMATION_ATTR: &str = "animation-mixer";
pub const LOCATION_ATTR: &str = "data-location";
pub const TARGET_ATTR: &str = "data-target";
pub const TARGET_IMG_ATTR: &str = "data-target-img";
pub const INFO_ATTR: &str = "data-info";
pub const ACTION_ATTR: &str = "data-action";

pub fn hotspots_id(room: &RoomId) -> String {
    format!("{room}-hotspots")
}

pub fn guide_id(room: &RoomId) -> String {
    format!("{room}-guide")
}

pub fn all_hotspot_groups() -> Selector {
    Selector::id_suffix("-hotspots")
}

pub fn all_guides() -> Selector {
    Selector::class(GUIDE_CLASS)
}

pub fn info_panels() -> Selector {
    Selector::class(INFO_PANEL_CLASS)
}

pub fn explanation_panels() -> Selector {
    Selector::class(EXPLANATION_PANEL_CLASS)
}

pub fn animated_model() -> Selector {
    Selector::has_attr(ANIMATION_ATTR)
}

/// `.clickable[data-action="<action>"]`
pub fn action(action: &str) -> Selector {
    Selector::class(CLICKABLE_CLASS).with_attr(ACTION_ATTR, AttrOp::Equals(action.to_string()))
}

/// Typed lookups for the per-room elements.
pub trait NavigableTarget: SceneHost {
    fn skybox(&self) -> Option<Self::Element> {
        self.query_first(&Selector::id(SKYBOX_ID))
    }

    fn hotspots_of(&self, room: &RoomId) -> Option<Self::Element> {
        self.query_first(&Selector::id(&hotspots_id(room)))
    }

    fn guide_of(&self, room: &RoomId) -> Option<Self::Element> {
        self.query_first(&Selector::id(&guide_id(room)))
    }

    fn explanation_of(&self, location: &RoomId) -> Option<Self::Element> {
        self.panel(&PanelId::explanation_for(location))
    }

    fn panel(&self, panel: &PanelId) -> Option<Self::Element> {
        self.query_first(&Selector::id(panel.as_str()))
    }

    fn by_id(&self, id: &str) -> Option<Self::Element> {
        self.query_first(&Selector::id(id))
    }
}

impl<H: SceneHost + ?Sized> NavigableTarget for H {}
