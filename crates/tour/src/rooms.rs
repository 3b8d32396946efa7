use foundation::ids::RoomId;
use runtime::EventBus;
use scene::{SceneHost, Selector, VISIBLE_ATTR, VisibilityTarget};

use crate::config::TourConfig;
use crate::error::TourError;
use crate::layout::{self, CLICKABLE_CLASS, HOME_BUTTON_ID, NavigableTarget, SKYBOX_ID};
use crate::state::ApplicationState;

const KIND: &str = "navigation";

/// Owns the current room and everything derived from it: which hotspot
/// group, which guide and whether the home button are visible.
///
/// Derived visibility is recomputed in full on every transition; nothing is
/// patched incrementally.
pub struct RoomStateController<'a, H: SceneHost> {
    host: &'a mut H,
    state: &'a mut ApplicationState,
    bus: &'a mut EventBus,
    config: &'a TourConfig,
}

impl<'a, H: SceneHost> RoomStateController<'a, H> {
    pub fn new(
        host: &'a mut H,
        state: &'a mut ApplicationState,
        bus: &'a mut EventBus,
        config: &'a TourConfig,
    ) -> Self {
        Self {
            host,
            state,
            bus,
            config,
        }
    }

    /// Room id embedded in the live background reference.
    pub fn current_room_from_scene(&self) -> Result<RoomId, TourError> {
        let skybox = self
            .host
            .skybox()
            .ok_or_else(|| TourError::missing(&Selector::id(SKYBOX_ID)))?;
        self.host
            .attribute(&skybox, "src")
            .and_then(|src| RoomId::from_background_ref(&src))
            .ok_or(TourError::UnknownRoom)
    }

    /// The held room, falling back to the scene when nothing is held yet.
    pub fn current_room(&mut self) -> Result<RoomId, TourError> {
        if let Some(room) = self.state.current_room() {
            return Ok(room.clone());
        }
        self.sync_from_scene()
    }

    /// Re-derives the held room from the scene background.
    pub fn sync_from_scene(&mut self) -> Result<RoomId, TourError> {
        let room = self.current_room_from_scene()?;
        self.bus.debug(KIND, format!("Current room: {room}"));
        self.state.current_room = Some(room.clone());
        Ok(room)
    }

    /// Switches to `room`, using `background` for the panorama or `#<room>`
    /// when none is given.
    ///
    /// Both the background and the target hotspot group are resolved before
    /// anything is written, so an unknown room leaves the scene untouched.
    pub fn navigate_to(&mut self, room: &RoomId, background: Option<&str>) -> Result<(), TourError> {
        let skybox = self
            .host
            .skybox()
            .ok_or_else(|| TourError::missing(&Selector::id(SKYBOX_ID)))?;
        let target = self
            .host
            .hotspots_of(room)
            .ok_or_else(|| TourError::missing(&Selector::id(&layout::hotspots_id(room))))?;

        self.bus.info(KIND, format!("Navigating to: {room}"));
        let src = background
            .map(str::to_string)
            .unwrap_or_else(|| room.background_ref());
        self.host.set_attribute(&skybox, "src", &src);

        // All groups go dark before the target lights up.
        self.host.hide_all(&layout::all_hotspot_groups());
        self.host.set_visible(&target, true);

        self.update_home_button_visibility(room);
        self.update_guide_visibility(room);
        self.state.current_room = Some(room.clone());
        Ok(())
    }

    /// Visible everywhere except the entry room.
    pub fn home_button_visible(&self, room: &RoomId) -> bool {
        room.as_str() != self.config.entry_room
    }

    pub fn update_home_button_visibility(&mut self, room: &RoomId) {
        let visible = self.home_button_visible(room);
        match self.host.by_id(HOME_BUTTON_ID) {
            Some(button) => self.host.set_visible(&button, visible),
            None => self
                .bus
                .warn(KIND, TourError::missing(&Selector::id(HOME_BUTTON_ID)).to_string()),
        }
    }

    /// Hides every guide, then shows the one belonging to `room`.
    ///
    /// The shown guide becomes clickable and any descendant that declares its
    /// own `visible` attribute is shown with it. A room without a guide is
    /// logged and otherwise ignored.
    pub fn update_guide_visibility(&mut self, room: &RoomId) -> Option<H::Element> {
        self.bus
            .debug("guide", format!("Updating guide visibility for room: {room}"));
        self.host.hide_all(&layout::all_guides());

        let Some(guide) = self.host.guide_of(room) else {
            self.bus.warn(
                "guide",
                TourError::MissingGuide { room: room.clone() }.to_string(),
            );
            return None;
        };

        self.bus.debug(
            "guide",
            format!("Making guide visible: {}", layout::guide_id(room)),
        );
        self.host.set_visible(&guide, true);
        self.host.add_class(&guide, CLICKABLE_CLASS);
        for child in self
            .host
            .query_within(&guide, &Selector::has_attr(VISIBLE_ATTR))
        {
            self.host.set_visible(&child, true);
        }
        Some(guide)
    }
}
