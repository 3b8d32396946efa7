use runtime::EventBus;
use scene::{SceneHost, Selector};

use crate::error::TourError;
use crate::layout::{LOADING_SCREEN_ID, NavigableTarget};

const KIND: &str = "loading";
pub const LOADING_TEXT: &str = "Loading VR Experience...";

/// Work queued on the deferred queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Hide the loading overlay, then set up guides.
    RevealScene,
}

/// The full-page overlay shown until the scene reports it has loaded.
pub struct LoadingScreen<'a, H: SceneHost> {
    host: &'a mut H,
    bus: &'a mut EventBus,
}

impl<'a, H: SceneHost> LoadingScreen<'a, H> {
    pub fn new(host: &'a mut H, bus: &'a mut EventBus) -> Self {
        Self { host, bus }
    }

    /// Returns the overlay, building it on first use.
    pub fn ensure(&mut self) -> Result<H::Element, TourError> {
        if let Some(existing) = self.host.by_id(LOADING_SCREEN_ID) {
            return Ok(existing);
        }
        let missing = || TourError::missing(&Selector::id(LOADING_SCREEN_ID));
        let overlay = self.host.create_element("div", None).ok_or_else(missing)?;
        self.host.set_attribute(&overlay, "id", LOADING_SCREEN_ID);
        let spinner = self
            .host
            .create_element("div", Some(&overlay))
            .ok_or_else(missing)?;
        self.host.set_attribute(&spinner, "class", "spinner");
        self.host.append_text(&overlay, LOADING_TEXT);
        self.bus.debug(KIND, "Loading screen shown");
        Ok(overlay)
    }

    pub fn hide(&mut self) -> Result<(), TourError> {
        let overlay = self
            .host
            .by_id(LOADING_SCREEN_ID)
            .ok_or_else(|| TourError::missing(&Selector::id(LOADING_SCREEN_ID)))?;
        self.host.set_displayed(&overlay, false);
        self.bus.info(KIND, "Scene loaded, loading screen hidden");
        Ok(())
    }

    pub fn is_shown(&self) -> bool {
        self.host
            .by_id(LOADING_SCREEN_ID)
            .is_some_and(|o| self.host.is_displayed(&o))
    }
}
