use std::fmt;

use foundation::ids::{PanelId, RoomId};
use runtime::EventBus;
use scene::{SceneHost, VisibilityTarget};

use crate::error::TourError;
use crate::layout::{self, ANIMATION_ATTR, CLICKABLE_CLASS, LOCATION_ATTR, NavigableTarget};
use crate::panels::PanelManager;

const KIND: &str = "guide";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Repeat,
    PingPong,
}

impl LoopMode {
    fn as_str(self) -> &'static str {
        match self {
            LoopMode::Once => "once",
            LoopMode::Repeat => "repeat",
            LoopMode::PingPong => "pingpong",
        }
    }
}

/// Value of the `animation-mixer` attribute the scene engine interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDirective {
    pub clip: String,
    pub loop_mode: LoopMode,
    pub time_scale: f64,
}

impl AnimationDirective {
    /// Every clip, looping, at normal speed: the guide's "talking" cue.
    pub fn talking() -> Self {
        Self {
            clip: "*".to_string(),
            loop_mode: LoopMode::Repeat,
            time_scale: 1.0,
        }
    }

    /// Parses `key: value; ...` pairs; unknown keys are ignored and missing
    /// keys take the engine defaults (`clip: *`, `loop: repeat`, `timeScale: 1`).
    pub fn parse(value: &str) -> Self {
        let mut out = Self::talking();
        for pair in value.split(';') {
            let Some((key, val)) = pair.split_once(':') else {
                continue;
            };
            let val = val.trim();
            match key.trim() {
                "clip" => out.clip = val.to_string(),
                "loop" => {
                    out.loop_mode = match val {
                        "once" => LoopMode::Once,
                        "pingpong" => LoopMode::PingPong,
                        _ => LoopMode::Repeat,
                    }
                }
                "timeScale" => out.time_scale = val.parse().unwrap_or(1.0),
                _ => {}
            }
        }
        out
    }
}

impl fmt::Display for AnimationDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clip: {}; loop: {}; timeScale: {}",
            self.clip,
            self.loop_mode.as_str(),
            self.time_scale
        )
    }
}

/// Whether a routed event keeps bubbling to ancestor handlers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Routes clicks on a room's guide to its explanation panel and replays the
/// guide's talking animation.
pub struct GuideInteractionManager<'a, H: SceneHost> {
    host: &'a mut H,
    bus: &'a mut EventBus,
}

impl<'a, H: SceneHost> GuideInteractionManager<'a, H> {
    pub fn new(host: &'a mut H, bus: &'a mut EventBus) -> Self {
        Self { host, bus }
    }

    /// Handles a click on `guide`. Always stops propagation, so a hotspot
    /// enclosing the guide never sees the same click.
    pub fn on_guide_click(&mut self, guide: &H::Element) -> Propagation {
        let id = self.host.element_id(guide).unwrap_or_default();
        self.bus.info(KIND, format!("Guide clicked: {id}"));
        match self.host.attribute(guide, LOCATION_ATTR) {
            Some(location) if !location.trim().is_empty() => {
                if let Err(e) = self.show_guide_explanation(&RoomId::new(location.trim())) {
                    self.bus.warn(KIND, e.to_string());
                }
            }
            _ => self
                .bus
                .warn(KIND, format!("Guide {id:?} has no {LOCATION_ATTR}")),
        }
        Propagation::Stop
    }

    /// Clears both panel families, shows `<location>-explanation` and
    /// restarts the guide's animation.
    ///
    /// A missing explanation panel ends the call with an error after the
    /// families are cleared; a missing guide or animated model only logs.
    pub fn show_guide_explanation(&mut self, location: &RoomId) -> Result<(), TourError> {
        self.bus.info(
            KIND,
            format!("Showing guide explanation for location: {location}"),
        );
        PanelManager::new(&mut *self.host, &mut *self.bus).clear_families();

        let panel = self
            .host
            .explanation_of(location)
            .ok_or_else(|| TourError::MissingExplanation {
                location: location.clone(),
            })?;
        self.bus.debug(
            "panel",
            format!("Showing explanation panel: {}", PanelId::explanation_for(location)),
        );
        self.host.set_visible(&panel, true);

        match self.restart_animation(location) {
            Ok(()) => self.bus.debug(KIND, "Animation triggered for guide"),
            Err(e) => self.bus.warn(KIND, e.to_string()),
        }
        Ok(())
    }

    /// Reassigns the directive (remove, then set) so the engine replays it
    /// even when it is already looping.
    pub fn restart_animation(&mut self, location: &RoomId) -> Result<(), TourError> {
        let guide = self
            .host
            .guide_of(location)
            .ok_or_else(|| TourError::MissingGuide {
                room: location.clone(),
            })?;
        let model = self
            .host
            .query_within(&guide, &layout::animated_model())
            .into_iter()
            .next()
            .ok_or_else(|| TourError::MissingAnimation {
                location: location.clone(),
            })?;
        self.host.remove_attribute(&model, ANIMATION_ATTR);
        self.host
            .set_attribute(&model, ANIMATION_ATTR, &AnimationDirective::talking().to_string());
        Ok(())
    }

    /// Marks every guide clickable.
    pub fn make_guides_clickable(&mut self) -> usize {
        let guides = self.host.query_all(&layout::all_guides());
        for guide in &guides {
            let id = self.host.element_id(guide).unwrap_or_default();
            self.bus.debug(KIND, format!("Making guide clickable: {id}"));
            self.host.add_class(guide, CLICKABLE_CLASS);
        }
        guides.len()
    }
}
