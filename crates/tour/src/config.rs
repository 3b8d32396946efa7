use foundation::ids::{PanelId, RoomId};
use serde::{Deserialize, Serialize};

use crate::error::TourError;

/// Page-level knobs. Every field has a default, so a partial JSON object
/// (or none at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Room with no home button; also the initial room.
    pub entry_room: String,
    /// Viewports strictly wider than this count as desktop.
    pub desktop_min_width_px: f64,
    /// Delay between the scene-loaded signal and loading-overlay removal.
    pub loading_delay_ms: u32,
    pub default_room_type: String,
    pub confirmation_text: String,
    pub desktop_ack_text: String,
    pub info_button_panel: String,
    pub max_guests: u32,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            entry_room: "lobby".to_string(),
            desktop_min_width_px: 768.0,
            loading_delay_ms: 1000,
            default_room_type: "room".to_string(),
            confirmation_text: "Luxury Suite Booked!".to_string(),
            desktop_ack_text: "Booking confirmed! Check your email for details.".to_string(),
            info_button_panel: "lobby-info".to_string(),
            max_guests: 4,
        }
    }
}

impl TourConfig {
    pub fn from_json(payload: &str) -> Result<Self, TourError> {
        let config: TourConfig =
            serde_json::from_str(payload).map_err(|e| TourError::Config(e.to_string()))?;
        if config.entry_room.trim().is_empty() {
            return Err(TourError::Config("entry_room must not be empty".to_string()));
        }
        if config.max_guests == 0 {
            return Err(TourError::Config("max_guests must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn entry_room(&self) -> RoomId {
        RoomId::new(self.entry_room.clone())
    }

    pub fn info_button_panel(&self) -> PanelId {
        PanelId::new(self.info_button_panel.clone())
    }

    pub fn is_desktop(&self, viewport_width_px: f64) -> bool {
        viewport_width_px > self.desktop_min_width_px
    }
}
