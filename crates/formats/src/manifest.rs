use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MANIFEST_VERSION: &str = "1.0";

/// Declarative description of a tour page's markup: rooms, their hotspots,
/// guides and overlay panels.
///
/// This is the headless counterpart of the page HTML; `scene_loader` turns
/// it into a `SceneDocument` that follows the tour naming conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourManifest {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entry_room: String,
    pub rooms: Vec<RoomEntry>,
    #[serde(default = "default_true")]
    pub home_button: bool,
    #[serde(default = "default_true")]
    pub desktop_controls: bool,
    #[serde(default = "default_true")]
    pub booking_confirmation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomEntry {
    pub id: String,
    /// Background reference; `#<id>` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub hotspots: Vec<HotspotEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide: Option<GuideEntry>,
    /// Whether `#<id>-explanation` exists.
    #[serde(default)]
    pub explanation: bool,
    #[serde(default)]
    pub panels: Vec<PanelEntry>,
}

impl RoomEntry {
    pub fn background_ref(&self) -> String {
        self.image.clone().unwrap_or_else(|| format!("#{}", self.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HotspotEntry {
    Navigate {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_img: Option<String>,
    },
    Info {
        panel: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideEntry {
    /// Embeds a model carrying `animation-mixer`.
    #[serde(default = "default_true")]
    pub animated: bool,
    /// `data-location`; the room id when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelEntry {
    pub id: String,
    /// Carries a `book-room` button.
    #[serde(default)]
    pub bookable: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug)]
pub enum ManifestError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    UnsupportedVersion { found: String },
    DuplicateRoom { id: String },
    UnknownEntryRoom { id: String },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io(err) => write!(f, "I/O error: {err}"),
            ManifestError::Parse(err) => write!(f, "Manifest parse error: {err}"),
            ManifestError::UnsupportedVersion { found } => {
                write!(f, "Unsupported manifest version: {found}")
            }
            ManifestError::DuplicateRoom { id } => write!(f, "room {id:?} is declared twice"),
            ManifestError::UnknownEntryRoom { id } => {
                write!(f, "entry room {id:?} is not declared")
            }
        }
    }
}

impl std::error::Error for ManifestError {}

/// The hotel tour the page ships with: lobby, suite and reception.
pub const HOTEL_TOUR_JSON: &str = include_str!("../assets/hotel_tour.json");

impl TourManifest {
    pub fn new(entry_room: impl Into<String>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            name: None,
            entry_room: entry_room.into(),
            rooms: Vec::new(),
            home_button: true,
            desktop_controls: true,
            booking_confirmation: true,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, ManifestError> {
        let manifest: TourManifest = serde_json::from_str(payload).map_err(ManifestError::Parse)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let payload = fs::read_to_string(path).map_err(ManifestError::Io)?;
        Self::from_json(&payload)
    }

    pub fn hotel() -> Result<Self, ManifestError> {
        Self::from_json(HOTEL_TOUR_JSON)
    }

    pub fn room(&self, id: &str) -> Option<&RoomEntry> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Navigation targets are not checked: markup may point at rooms that
    /// do not exist, and the controllers treat that as a missing element.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.version != MANIFEST_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                found: self.version.clone(),
            });
        }
        let mut seen = std::collections::BTreeSet::new();
        for room in &self.rooms {
            if !seen.insert(room.id.as_str()) {
                return Err(ManifestError::DuplicateRoom {
                    id: room.id.clone(),
                });
            }
        }
        if self.room(&self.entry_room).is_none() {
            return Err(ManifestError::UnknownEntryRoom {
                id: self.entry_room.clone(),
            });
        }
        Ok(())
    }
}
