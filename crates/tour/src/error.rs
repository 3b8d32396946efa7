use std::fmt;

use foundation::ids::RoomId;
use scene::SelectorError;

/// Every failure the controllers know about is a lookup that came back
/// empty. None of them is fatal: the app layer turns each into a warning
/// and the triggering interaction stops there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    MissingElement { selector: String },
    MissingGuide { room: RoomId },
    MissingExplanation { location: RoomId },
    MissingAnimation { location: RoomId },
    /// The scene has no background to derive the current room from.
    UnknownRoom,
    InvalidBooking { field: &'static str, value: String },
    Selector(SelectorError),
    Config(String),
}

impl TourError {
    pub fn missing(selector: &scene::Selector) -> Self {
        TourError::MissingElement {
            selector: selector.to_string(),
        }
    }
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::MissingElement { selector } => write!(f, "no element matches {selector}"),
            TourError::MissingGuide { room } => write!(f, "Guide not found for room: {room}"),
            TourError::MissingExplanation { location } => {
                write!(f, "Explanation panel not found for location: {location}")
            }
            TourError::MissingAnimation { location } => {
                write!(f, "No animation mixer found on guide model for location: {location}")
            }
            TourError::UnknownRoom => write!(f, "current room is unknown (no background set)"),
            TourError::InvalidBooking { field, value } => {
                write!(f, "booking field {field} has invalid value {value:?}")
            }
            TourError::Selector(e) => write!(f, "selector error: {e}"),
            TourError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::Selector(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SelectorError> for TourError {
    fn from(e: SelectorError) -> Self {
        TourError::Selector(e)
    }
}
