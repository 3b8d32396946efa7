use std::fmt;

/// Opaque room identifier (`"lobby"`, `"room"`, `"reception"`, ...).
///
/// Any string is accepted; the scene markup is looked up by naming
/// convention (`#<id>-hotspots`, `#<id>-guide`, `#<id>-explanation`), never
/// against a fixed set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        RoomId(id.into())
    }

    /// Parse a room id out of a background reference such as `"#lobby"`.
    ///
    /// Returns `None` for an empty reference; callers treat that as an
    /// unknown room.
    pub fn from_background_ref(src: &str) -> Option<Self> {
        let id = src.trim().trim_start_matches('#');
        if id.is_empty() {
            None
        } else {
            Some(RoomId(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Background reference for the room's panorama asset.
    pub fn background_ref(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        RoomId::new(s)
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        RoomId(s)
    }
}

/// Literal element id of an overlay panel (`"lobby-info"`, `"room-explanation"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        PanelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn explanation_for(room: &RoomId) -> Self {
        PanelId(format!("{}-explanation", room.as_str()))
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(s: &str) -> Self {
        PanelId::new(s)
    }
}
