use foundation::ids::RoomId;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum BookingState {
    #[default]
    Closed,
    Open,
}

/// The page's only real state.
///
/// Held explicitly and handed to each controller instead of being re-read
/// from the scene on every query. `current_room` is `None` until it is
/// either navigated to or derived from the scene background.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplicationState {
    pub current_room: Option<RoomId>,
    pub booking: BookingState,
    pub scene_ready: bool,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_room(room: impl Into<RoomId>) -> Self {
        Self {
            current_room: Some(room.into()),
            ..Self::default()
        }
    }

    pub fn current_room(&self) -> Option<&RoomId> {
        self.current_room.as_ref()
    }
}
