//! Interaction core of the hotel virtual tour: room navigation, overlay
//! panels, guide characters and the mock booking flow, written against the
//! `scene::SceneHost` surface so it runs over a browser document or an
//! in-memory one.

pub mod app;
pub mod booking;
pub mod config;
pub mod error;
pub mod guides;
pub mod layout;
pub mod loading;
pub mod panels;
pub mod rooms;
pub mod routing;
pub mod state;

pub use app::TourApp;
pub use booking::{BookingDraft, BookingFlow};
pub use config::TourConfig;
pub use error::TourError;
pub use guides::{AnimationDirective, GuideInteractionManager, LoopMode, Propagation};
pub use layout::NavigableTarget;
pub use loading::{DeferredAction, LoadingScreen};
pub use panels::{CloseTarget, PanelFamily, PanelKind, PanelManager};
pub use rooms::RoomStateController;
pub use routing::{DispatchOutcome, EventKind, EventRouter, Intent};
pub use state::{ApplicationState, BookingState};
