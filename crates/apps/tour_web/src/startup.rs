//! Boot-path helpers that do not touch the page.

use runtime::TaskId;
use scene::SceneHost;
use tour::{TourApp, TourConfig};

/// A reveal waiting on a browser timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PendingReveal {
    pub task: TaskId,
    pub timeout_ms: i32,
}

/// Schedules the overlay reveal and returns what the browser timer needs.
pub fn schedule<H: SceneHost>(app: &mut TourApp<H>, now_ms: f64) -> PendingReveal {
    let task = app.on_scene_loaded(now_ms);
    PendingReveal {
        task,
        timeout_ms: i32::try_from(app.config().loading_delay_ms).unwrap_or(i32::MAX),
    }
}

/// Timer callback. The timer already waited the delay, so the task runs
/// regardless of what the wall clock says.
pub fn fire<H: SceneHost>(app: &mut TourApp<H>, pending: PendingReveal) -> bool {
    app.run_task(pending.task)
}

/// A-Frame's `hasLoaded` flag; anything but `true` means the `loaded`
/// event is still to come.
pub fn already_loaded(flag: Option<bool>) -> bool {
    flag == Some(true)
}

/// Config for the fetched boot path: a bad payload falls back to the
/// defaults and reports why.
pub fn config_or_default(payload: Result<String, String>) -> (TourConfig, Option<String>) {
    match payload.and_then(|text| TourConfig::from_json(&text).map_err(|e| e.to_string())) {
        Ok(config) => (config, None),
        Err(err) => (
            TourConfig::default(),
            Some(format!("Failed to load tour config: {err}")),
        ),
    }
}
