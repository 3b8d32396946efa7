use foundation::ids::{PanelId, RoomId};
use foundation::time::{Clock, SystemClock};
use runtime::{DeferredQueue, Event, EventBus, TaskId};
use scene::SceneHost;

use crate::booking::{BookingDraft, BookingFlow};
use crate::config::TourConfig;
use crate::error::TourError;
use crate::guides::GuideInteractionManager;
use crate::loading::{DeferredAction, LoadingScreen};
use crate::panels::{CloseTarget, PanelFamily, PanelManager};
use crate::rooms::RoomStateController;
use crate::routing::{DispatchOutcome, EventKind, EventRouter, Intent};
use crate::state::ApplicationState;

/// Owns the host and every piece of tour state, and is the only place
/// controller errors are turned into diagnostics.
///
/// Public operations never fail: a failed lookup is logged as a warning on
/// the event bus and the operation returns `false` (or `None`).
pub struct TourApp<H: SceneHost> {
    host: H,
    config: TourConfig,
    state: ApplicationState,
    bus: EventBus,
    deferred: DeferredQueue<DeferredAction>,
    router: EventRouter,
    clock: Box<dyn Clock>,
}

impl<H: SceneHost> TourApp<H> {
    pub fn new(host: H, config: TourConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            host,
            config,
            state: ApplicationState::new(),
            bus: EventBus::new(),
            deferred: DeferredQueue::new(),
            router: EventRouter::standard(),
            clock,
        }
    }

    pub fn with_defaults(host: H) -> Self {
        Self::new(host, TourConfig::default(), Box::new(SystemClock))
    }

    pub fn with_router(mut self, router: EventRouter) -> Self {
        self.router = router;
        self
    }

    /// Page-ready setup: loading overlay, desktop booking form and the home
    /// button state for the entry room.
    pub fn start(&mut self) {
        self.bus.info("loading", "VR Hotel Tour initialized");
        let overlay = LoadingScreen::new(&mut self.host, &mut self.bus).ensure();
        self.report("loading", overlay);
        let form = self.booking().ensure_form();
        self.report("booking", form);
        let entry = self.config.entry_room();
        self.rooms().update_home_button_visibility(&entry);
    }

    /// The scene finished loading; reveal it after the configured delay.
    pub fn on_scene_loaded(&mut self, now_ms: f64) -> TaskId {
        self.bus.debug("loading", "Scene loaded signal received");
        self.deferred
            .schedule(now_ms, self.config.loading_delay_ms, DeferredAction::RevealScene)
    }

    /// Runs every deferred action due at `now_ms`; returns how many ran.
    pub fn run_due(&mut self, now_ms: f64) -> usize {
        let due = self.deferred.take_due(now_ms);
        for action in &due {
            self.run_action(*action);
        }
        due.len()
    }

    /// Runs one scheduled action now, for hosts whose timer owns the delay.
    /// Returns `false` if it already ran or was cancelled.
    pub fn run_task(&mut self, task: TaskId) -> bool {
        match self.deferred.take(task) {
            Some(action) => {
                self.run_action(action);
                true
            }
            None => false,
        }
    }

    fn run_action(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::RevealScene => self.reveal_scene(),
        }
    }

    pub fn next_due_ms(&self) -> Option<f64> {
        self.deferred.next_due_ms()
    }

    fn reveal_scene(&mut self) {
        let hidden = LoadingScreen::new(&mut self.host, &mut self.bus).hide();
        self.report("loading", hidden);
        self.setup_guides();
        self.state.scene_ready = true;
    }

    /// Derives the current room from the live background, shows its guide
    /// and makes every guide clickable.
    pub fn setup_guides(&mut self) {
        let room = self.rooms().sync_from_scene();
        if let Some(room) = self.report("guide", room) {
            self.rooms().update_guide_visibility(&room);
        }
        self.guides().make_guides_clickable();
    }

    /// Routes one DOM event and executes the resulting intents in bubbling
    /// order.
    pub fn dispatch(&mut self, event: EventKind, target: &H::Element) -> DispatchOutcome {
        let plan = self.router.route(&self.host, event, target);
        let id = self.host.element_id(target).unwrap_or_default();
        self.bus.debug(
            "routing",
            format!("{} on {id:?}: {} intent(s)", event.as_str(), plan.routed.len()),
        );
        for routed in &plan.routed {
            self.execute(&routed.intent, &routed.element);
        }
        DispatchOutcome {
            handled: plan.routed.len(),
            prevent_default: plan.prevent_default,
        }
    }

    fn execute(&mut self, intent: &Intent, element: &H::Element) {
        match intent {
            Intent::Navigate { room, background } => {
                self.navigate_to_with(room, background.as_deref());
            }
            Intent::ShowPanel(panel) => {
                self.show_panel(panel);
            }
            Intent::ClosePanel => {
                let closed = self
                    .panels()
                    .close_panel(CloseTarget::Closest(element.clone()));
                self.report("panel", closed);
            }
            Intent::CloseExplanations => {
                self.panels().clear_family(PanelFamily::Explanation);
            }
            Intent::BookRoom => {
                let booked = self.booking().book_from_vr(element);
                self.report("booking", booked);
            }
            Intent::CloseBooking => {
                let closed = self.booking().close_confirmation();
                self.report("booking", closed);
            }
            Intent::GuideClicked => {
                self.guides().on_guide_click(element);
            }
            Intent::OpenBookingForm => {
                let room_type = self.config.default_room_type.clone();
                self.open_booking_form(&room_type);
            }
            Intent::ShowInfoButtonPanel => {
                let panel = self.config.info_button_panel();
                let shown = self.panels().show_in_family(&panel, PanelFamily::Info);
                self.report("panel", shown);
            }
            Intent::GoToEntryRoom => {
                let entry = self.config.entry_room();
                self.navigate_to(&entry);
            }
            Intent::ShowCurrentGuide => {
                let room = self.rooms().current_room();
                if let Some(room) = self.report("guide", room) {
                    self.show_guide_explanation(&room);
                }
            }
            Intent::SubmitBooking => {
                self.submit_booking();
            }
            Intent::CancelBooking => {
                self.close_booking_form();
            }
        }
    }

    /// Navigates with the conventional `#<room>` background.
    pub fn navigate_to(&mut self, room: &RoomId) -> bool {
        self.navigate_to_with(room, None)
    }

    pub fn navigate_to_with(&mut self, room: &RoomId, background: Option<&str>) -> bool {
        let result = self.rooms().navigate_to(room, background);
        self.report("navigation", result).is_some()
    }

    pub fn show_panel(&mut self, panel: &PanelId) -> bool {
        let result = self.panels().show_panel(panel);
        self.report("panel", result).is_some()
    }

    pub fn show_guide_explanation(&mut self, location: &RoomId) -> bool {
        let result = self.guides().show_guide_explanation(location);
        self.report("guide", result).is_some()
    }

    pub fn open_booking_form(&mut self, room_type: &str) -> bool {
        let result = self.booking().open_booking_form(room_type);
        self.report("booking", result).is_some()
    }

    pub fn close_booking_form(&mut self) -> bool {
        let result = self.booking().close_booking_form();
        self.report("booking", result).is_some()
    }

    pub fn submit_booking(&mut self) -> Option<BookingDraft> {
        let result = self.booking().submit_booking();
        self.report("booking", result)
    }

    /// Drops pending deferred work. The page keeps its elements.
    pub fn teardown(&mut self) {
        self.deferred.cancel_all();
        self.bus.debug("loading", "Tour torn down");
    }

    pub fn rooms(&mut self) -> RoomStateController<'_, H> {
        RoomStateController::new(&mut self.host, &mut self.state, &mut self.bus, &self.config)
    }

    pub fn panels(&mut self) -> PanelManager<'_, H> {
        PanelManager::new(&mut self.host, &mut self.bus)
    }

    pub fn guides(&mut self) -> GuideInteractionManager<'_, H> {
        GuideInteractionManager::new(&mut self.host, &mut self.bus)
    }

    pub fn booking(&mut self) -> BookingFlow<'_, H> {
        BookingFlow::new(
            &mut self.host,
            &mut self.state,
            &mut self.bus,
            &self.config,
            &*self.clock,
        )
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn drain_diagnostics(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    fn report<T>(&mut self, kind: &'static str, result: Result<T, TourError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.bus.warn(kind, e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TourApp;
    use crate::config::TourConfig;
    use crate::layout::{self, NavigableTarget};
    use crate::panels::PanelFamily;
    use crate::routing::EventKind;
    use crate::state::BookingState;
    use formats::{TourManifest, build_document};
    use foundation::ids::RoomId;
    use foundation::time::{CalendarDate, FixedClock};
    use pretty_assertions::assert_eq;
    use runtime::Level;
    use scene::{EntityId, SceneDocument, SceneHost, Selector, VisibilityTarget};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn started() -> TourApp<SceneDocument> {
        init_tracing();
        let doc = build_document(&TourManifest::hotel().unwrap()).unwrap();
        let clock = FixedClock(CalendarDate::new(2024, 3, 5).unwrap());
        let mut app = TourApp::new(doc, TourConfig::default(), Box::new(clock));
        app.start();
        app
    }

    fn loaded() -> TourApp<SceneDocument> {
        let mut app = started();
        app.on_scene_loaded(0.0);
        app.run_due(1000.0);
        app
    }

    fn click(app: &mut TourApp<SceneDocument>, el: EntityId) -> usize {
        app.dispatch(EventKind::Click, &el).handled
    }

    fn by_id(app: &TourApp<SceneDocument>, id: &str) -> EntityId {
        app.host().by_id(id).unwrap()
    }

    fn open_panels(app: &TourApp<SceneDocument>) -> Vec<String> {
        let doc = app.host();
        doc.shown(&PanelFamily::all())
            .iter()
            .filter_map(|e| doc.element_id(e))
            .collect()
    }

    fn visible(app: &TourApp<SceneDocument>, id: &str) -> bool {
        app.host().is_visible(&by_id(app, id))
    }

    #[test]
    fn start_builds_overlays_and_hides_home_in_entry_room() {
        let app = started();
        let doc = app.host();
        let overlay = doc.by_id("loading-screen").unwrap();
        assert!(doc.is_displayed(&overlay));
        let form = doc.by_id("booking-form").unwrap();
        assert!(!doc.is_displayed(&form));
        assert!(!visible(&app, "home-button"));
        assert!(app.bus().warnings().next().is_none());
    }

    #[test]
    fn loading_overlay_waits_for_the_delay_then_sets_up_guides() {
        let mut app = started();
        app.on_scene_loaded(500.0);
        assert_eq!(app.next_due_ms(), Some(1500.0));
        assert_eq!(app.run_due(1499.0), 0);
        assert!(!app.state().scene_ready);

        assert_eq!(app.run_due(1500.0), 1);
        let overlay = by_id(&app, "loading-screen");
        assert!(!app.host().is_displayed(&overlay));
        assert!(app.state().scene_ready);
        assert_eq!(app.state().current_room().map(RoomId::as_str), Some("lobby"));
        assert_eq!(
            app.host()
                .query_all(&Selector::parse(".guide.clickable").unwrap())
                .len(),
            3
        );
    }

    #[test]
    fn timer_owned_reveal_runs_before_the_wall_clock_due_time() {
        let mut app = started();
        let task = app.on_scene_loaded(10_000.0);
        assert_eq!(app.run_due(10_999.0), 0);
        assert!(app.run_task(task));
        assert!(app.state().scene_ready);
        let overlay = app.host().by_id("loading-screen").unwrap();
        assert!(!app.host().is_displayed(&overlay));
        assert!(!app.run_task(task));
    }

    #[test]
    fn teardown_cancels_the_pending_reveal() {
        let mut app = started();
        app.on_scene_loaded(0.0);
        app.teardown();
        assert_eq!(app.run_due(5000.0), 0);
        assert!(app.next_due_ms().is_none());
    }

    #[test]
    fn hotspot_and_home_button_clicks_move_between_rooms() {
        let mut app = loaded();
        let group = by_id(&app, "lobby-hotspots");
        let to_room = app
            .host()
            .query_within(&group, &Selector::has_attr("data-target"))[0];
        assert_eq!(click(&mut app, to_room), 1);
        assert_eq!(app.state().current_room().map(RoomId::as_str), Some("room"));
        assert!(visible(&app, "room-hotspots"));
        assert!(!visible(&app, "lobby-hotspots"));
        assert!(visible(&app, "home-button"));

        let home = by_id(&app, "home-button");
        click(&mut app, home);
        assert_eq!(app.state().current_room().map(RoomId::as_str), Some("lobby"));
        assert!(!visible(&app, "home-button"));
        let sky = app.host().skybox().unwrap();
        assert_eq!(app.host().attribute(&sky, "src").as_deref(), Some("#lobby"));
    }

    #[test]
    fn guide_nested_in_a_hotspot_does_not_navigate() {
        let mut app = loaded();
        let doc = app.host_mut();
        let hotspot = doc.append(
            None,
            "a-entity",
            &[("class", "clickable"), ("data-target", "room")],
        );
        let guide = doc.append(
            Some(hotspot),
            "a-entity",
            &[("class", "guide clickable"), ("data-location", "reception")],
        );
        let model = doc.append(Some(guide), "a-entity", &[("gltf-model", "#guide-model")]);

        assert_eq!(click(&mut app, model), 1);
        assert_eq!(open_panels(&app), vec!["reception-explanation".to_string()]);
        assert_eq!(app.state().current_room().map(RoomId::as_str), Some("lobby"));

        // the reception guide's own model was restarted
        let reception_guide = by_id(&app, "reception-guide");
        let mixer = app.host().query_within(&reception_guide, &layout::animated_model())[0];
        assert_eq!(
            app.host().attribute(&mixer, "animation-mixer").as_deref(),
            Some("clip: *; loop: repeat; timeScale: 1")
        );
    }

    #[test]
    fn unknown_guide_location_warns_and_shows_nothing() {
        let mut app = loaded();
        app.drain_diagnostics();
        assert!(!app.show_guide_explanation(&RoomId::new("unknown")));
        assert!(open_panels(&app).is_empty());
        let events = app.drain_diagnostics();
        let warning = events.iter().find(|e| e.level == Level::Warn).unwrap();
        assert_eq!(warning.kind, "guide");
        assert_eq!(
            warning.message,
            "Explanation panel not found for location: unknown"
        );
    }

    #[test]
    fn navigating_to_a_missing_room_is_a_warning_not_a_failure() {
        let mut app = loaded();
        assert!(!app.navigate_to(&RoomId::new("spa")));
        assert_eq!(app.state().current_room().map(RoomId::as_str), Some("lobby"));
        assert!(visible(&app, "lobby-hotspots"));
        assert_eq!(app.bus().warnings().count(), 1);
    }

    #[test]
    fn info_hotspot_and_close_control() {
        let mut app = loaded();
        let group = by_id(&app, "lobby-hotspots");
        let info = app.host().query_within(&group, &Selector::has_attr("data-info"))[0];
        click(&mut app, info);
        assert_eq!(open_panels(&app), vec!["lobby-info".to_string()]);

        let panel = by_id(&app, "lobby-info");
        let close = app.host().query_within(&panel, &layout::action("close-panel"))[0];
        click(&mut app, close);
        assert!(open_panels(&app).is_empty());
    }

    #[test]
    fn close_explanation_hides_every_explanation() {
        let mut app = loaded();
        app.show_guide_explanation(&RoomId::new("lobby"));
        let panel = by_id(&app, "lobby-explanation");
        let close = app
            .host()
            .query_within(&panel, &layout::action("close-explanation"))[0];
        click(&mut app, close);
        assert!(open_panels(&app).is_empty());
    }

    #[test]
    fn desktop_buttons() {
        let mut app = loaded();
        app.navigate_to(&RoomId::new("reception"));

        let guide_button = by_id(&app, "guide-button");
        click(&mut app, guide_button);
        assert_eq!(open_panels(&app), vec!["reception-explanation".to_string()]);

        // the info button only clears the info family
        let info_button = by_id(&app, "info-button");
        click(&mut app, info_button);
        assert_eq!(
            open_panels(&app),
            vec!["lobby-info".to_string(), "reception-explanation".to_string()]
        );

        let lobby_button = by_id(&app, "lobby-button");
        click(&mut app, lobby_button);
        assert_eq!(app.state().current_room().map(RoomId::as_str), Some("lobby"));

        let booking_button = by_id(&app, "booking-button");
        click(&mut app, booking_button);
        assert_eq!(app.state().booking, BookingState::Open);
    }

    #[test]
    fn form_submit_prevents_default_and_confirms() {
        let mut app = loaded();
        assert!(app.open_booking_form("room"));
        let guests = by_id(&app, "guests");
        app.host_mut().set_value(&guests, "2");

        let form = by_id(&app, "hotel-booking");
        let outcome = app.dispatch(EventKind::Submit, &form);
        assert!(outcome.prevent_default);
        assert_eq!(outcome.handled, 1);

        assert!(visible(&app, "booking-confirmation"));
        let text = by_id(&app, "booking-text");
        assert_eq!(
            app.host().attribute(&text, "value").as_deref(),
            Some("Luxury Suite Booked!")
        );
        assert_eq!(app.host().notifications().len(), 1);
        assert_eq!(app.state().booking, BookingState::Closed);

        let close = app
            .host()
            .query_first(&layout::action("close-booking"))
            .unwrap();
        click(&mut app, close);
        assert!(!visible(&app, "booking-confirmation"));
    }

    #[test]
    fn cancel_button_closes_the_form() {
        let mut app = loaded();
        app.open_booking_form("room");
        let cancel = app
            .host()
            .query_first(&Selector::parse("button.cancel").unwrap())
            .unwrap();
        assert_eq!(click(&mut app, cancel), 1);
        let form = by_id(&app, "booking-form");
        assert!(!app.host().is_displayed(&form));
        assert_eq!(app.state().booking, BookingState::Closed);
    }

    #[test]
    fn vr_book_button_on_desktop_confirms_and_opens_form() {
        let mut app = loaded();
        app.navigate_to(&RoomId::new("room"));
        app.show_panel(&"room-info".into());
        let panel = by_id(&app, "room-info");
        let book = app.host().query_within(&panel, &layout::action("book-room"))[0];
        click(&mut app, book);

        assert!(open_panels(&app).is_empty());
        assert!(visible(&app, "booking-confirmation"));
        let form = by_id(&app, "booking-form");
        assert!(app.host().is_displayed(&form));
        let check_in = by_id(&app, "check-in");
        assert_eq!(app.host().value(&check_in).as_deref(), Some("2024-03-05"));
    }
}
