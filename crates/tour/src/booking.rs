use std::fmt;

use foundation::time::{CalendarDate, Clock};
use runtime::EventBus;
use scene::{SceneHost, Selector, VisibilityTarget};

use crate::config::TourConfig;
use crate::error::TourError;
use crate::layout::{
    self, BOOKING_CONFIRMATION_ID, BOOKING_FORM_ELEMENT_ID, BOOKING_FORM_ID, BOOKING_TEXT_ID,
    CHECK_IN_ID, CHECK_OUT_ID, GUESTS_ID, NavigableTarget, ROOM_TYPE_ID,
};
use crate::state::{ApplicationState, BookingState};

const KIND: &str = "booking";

/// Form fields read at submit time. Never stored past the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub room_type: String,
    pub check_in: CalendarDate,
    pub check_out: CalendarDate,
    pub guests: u32,
}

impl fmt::Display for BookingDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "roomType={} checkIn={} checkOut={} guests={}",
            self.room_type, self.check_in, self.check_out, self.guests
        )
    }
}

/// The mock reservation workflow: a desktop form and an in-VR book action
/// that both end in [`BookingFlow::confirm`].
pub struct BookingFlow<'a, H: SceneHost> {
    host: &'a mut H,
    state: &'a mut ApplicationState,
    bus: &'a mut EventBus,
    config: &'a TourConfig,
    clock: &'a dyn Clock,
}

impl<'a, H: SceneHost> BookingFlow<'a, H> {
    pub fn new(
        host: &'a mut H,
        state: &'a mut ApplicationState,
        bus: &'a mut EventBus,
        config: &'a TourConfig,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            host,
            state,
            bus,
            config,
            clock,
        }
    }

    /// Builds the desktop form unless the page already has one. The form
    /// starts hidden.
    pub fn ensure_form(&mut self) -> Result<H::Element, TourError> {
        if let Some(existing) = self.host.by_id(BOOKING_FORM_ID) {
            return Ok(existing);
        }
        let root = self
            .host
            .create_element("div", None)
            .ok_or_else(|| TourError::missing(&Selector::id(BOOKING_FORM_ID)))?;
        self.host.set_attribute(&root, "id", BOOKING_FORM_ID);
        self.host.set_displayed(&root, false);
        self.text_element("h2", &root, "Book Your Stay")?;

        let form = self.child("form", &root, &[("id", BOOKING_FORM_ELEMENT_ID)])?;

        self.label(&form, ROOM_TYPE_ID, "Room Type:")?;
        let room_type = self.child("select", &form, &[("id", ROOM_TYPE_ID), ("name", ROOM_TYPE_ID)])?;
        let default_room = self.config.default_room_type.clone();
        self.option(&room_type, &default_room, "Luxury Suite - $250/night")?;
        self.host.set_value(&room_type, &default_room);

        for (id, label) in [(CHECK_IN_ID, "Check-in Date:"), (CHECK_OUT_ID, "Check-out Date:")] {
            self.label(&form, id, label)?;
            self.child(
                "input",
                &form,
                &[("type", "date"), ("id", id), ("name", id), ("required", "")],
            )?;
        }

        self.label(&form, GUESTS_ID, "Number of Guests:")?;
        let guests = self.child("select", &form, &[("id", GUESTS_ID), ("name", GUESTS_ID)])?;
        for n in 1..=self.config.max_guests {
            let text = if n == 1 {
                "1 Person".to_string()
            } else {
                format!("{n} People")
            };
            self.option(&guests, &n.to_string(), &text)?;
        }
        self.host.set_value(&guests, "1");

        let actions = self.child("div", &form, &[])?;
        let submit = self.child("button", &actions, &[("type", "submit")])?;
        self.host.append_text(&submit, "Book Now");
        let cancel = self.child(
            "button",
            &actions,
            &[("type", "button"), ("class", "cancel"), ("data-action", "cancel-booking")],
        )?;
        self.host.append_text(&cancel, "Cancel");

        self.bus.debug(KIND, "Booking form created");
        Ok(root)
    }

    /// Shows the form with `room_type` selected and dates reset to today and
    /// tomorrow. Nothing typed into an earlier opening survives.
    pub fn open_booking_form(&mut self, room_type: &str) -> Result<(), TourError> {
        let form = self.ensure_form()?;
        self.host.set_displayed(&form, true);

        let today = self.clock.today();
        self.set_field(ROOM_TYPE_ID, room_type)?;
        self.set_field(CHECK_IN_ID, &today.to_string())?;
        self.set_field(CHECK_OUT_ID, &today.succ().to_string())?;

        self.state.booking = BookingState::Open;
        self.bus.info(KIND, format!("Booking form opened for {room_type}"));
        Ok(())
    }

    pub fn close_booking_form(&mut self) -> Result<(), TourError> {
        let form = self
            .host
            .by_id(BOOKING_FORM_ID)
            .ok_or_else(|| TourError::missing(&Selector::id(BOOKING_FORM_ID)))?;
        self.host.set_displayed(&form, false);
        self.state.booking = BookingState::Closed;
        Ok(())
    }

    pub fn read_draft(&self) -> Result<BookingDraft, TourError> {
        let room_type = self.field(ROOM_TYPE_ID)?;
        let check_in = self.date_field(CHECK_IN_ID)?;
        let check_out = self.date_field(CHECK_OUT_ID)?;
        let raw_guests = self.field(GUESTS_ID)?;
        let guests = raw_guests
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(TourError::InvalidBooking {
                field: GUESTS_ID,
                value: raw_guests,
            })?;
        Ok(BookingDraft {
            room_type,
            check_in,
            check_out,
            guests,
        })
    }

    /// Reads the draft, logs and drops it, then closes the form and shows
    /// the confirmation. The desktop acknowledgment is issued once.
    ///
    /// Every element involved is resolved before anything changes, so an
    /// unreadable draft or a missing confirmation panel leaves the form open
    /// and confirms nothing.
    pub fn submit_booking(&mut self) -> Result<BookingDraft, TourError> {
        let draft = self.read_draft()?;
        let form = self
            .host
            .by_id(BOOKING_FORM_ID)
            .ok_or_else(|| TourError::missing(&Selector::id(BOOKING_FORM_ID)))?;
        let (panel, text) = self.confirm_targets()?;
        self.bus.info(KIND, format!("Booking submitted: {draft}"));
        self.host.set_displayed(&form, false);
        self.state.booking = BookingState::Closed;
        self.show_confirmation(&panel, &text);
        let ack = self.config.desktop_ack_text.clone();
        self.host.notify(&ack);
        Ok(draft)
    }

    /// Terminal transition shared by the form and the in-VR book action.
    pub fn confirm(&mut self) -> Result<(), TourError> {
        let (panel, text) = self.confirm_targets()?;
        self.show_confirmation(&panel, &text);
        Ok(())
    }

    /// The confirmation panel and its text element.
    fn confirm_targets(&self) -> Result<(H::Element, H::Element), TourError> {
        let panel = self
            .host
            .by_id(BOOKING_CONFIRMATION_ID)
            .ok_or_else(|| TourError::missing(&Selector::id(BOOKING_CONFIRMATION_ID)))?;
        let text = self
            .host
            .by_id(BOOKING_TEXT_ID)
            .ok_or_else(|| TourError::missing(&Selector::id(BOOKING_TEXT_ID)))?;
        Ok((panel, text))
    }

    fn show_confirmation(&mut self, panel: &H::Element, text: &H::Element) {
        self.host
            .set_attribute(text, "value", &self.config.confirmation_text);
        self.host.set_visible(panel, true);
        self.bus.info(KIND, "Booking confirmed");
    }

    /// In-VR book button: closes the enclosing info panel and confirms. On a
    /// desktop viewport the form opens as well.
    pub fn book_from_vr(&mut self, button: &H::Element) -> Result<(), TourError> {
        let (confirmation, text) = self.confirm_targets()?;
        if let Some(panel) = self.host.closest(button, &layout::info_panels()) {
            self.host.set_visible(&panel, false);
        }
        self.show_confirmation(&confirmation, &text);
        if self.config.is_desktop(self.host.viewport_width()) {
            let room_type = self.config.default_room_type.clone();
            self.open_booking_form(&room_type)?;
        }
        Ok(())
    }

    pub fn close_confirmation(&mut self) -> Result<(), TourError> {
        let panel = self
            .host
            .by_id(BOOKING_CONFIRMATION_ID)
            .ok_or_else(|| TourError::missing(&Selector::id(BOOKING_CONFIRMATION_ID)))?;
        self.host.set_visible(&panel, false);
        Ok(())
    }

    fn field(&self, id: &str) -> Result<String, TourError> {
        let el = self
            .host
            .by_id(id)
            .ok_or_else(|| TourError::missing(&Selector::id(id)))?;
        Ok(self.host.value(&el).unwrap_or_default())
    }

    fn date_field(&self, id: &'static str) -> Result<CalendarDate, TourError> {
        let raw = self.field(id)?;
        raw.parse().map_err(|_| TourError::InvalidBooking {
            field: id,
            value: raw,
        })
    }

    fn set_field(&mut self, id: &str, value: &str) -> Result<(), TourError> {
        let el = self
            .host
            .by_id(id)
            .ok_or_else(|| TourError::missing(&Selector::id(id)))?;
        self.host.set_value(&el, value);
        Ok(())
    }

    fn child(
        &mut self,
        tag: &str,
        parent: &H::Element,
        attrs: &[(&str, &str)],
    ) -> Result<H::Element, TourError> {
        let el = self
            .host
            .create_element(tag, Some(parent))
            .ok_or_else(|| TourError::missing(&Selector::tag(tag)))?;
        for (name, value) in attrs {
            self.host.set_attribute(&el, name, value);
        }
        Ok(el)
    }

    fn text_element(&mut self, tag: &str, parent: &H::Element, text: &str) -> Result<H::Element, TourError> {
        let el = self.child(tag, parent, &[])?;
        self.host.append_text(&el, text);
        Ok(el)
    }

    fn label(&mut self, parent: &H::Element, target: &str, text: &str) -> Result<(), TourError> {
        let el = self.child("label", parent, &[("for", target)])?;
        self.host.append_text(&el, text);
        Ok(())
    }

    fn option(&mut self, select: &H::Element, value: &str, text: &str) -> Result<(), TourError> {
        let el = self.child("option", select, &[("value", value)])?;
        self.host.append_text(&el, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingDraft, BookingFlow};
    use crate::config::TourConfig;
    use crate::error::TourError;
    use crate::layout::NavigableTarget;
    use crate::state::{ApplicationState, BookingState};
    use formats::{TourManifest, build_document};
    use foundation::time::{CalendarDate, FixedClock};
    use pretty_assertions::assert_eq;
    use runtime::EventBus;
    use scene::{SceneDocument, SceneHost, Selector, VisibilityTarget};

    struct Fixture {
        doc: SceneDocument,
        state: ApplicationState,
        bus: EventBus,
        config: TourConfig,
        clock: FixedClock,
    }

    impl Fixture {
        fn hotel() -> Self {
            Self {
                doc: build_document(&TourManifest::hotel().unwrap()).unwrap(),
                state: ApplicationState::new(),
                bus: EventBus::new(),
                config: TourConfig::default(),
                clock: FixedClock(CalendarDate::new(2024, 3, 5).unwrap()),
            }
        }

        fn booking(&mut self) -> BookingFlow<'_, SceneDocument> {
            BookingFlow::new(
                &mut self.doc,
                &mut self.state,
                &mut self.bus,
                &self.config,
                &self.clock,
            )
        }

        fn value(&self, id: &str) -> Option<String> {
            let el = self.doc.by_id(id).unwrap();
            self.doc.value(&el)
        }

        fn form_displayed(&self) -> bool {
            let form = self.doc.by_id("booking-form").unwrap();
            self.doc.is_displayed(&form)
        }

        fn confirmation_visible(&self) -> bool {
            let panel = self.doc.by_id("booking-confirmation").unwrap();
            self.doc.is_visible(&panel)
        }
    }

    #[test]
    fn form_is_built_once_and_starts_hidden() {
        let mut f = Fixture::hotel();
        let first = f.booking().ensure_form().unwrap();
        let second = f.booking().ensure_form().unwrap();
        assert_eq!(first, second);
        assert_eq!(f.doc.query_all(&Selector::id("booking-form")).len(), 1);
        assert!(!f.form_displayed());

        let guests = f.doc.by_id("guests").unwrap();
        let options = f.doc.query_within(&guests, &Selector::tag("option"));
        let values: Vec<_> = options
            .iter()
            .filter_map(|o| f.doc.attribute(o, "value"))
            .collect();
        assert_eq!(values, vec!["1", "2", "3", "4"]);
        assert_eq!(f.doc.text(options[1]), "2 People");
        assert!(f.doc.by_id("hotel-booking").is_some());
    }

    #[test]
    fn opening_defaults_dates_to_today_and_tomorrow() {
        let mut f = Fixture::hotel();
        f.booking().open_booking_form("room").unwrap();
        assert!(f.form_displayed());
        assert_eq!(f.value("room-type").as_deref(), Some("room"));
        assert_eq!(f.value("check-in").as_deref(), Some("2024-03-05"));
        assert_eq!(f.value("check-out").as_deref(), Some("2024-03-06"));
        assert_eq!(f.state.booking, BookingState::Open);
    }

    #[test]
    fn check_out_rolls_over_month_end() {
        let mut f = Fixture::hotel();
        f.clock = FixedClock(CalendarDate::new(2023, 12, 31).unwrap());
        f.booking().open_booking_form("room").unwrap();
        assert_eq!(f.value("check-out").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn reopening_resets_edited_fields() {
        let mut f = Fixture::hotel();
        f.booking().open_booking_form("room").unwrap();
        let check_in = f.doc.by_id("check-in").unwrap();
        f.doc.set_value(&check_in, "2024-04-01");
        f.booking().close_booking_form().unwrap();
        assert_eq!(f.state.booking, BookingState::Closed);
        f.booking().open_booking_form("room").unwrap();
        assert_eq!(f.value("check-in").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn submit_confirms_and_acknowledges_once() {
        let mut f = Fixture::hotel();
        f.booking().open_booking_form("room").unwrap();
        let guests = f.doc.by_id("guests").unwrap();
        f.doc.set_value(&guests, "2");

        let draft = f.booking().submit_booking().unwrap();
        assert_eq!(
            draft,
            BookingDraft {
                room_type: "room".into(),
                check_in: CalendarDate::new(2024, 3, 5).unwrap(),
                check_out: CalendarDate::new(2024, 3, 6).unwrap(),
                guests: 2,
            }
        );
        assert!(!f.form_displayed());
        assert!(f.confirmation_visible());
        let text = f.doc.by_id("booking-text").unwrap();
        assert_eq!(f.doc.attribute(&text, "value").as_deref(), Some("Luxury Suite Booked!"));
        assert_eq!(
            f.doc.notifications(),
            &["Booking confirmed! Check your email for details.".to_string()]
        );
    }

    #[test]
    fn unreadable_draft_keeps_form_open() {
        let mut f = Fixture::hotel();
        f.booking().open_booking_form("room").unwrap();
        let check_out = f.doc.by_id("check-out").unwrap();
        f.doc.set_value(&check_out, "");

        let err = f.booking().submit_booking().unwrap_err();
        assert_eq!(
            err,
            TourError::InvalidBooking {
                field: "check-out",
                value: String::new()
            }
        );
        assert!(f.form_displayed());
        assert!(!f.confirmation_visible());
        assert!(f.doc.notifications().is_empty());
    }

    #[test]
    fn missing_confirmation_panel_keeps_form_open() {
        let mut manifest = TourManifest::hotel().unwrap();
        manifest.booking_confirmation = false;
        let mut f = Fixture::hotel();
        f.doc = build_document(&manifest).unwrap();
        f.booking().open_booking_form("room").unwrap();

        let err = f.booking().submit_booking().unwrap_err();
        assert_eq!(
            err,
            TourError::MissingElement {
                selector: "#booking-confirmation".into()
            }
        );
        assert!(f.form_displayed());
        assert_eq!(f.state.booking, BookingState::Open);
        assert!(f.doc.notifications().is_empty());
    }

    #[test]
    fn vr_book_without_confirmation_panel_leaves_info_panel_open() {
        let mut manifest = TourManifest::hotel().unwrap();
        manifest.booking_confirmation = false;
        let mut f = Fixture::hotel();
        f.doc = build_document(&manifest).unwrap();
        let panel = f.doc.by_id("room-info").unwrap();
        f.doc.set_visible(&panel, true);
        let book = f.doc.query_within(&panel, &crate::layout::action("book-room"))[0];

        assert!(f.booking().book_from_vr(&book).is_err());
        assert!(f.doc.is_visible(&panel));
    }

    #[test]
    fn vr_and_form_paths_write_the_same_confirmation() {
        let mut vr = Fixture::hotel();
        vr.doc.set_viewport_width(600.0);
        let panel = vr.doc.by_id("room-info").unwrap();
        vr.doc.set_visible(&panel, true);
        let book = vr
            .doc
            .query_within(&panel, &crate::layout::action("book-room"))[0];
        vr.booking().book_from_vr(&book).unwrap();
        assert!(!vr.doc.is_visible(&panel));
        assert!(vr.confirmation_visible());
        // narrow viewport: no desktop form
        assert!(vr.doc.by_id("booking-form").is_none());

        let mut form = Fixture::hotel();
        form.booking().open_booking_form("room").unwrap();
        form.booking().submit_booking().unwrap();

        let text = |f: &Fixture| {
            let t = f.doc.by_id("booking-text").unwrap();
            f.doc.attribute(&t, "value")
        };
        assert_eq!(text(&vr), text(&form));
    }

    #[test]
    fn vr_book_on_desktop_also_opens_form() {
        let mut f = Fixture::hotel();
        f.doc.set_viewport_width(1024.0);
        let panel = f.doc.by_id("room-info").unwrap();
        let book = f.doc.query_within(&panel, &crate::layout::action("book-room"))[0];
        f.booking().book_from_vr(&book).unwrap();
        assert!(f.confirmation_visible());
        assert!(f.form_displayed());
        assert_eq!(f.value("room-type").as_deref(), Some("room"));
        assert!(f.doc.notifications().is_empty());
    }

    #[test]
    fn closing_confirmation_hides_it() {
        let mut f = Fixture::hotel();
        f.booking().confirm().unwrap();
        f.booking().close_confirmation().unwrap();
        assert!(!f.confirmation_visible());
    }
}
