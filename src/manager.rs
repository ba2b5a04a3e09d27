use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

use crate::ids;
use crate::models::{Event, EventDraft, EventPatch, Registration};
use crate::store::{Store, StoreError};

pub const EVENTS_COLLECTION: &str = "eventco_events_v1";
pub const REGISTRATIONS_COLLECTION: &str = "eventco_regs_v1";

/// Recoverable domain failures. Messages are short enough to show to
/// the end user verbatim.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("name and email are required")]
    MissingNameOrEmail,
    #[error("event not found")]
    EventNotFound,
    #[error("already registered for this event")]
    AlreadyRegistered,
    #[error("no seats left")]
    SoldOut,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns both collections and every rule that ties them together. Each
/// operation loads a full collection, mutates it, and writes it back.
pub struct EventManager<S: Store> {
    store: S,
}

impl<S: Store> EventManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// First-run sample data, keyed off the collection having never
    /// been written (an explicitly emptied catalog stays empty).
    pub fn seed_if_empty(&self) -> Result<(), ManagerError> {
        if self.store.exists(EVENTS_COLLECTION) {
            return Ok(());
        }
        let samples = [
            sample_event("Campus Music Fest", "Open-air music and food", 36, "18:00", "Main Lawn", 300),
            sample_event("Tech Hackathon", "24-hour coding challenge", 24, "09:00", "Lab Block", 150),
            sample_event("Startup Pitch Night", "Students pitch startup ideas", 31, "16:00", "Auditorium", 120),
        ];
        self.store.save(EVENTS_COLLECTION, &samples)?;
        log::info!("seeded {} sample events", samples.len());
        Ok(())
    }

    /// Events sorted ascending by date; unparsable dates sort last.
    /// A non-empty filter keeps events whose title or description
    /// contains it, case-insensitively.
    pub fn list_events(&self, filter: Option<&str>) -> Vec<Event> {
        let mut events: Vec<Event> = self.store.load(EVENTS_COLLECTION);
        if let Some(filter) = filter {
            let needle = filter.trim().to_lowercase();
            if !needle.is_empty() {
                events.retain(|event| {
                    event.title.to_lowercase().contains(&needle)
                        || event.desc.to_lowercase().contains(&needle)
                });
            }
        }
        events.sort_by_key(date_key);
        events
    }

    pub fn count_upcoming(&self) -> usize {
        self.count_upcoming_at(Local::now().naive_local())
    }

    /// Events whose date+time (time defaulting to 00:00) is at or after
    /// `now`. Events with unparsable dates never count as upcoming.
    pub fn count_upcoming_at(&self, now: NaiveDateTime) -> usize {
        self.store
            .load::<Event>(EVENTS_COLLECTION)
            .iter()
            .filter(|event| matches!(event_start(event), Some(start) if start >= now))
            .count()
    }

    pub fn get_event(&self, event_id: &str) -> Result<Event, ManagerError> {
        self.store
            .load::<Event>(EVENTS_COLLECTION)
            .into_iter()
            .find(|event| event.id == event_id)
            .ok_or(ManagerError::EventNotFound)
    }

    /// Seats still open, clamped at zero. Events with capacity 0 have
    /// no limit and always report 0 here; callers deciding between
    /// "unlimited" and "sold out" must look at `capacity` on the record.
    pub fn seats_remaining(&self, event_id: &str) -> Result<u32, ManagerError> {
        let event = self.get_event(event_id)?;
        Ok(event.capacity.saturating_sub(self.registration_count(event_id)))
    }

    pub fn is_full(&self, event_id: &str) -> Result<bool, ManagerError> {
        let event = self.get_event(event_id)?;
        Ok(event.capacity > 0 && self.registration_count(event_id) >= event.capacity)
    }

    pub fn create_event(&self, draft: EventDraft) -> Result<Event, ManagerError> {
        let mut events: Vec<Event> = self.store.load(EVENTS_COLLECTION);
        let event = Event {
            id: ids::event_id(),
            title: draft.title.trim().to_string(),
            desc: draft.desc.trim().to_string(),
            date: draft.date.trim().to_string(),
            time: draft.time.trim().to_string(),
            venue: draft.venue.trim().to_string(),
            capacity: draft.capacity,
            image: draft.image,
            created: Some(Utc::now().to_rfc3339()),
        };
        events.push(event.clone());
        self.store.save(EVENTS_COLLECTION, &events)?;
        Ok(event)
    }

    /// Merges the supplied fields over the stored record; `id` and
    /// `created` are immutable, and an absent image keeps the old one.
    pub fn update_event(&self, event_id: &str, patch: EventPatch) -> Result<Event, ManagerError> {
        let mut events: Vec<Event> = self.store.load(EVENTS_COLLECTION);
        let event = events
            .iter_mut()
            .find(|event| event.id == event_id)
            .ok_or(ManagerError::EventNotFound)?;

        if let Some(title) = patch.title {
            event.title = title.trim().to_string();
        }
        if let Some(desc) = patch.desc {
            event.desc = desc.trim().to_string();
        }
        if let Some(date) = patch.date {
            event.date = date.trim().to_string();
        }
        if let Some(time) = patch.time {
            event.time = time.trim().to_string();
        }
        if let Some(venue) = patch.venue {
            event.venue = venue.trim().to_string();
        }
        if let Some(capacity) = patch.capacity {
            event.capacity = capacity;
        }
        if let Some(image) = patch.image {
            event.image = image;
        }

        let updated = event.clone();
        self.store.save(EVENTS_COLLECTION, &events)?;
        Ok(updated)
    }

    /// Removes the event and every registration referencing it. A
    /// missing id is a silent no-op.
    pub fn delete_event(&self, event_id: &str) -> Result<(), ManagerError> {
        let mut events: Vec<Event> = self.store.load(EVENTS_COLLECTION);
        let before = events.len();
        events.retain(|event| event.id != event_id);
        if events.len() == before {
            return Ok(());
        }
        self.store.save(EVENTS_COLLECTION, &events)?;

        let mut registrations: Vec<Registration> = self.store.load(REGISTRATIONS_COLLECTION);
        registrations.retain(|registration| registration.event_id != event_id);
        self.store.save(REGISTRATIONS_COLLECTION, &registrations)?;
        Ok(())
    }

    /// Claims a seat. Checks run in a fixed order so the caller always
    /// sees the most actionable failure: blank input, then unknown
    /// event, then duplicate email, then capacity.
    pub fn register(
        &self,
        event_id: &str,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<Registration, ManagerError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(ManagerError::MissingNameOrEmail);
        }

        let event = self.get_event(event_id)?;

        let mut registrations: Vec<Registration> = self.store.load(REGISTRATIONS_COLLECTION);
        let email_lower = email.to_lowercase();
        if registrations
            .iter()
            .any(|r| r.event_id == event_id && r.email.to_lowercase() == email_lower)
        {
            return Err(ManagerError::AlreadyRegistered);
        }

        let taken = registrations.iter().filter(|r| r.event_id == event_id).count() as u32;
        if event.capacity > 0 && taken >= event.capacity {
            return Err(ManagerError::SoldOut);
        }

        let registration = Registration {
            id: ids::registration_id(),
            event_id: event_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.unwrap_or_default().trim().to_string(),
            reg_id: ids::confirmation_code(),
            created: Utc::now().to_rfc3339(),
        };
        registrations.push(registration.clone());
        self.store.save(REGISTRATIONS_COLLECTION, &registrations)?;
        Ok(registration)
    }

    /// Registrations for one event, in creation order.
    pub fn registrations_for(&self, event_id: &str) -> Vec<Registration> {
        self.store
            .load::<Registration>(REGISTRATIONS_COLLECTION)
            .into_iter()
            .filter(|registration| registration.event_id == event_id)
            .collect()
    }

    pub fn all_registrations(&self) -> Vec<Registration> {
        self.store.load(REGISTRATIONS_COLLECTION)
    }

    fn registration_count(&self, event_id: &str) -> u32 {
        self.store
            .load::<Registration>(REGISTRATIONS_COLLECTION)
            .iter()
            .filter(|registration| registration.event_id == event_id)
            .count() as u32
    }
}

fn date_key(event: &Event) -> NaiveDate {
    NaiveDate::parse_from_str(&event.date, "%Y-%m-%d").unwrap_or(NaiveDate::MAX)
}

fn event_start(event: &Event) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(&event.date, "%Y-%m-%d").ok()?;
    let time = if event.time.is_empty() {
        NaiveTime::MIN
    } else {
        NaiveTime::parse_from_str(&event.time, "%H:%M").ok()?
    };
    Some(date.and_time(time))
}

fn sample_event(
    title: &str,
    desc: &str,
    days_ahead: i64,
    time: &str,
    venue: &str,
    capacity: u32,
) -> Event {
    let date = (Local::now() + Duration::days(days_ahead))
        .format("%Y-%m-%d")
        .to_string();
    Event {
        id: ids::event_id(),
        title: title.to_string(),
        desc: desc.to_string(),
        date,
        time: time.to_string(),
        venue: venue.to_string(),
        capacity,
        image: String::new(),
        created: Some(Utc::now().to_rfc3339()),
    }
}
