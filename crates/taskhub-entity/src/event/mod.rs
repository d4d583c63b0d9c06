//! Calendar event domain entities.

pub mod model;

pub use model::CalendarEvent;
