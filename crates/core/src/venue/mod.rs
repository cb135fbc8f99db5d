//! Venue management: creation under plan quotas, settings, staff and logos.

mod error;
mod service;
mod store;
mod types;


pub use error::VenueError;
pub use service::{Bootstrap, DEFAULT_VENUE_NAME, MAX_NAME_CHARS, StaffEntry, VenueService};
pub use store::VenueStore;
pub use types::{NewVenue, StaffMember, Venue, VenueSettings};
