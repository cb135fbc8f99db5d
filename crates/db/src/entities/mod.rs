//! `SeaORM` entities.

pub mod accounts;
pub mod feedback;
pub mod scan_events;
pub mod sea_orm_active_enums;
pub mod staff_members;
pub mod venues;
