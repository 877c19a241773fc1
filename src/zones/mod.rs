//! Zone system for entity locations.
//!
//! ## Key Types
//!
//! - `Zone`: The kinds of zone each player owns (deck, hand, play, ...)
//! - `ZoneManager`: Location tracking and atomic movement
//! - `ZonePosition`: Position specifier for insertion

pub mod manager;

pub use manager::{Zone, ZoneManager, ZonePosition};
