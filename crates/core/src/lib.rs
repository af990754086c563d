//! Domain logic for the family activity finder.
//!
//! Everything in this crate is free of HTTP concerns: catalog data, the
//! filter engine and its helpers, the persisted photo cache and saved
//! itinerary store, and the itinerary request/response helpers shared by the
//! relay server and its clients.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod geo;
pub mod hashing;
pub mod hours;
pub mod itinerary;
pub mod photo_cache;
pub mod saved;
pub mod storage;
pub mod types;
