//! Clients for the third-party services behind the family activity finder.
//!
//! - [`places`]: place text search and photo media.
//! - [`gemini`]: text generation for itineraries.
//! - [`relay`]: the caller side of the itinerary relay endpoint.
//! - [`photos`]: cache-through photo lookup and startup prefetch.

pub mod gemini;
pub mod photos;
pub mod places;
pub mod relay;
