pub mod itinerary;
pub mod locations;
pub mod photos;
pub mod saved_itineraries;
