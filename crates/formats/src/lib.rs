pub mod itinerary;
pub mod route;

pub use itinerary::*;
pub use route::*;
