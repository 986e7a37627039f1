pub mod config;
pub mod controller;
pub mod detail;
pub mod markers;
pub mod selection;
pub mod surface;

#[cfg(test)]
mod recording;

pub use config::*;
pub use controller::*;
pub use detail::*;
pub use markers::*;
pub use selection::*;
pub use surface::*;
