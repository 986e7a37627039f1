pub mod site;
pub mod template;

pub use site::*;
pub use template::*;
