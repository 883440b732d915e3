pub mod diagnostic;
pub mod polygon_input;
pub mod topology_validator;

pub use diagnostic::*;
pub use polygon_input::*;
pub use topology_validator::*;
