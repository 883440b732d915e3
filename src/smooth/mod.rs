pub mod depth;
pub mod field_smoother;

pub use depth::*;
pub use field_smoother::*;
