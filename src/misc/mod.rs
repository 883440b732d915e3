pub mod floating_point;
pub mod orientation;
pub mod planar;
pub mod polygon_boundary;
pub mod segment;

pub use floating_point::*;
pub use orientation::*;
pub use planar::*;
pub use polygon_boundary::*;
pub use segment::*;
