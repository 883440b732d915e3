pub mod delaunay_triangulator;
pub mod triangulator;

pub use delaunay_triangulator::*;
pub use triangulator::*;
