pub mod curvature;
pub mod poly_redistributer;
pub mod size_function;

pub use curvature::*;
pub use poly_redistributer::*;
pub use size_function::*;
