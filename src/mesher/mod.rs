pub mod mesher_options;
pub mod multi_poly_mesher;
pub mod poly_input;

pub use mesher_options::*;
pub use multi_poly_mesher::*;
pub use poly_input::*;
