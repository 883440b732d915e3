pub mod bad_quad_remover;
mod dual_graph;
pub mod eta;
pub mod quad_blossom;
pub mod split_to_quads;
pub mod weight_matcher;

pub use bad_quad_remover::*;
pub use eta::*;
pub use quad_blossom::*;
pub use split_to_quads::*;
pub use weight_matcher::*;

#[cfg(test)]
mod tests;
