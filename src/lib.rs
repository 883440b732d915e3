#![allow(clippy::needless_range_loop)]

mod error;
mod mesh;
mod mesher;
mod misc;
mod progress;
mod quad;
mod redistribute;
mod smooth;
mod topology;
mod triangulation;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::mesh::*;
    pub use crate::mesher::*;
    pub use crate::misc::*;
    pub use crate::progress::*;
    pub use crate::quad::*;
    pub use crate::redistribute::*;
    pub use crate::smooth::*;
    pub use crate::topology::*;
    pub use crate::triangulation::*;
}
