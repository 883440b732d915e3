use nalgebra::RealField;
use num_traits::ToPrimitive;
use spade::SpadeNum;

/// Trait for floating point types (f32, f64)
/// Mainly used to identify the scalar of points and fields handled by the mesher,
/// and to let the same scalar drive spade's triangulation.
pub trait FloatingPoint: RealField + ToPrimitive + SpadeNum + Copy {}

impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
