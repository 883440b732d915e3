use std::fmt;

use nalgebra::Point3;

use crate::{
    misc::FloatingPoint,
    redistribute::{PolyRedistributer, SizeFunction, SizePolicy},
    topology::PolygonInput,
};

/// A polygon to mesh, with the way its boundary is sized and its elevation.
pub struct PolyInput<T: FloatingPoint> {
    polygon: PolygonInput<T>,
    redistributer: Option<PolyRedistributer<T>>,
    elevation: Option<Box<dyn SizeFunction<T> + Send + Sync>>,
    /// extra points triangulated inside the polygon, without constraints
    refine_points: Vec<Point3<T>>,
}

impl<T: FloatingPoint> PolyInput<T> {
    /// Mesh the polygon with its boundary points as given.
    pub fn new(polygon: PolygonInput<T>) -> Self {
        Self {
            polygon,
            redistributer: None,
            elevation: None,
            refine_points: vec![],
        }
    }

    /// Redistribute every ring of the polygon before triangulating.
    pub fn with_size_policy(mut self, policy: SizePolicy<T>) -> Self {
        self.redistributer = Some(PolyRedistributer::new(policy));
        self
    }

    /// Drape the mesh points over an elevation function.
    pub fn with_elevation<F>(mut self, elevation: F) -> Self
    where
        F: SizeFunction<T> + Send + Sync + 'static,
    {
        self.elevation = Some(Box::new(elevation));
        self
    }

    /// Add points the triangulation must pass through.
    /// Points outside the polygon or inside its holes are dropped with the faces around them.
    pub fn with_refine_points(mut self, points: Vec<Point3<T>>) -> Self {
        self.refine_points = points;
        self
    }

    pub fn polygon(&self) -> &PolygonInput<T> {
        &self.polygon
    }

    pub fn redistributer(&self) -> Option<&PolyRedistributer<T>> {
        self.redistributer.as_ref()
    }

    pub fn refine_points(&self) -> &[Point3<T>] {
        &self.refine_points
    }

    pub fn elevation(&self) -> Option<&(dyn SizeFunction<T> + Send + Sync)> {
        self.elevation.as_deref()
    }
}

impl<T: FloatingPoint> From<PolygonInput<T>> for PolyInput<T> {
    fn from(polygon: PolygonInput<T>) -> Self {
        Self::new(polygon)
    }
}

impl<T: FloatingPoint> fmt::Debug for PolyInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolyInput")
            .field("polygon", &self.polygon)
            .field("redistributer", &self.redistributer)
            .field("elevation", &self.elevation.is_some())
            .field("refine_points", &self.refine_points)
            .finish()
    }
}
