use crate::{misc::FloatingPoint, quad::QuadOptions};

/// Options of the meshing pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MesherOptions<T> {
    /// Validate the polygons before meshing and stop at the first conflict.
    check_topology: bool,
    /// Largest triangle area allowed inside the polygons. No refinement when `None`.
    max_area: Option<T>,
    /// Convert the triangles to quads with these options.
    quads: Option<QuadOptions>,
    /// Collapse quads whose diagonal ratio falls below this value.
    bad_quad_aspect: Option<T>,
}

impl<T> Default for MesherOptions<T> {
    fn default() -> Self {
        Self {
            check_topology: true,
            max_area: None,
            quads: None,
            bad_quad_aspect: None,
        }
    }
}

impl<T: FloatingPoint> MesherOptions<T> {
    pub fn check_topology(&self) -> bool {
        self.check_topology
    }

    pub fn max_area(&self) -> Option<T> {
        self.max_area
    }

    pub fn quads(&self) -> Option<&QuadOptions> {
        self.quads.as_ref()
    }

    pub fn bad_quad_aspect(&self) -> Option<T> {
        self.bad_quad_aspect
    }

    pub fn with_check_topology(mut self, check: bool) -> Self {
        self.check_topology = check;
        self
    }

    pub fn with_max_area(mut self, max_area: T) -> Self {
        self.max_area = Some(max_area);
        self
    }

    pub fn with_quads(mut self, options: QuadOptions) -> Self {
        self.quads = Some(options);
        self
    }

    pub fn with_bad_quad_aspect(mut self, aspect: T) -> Self {
        self.bad_quad_aspect = Some(aspect);
        self
    }
}
