//! Vertex records.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex: a format-local id, a position and optional numeric tags.
///
/// Ids are whatever the source file used. They are not required to be dense
/// or 1-based; elements reference vertices by this id, not by index.
///
/// # Example
///
/// ```
/// use tetmesh_types::Vertex;
///
/// let v = Vertex::from_coords(10, 1.0, 2.0, 3.0);
/// assert_eq!(v.id, 10);
/// assert_eq!(v.position.z, 3.0);
/// assert!(v.tags.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Id as written in the source file.
    pub id: u64,

    /// 3D position.
    pub position: Point3<f64>,

    /// Per-vertex attributes and markers.
    ///
    /// Always empty for the unified format. The split format stores any
    /// columns after the coordinates here, in file order.
    pub tags: Vec<f64>,
}

impl Vertex {
    /// Create a vertex without tags.
    #[inline]
    #[must_use]
    pub const fn new(id: u64, position: Point3<f64>) -> Self {
        Self {
            id,
            position,
            tags: Vec::new(),
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(id: u64, x: f64, y: f64, z: f64) -> Self {
        Self::new(id, Point3::new(x, y, z))
    }

    /// Attach tags to this vertex.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<f64>) -> Self {
        self.tags = tags;
        self
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn with_tags_keeps_order() {
        let v = Vertex::from_coords(3, 0.0, 0.0, 0.0).with_tags(vec![2.0, -1.0]);
        assert_eq!(v.tags, vec![2.0, -1.0]);
        assert_eq!(v.id, 3);
    }
}
