//! Canonical mesh model for tetmesh.
//!
//! This crate provides the format-neutral representation shared by every
//! reader and writer in `tetmesh-io`:
//!
//! - [`Vertex`] - A file id, a position and optional numeric tags
//! - [`Element`] - A triangle, tetrahedron or pass-through element referencing vertices by id
//! - [`PhysicalName`] - A named dimension/id group
//! - [`Mesh`] - The aggregate owning all of the above
//! - [`MeshFormat`] - Which interchange format a mesh came from
//!
//! plus the post-read pipeline:
//!
//! - [`normalize_mesh`] - Count checks, reference checks, classification and renumbering
//! - [`report_mesh`] - Counts and tetrahedron volume statistics
//!
//! # Ids, not indices
//!
//! Elements reference vertices by the id written in the file. Ids are not
//! required to be dense, 1-based or ordered.
//!
//! # Example
//!
//! ```
//! use tetmesh_types::{normalize_mesh, Element, ElementKind, Mesh, MeshFormat, MeshParts, Vertex};
//!
//! let mut mesh = Mesh::from_parts(
//!     MeshFormat::Split,
//!     MeshParts {
//!         vertices: vec![
//!             Vertex::from_coords(1, 0.0, 0.0, 0.0),
//!             Vertex::from_coords(2, 1.0, 0.0, 0.0),
//!             Vertex::from_coords(3, 0.0, 1.0, 0.0),
//!             Vertex::from_coords(4, 0.0, 0.0, 1.0),
//!         ],
//!         triangles: vec![
//!             Element::new(1, ElementKind::Triangle, vec![1, 2, 3]),
//!             Element::new(2, ElementKind::Triangle, vec![1, 2, 4]),
//!         ],
//!         tetrahedra: vec![Element::new(1, ElementKind::Tetrahedron, vec![1, 2, 3, 4])],
//!         declared_vertex_count: 4,
//!         declared_element_count: 3,
//!         ..Default::default()
//!     },
//! );
//!
//! normalize_mesh(&mut mesh).unwrap();
//! assert_eq!(mesh.elements()[2].id, 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod element;
mod error;
mod format;
mod mesh;
mod normalize;
mod report;
mod vertex;

pub use element::{Element, ElementKind, ElementTags};
pub use error::{CountKind, MeshError, MeshResult};
pub use format::MeshFormat;
pub use mesh::{Mesh, MeshParts, PhysicalName};
pub use normalize::{
    NormalizeParams, merge_elements, normalize_mesh, normalize_mesh_with_params,
    renumber_elements, validate_mesh,
};
pub use report::{MeshReport, ReportOptions, report_mesh, report_mesh_with_options, signed_volume};
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;
