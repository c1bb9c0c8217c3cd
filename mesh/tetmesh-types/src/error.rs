//! Error types for mesh validation and normalization.

use thiserror::Error;

use crate::ElementKind;

/// Result type for mesh model operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Which declared count a [`MeshError::CountMismatch`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountKind {
    /// The vertex table.
    Vertices,
    /// The combined element total.
    Elements,
    /// The physical names table.
    PhysicalNames,
}

impl std::fmt::Display for CountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertices => f.write_str("vertex"),
            Self::Elements => f.write_str("element"),
            Self::PhysicalNames => f.write_str("physical name"),
        }
    }
}

/// Errors raised while validating or normalizing a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A mesh format name was not recognized.
    #[error("unsupported mesh kind: {name}")]
    UnsupportedMeshKind {
        /// The name that was requested.
        name: String,
    },

    /// A declared count in the file header disagrees with the parsed records.
    #[error("{what} counts do not match: expected {expected}, found {actual}")]
    CountMismatch {
        /// Which count disagreed.
        what: CountKind,
        /// Count declared by the file.
        expected: usize,
        /// Number of records actually parsed.
        actual: usize,
    },

    /// An element references a vertex id that is not in the vertex table.
    #[error("element {element} references unknown vertex {vertex}")]
    DanglingVertexRef {
        /// Id of the offending element.
        element: u64,
        /// The unresolved vertex id.
        vertex: u64,
    },

    /// Two elements of one kind were renumbered onto the same id.
    #[error("renumbering {kind} elements produced duplicate id {id}")]
    IdCollision {
        /// Kind of the colliding elements.
        kind: ElementKind,
        /// The id both elements mapped to.
        id: u64,
    },

    /// Offsetting an element id for the combined list overflowed.
    #[error("element id {id} plus offset {offset} overflows")]
    IdOverflow {
        /// The id before the offset was applied.
        id: u64,
        /// The offset that was added.
        offset: u64,
    },
}
