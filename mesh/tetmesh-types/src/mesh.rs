//! The canonical mesh aggregate.

use crate::{Element, MeshFormat, Vertex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named physical group, carried by the unified format only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicalName {
    /// Geometric dimension of the group (2 for surfaces, 3 for volumes).
    pub dimension: i32,
    /// Group id, matched against the first element tag.
    pub id: i64,
    /// Group name as written, including any surrounding quotes.
    pub name: String,
}

/// Raw output of a reader, before validation.
///
/// A unified reader fills `elements`; a split reader fills `triangles` and
/// `tetrahedra` directly. Normalization derives whichever side is missing.
#[derive(Debug, Clone, Default)]
pub struct MeshParts {
    /// Vertex table in file order.
    pub vertices: Vec<Vertex>,
    /// Full element list (unified source).
    pub elements: Vec<Element>,
    /// Triangle faces (split source).
    pub triangles: Vec<Element>,
    /// Tetrahedra (split source).
    pub tetrahedra: Vec<Element>,
    /// Physical group labels.
    pub physical_names: Vec<PhysicalName>,
    /// Vertex count from the file header.
    pub declared_vertex_count: usize,
    /// Element count from the file header(s).
    pub declared_element_count: usize,
    /// Names count from the file header, when present.
    pub declared_name_count: Option<usize>,
}

/// A mixed triangle/tetrahedron mesh read from one of the interchange formats.
///
/// A mesh is built in one shot by a reader through [`Mesh::from_parts`],
/// normalized in place by [`normalize_mesh`](crate::normalize_mesh) and then
/// handed to a writer. There is no per-record insertion API.
///
/// # Example
///
/// ```
/// use tetmesh_types::{Element, ElementKind, Mesh, MeshFormat, MeshParts, Vertex};
///
/// let mesh = Mesh::from_parts(
///     MeshFormat::Unified,
///     MeshParts {
///         vertices: vec![
///             Vertex::from_coords(1, 0.0, 0.0, 0.0),
///             Vertex::from_coords(2, 1.0, 0.0, 0.0),
///             Vertex::from_coords(3, 0.0, 1.0, 0.0),
///         ],
///         elements: vec![Element::new(1, ElementKind::Triangle, vec![1, 2, 3])],
///         declared_vertex_count: 3,
///         declared_element_count: 1,
///         ..Default::default()
///     },
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// assert!(mesh.triangles().is_empty()); // not classified until normalized
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    pub(crate) source: MeshFormat,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) elements: Vec<Element>,
    pub(crate) triangles: Vec<Element>,
    pub(crate) tetrahedra: Vec<Element>,
    pub(crate) physical_names: Vec<PhysicalName>,
    pub(crate) declared_vertex_count: usize,
    pub(crate) declared_element_count: usize,
    pub(crate) declared_name_count: Option<usize>,
    pub(crate) normalized: bool,
}

impl Mesh {
    /// Assemble a mesh from a reader's output.
    #[must_use]
    pub fn from_parts(source: MeshFormat, parts: MeshParts) -> Self {
        Self {
            source,
            vertices: parts.vertices,
            elements: parts.elements,
            triangles: parts.triangles,
            tetrahedra: parts.tetrahedra,
            physical_names: parts.physical_names,
            declared_vertex_count: parts.declared_vertex_count,
            declared_element_count: parts.declared_element_count,
            declared_name_count: parts.declared_name_count,
            normalized: false,
        }
    }

    /// Format the mesh was read from.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> MeshFormat {
        self.source
    }

    /// Vertex table in file order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Combined element list.
    ///
    /// For a unified source this is every element record as read, including
    /// types other than triangles and tetrahedra, with original ids. For a
    /// split source it is filled by normalization: triangles followed by
    /// tetrahedra with offset ids.
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Triangle view.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[Element] {
        &self.triangles
    }

    /// Tetrahedron view.
    #[inline]
    #[must_use]
    pub fn tetrahedra(&self) -> &[Element] {
        &self.tetrahedra
    }

    /// Physical group labels.
    #[inline]
    #[must_use]
    pub fn physical_names(&self) -> &[PhysicalName] {
        &self.physical_names
    }

    /// Vertex count declared by the file.
    #[inline]
    #[must_use]
    pub const fn declared_vertex_count(&self) -> usize {
        self.declared_vertex_count
    }

    /// Element count declared by the file(s).
    #[inline]
    #[must_use]
    pub const fn declared_element_count(&self) -> usize {
        self.declared_element_count
    }

    /// Physical names count declared by the file, if it had a names section.
    #[inline]
    #[must_use]
    pub const fn declared_name_count(&self) -> Option<usize> {
        self.declared_name_count
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of elements in the combined list.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether [`normalize_mesh`](crate::normalize_mesh) has succeeded on this mesh.
    #[inline]
    #[must_use]
    pub const fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Look up a vertex by its file id.
    #[must_use]
    pub fn vertex_by_id(&self, id: u64) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, Nodes:{}, Elements: {}, Faces:{}, Tetrahedra:{}",
            self.source.label(),
            self.declared_vertex_count,
            self.declared_element_count,
            self.triangles.len(),
            self.tetrahedra.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementKind;

    fn split_parts() -> MeshParts {
        MeshParts {
            vertices: vec![
                Vertex::from_coords(1, 0.0, 0.0, 0.0),
                Vertex::from_coords(2, 1.0, 0.0, 0.0),
                Vertex::from_coords(3, 0.0, 1.0, 0.0),
                Vertex::from_coords(4, 0.0, 0.0, 1.0),
            ],
            triangles: vec![Element::new(1, ElementKind::Triangle, vec![1, 2, 3])],
            tetrahedra: vec![Element::new(1, ElementKind::Tetrahedron, vec![1, 2, 3, 4])],
            declared_vertex_count: 4,
            declared_element_count: 2,
            ..Default::default()
        }
    }

    #[test]
    fn from_parts_is_not_normalized() {
        let mesh = Mesh::from_parts(MeshFormat::Split, split_parts());
        assert!(!mesh.is_normalized());
        assert_eq!(mesh.source(), MeshFormat::Split);
        assert!(mesh.elements().is_empty());
    }

    #[test]
    fn vertex_lookup_by_id() {
        let mesh = Mesh::from_parts(MeshFormat::Split, split_parts());
        assert!(mesh.vertex_by_id(4).is_some());
        assert!(mesh.vertex_by_id(0).is_none());
    }

    #[test]
    fn summary_line() {
        let mesh = Mesh::from_parts(MeshFormat::Split, split_parts());
        assert_eq!(
            mesh.to_string(),
            "Split, Nodes:4, Elements: 2, Faces:1, Tetrahedra:1"
        );
    }
}
