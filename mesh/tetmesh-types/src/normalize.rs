//! Mesh validation and normalization.
//!
//! Readers produce a [`Mesh`] exactly as the file described it. This module
//! checks it against its own header counts, resolves vertex references,
//! partitions elements into triangles and tetrahedra and renumbers each of
//! those lists onto dense 1-based ids. Split sources are merged into one
//! element list instead; mesher output is already numbered per file.

use hashbrown::HashSet;
use tracing::{debug, info};

use crate::error::{CountKind, MeshError, MeshResult};
use crate::{Element, Mesh, MeshFormat};

/// Options for [`normalize_mesh_with_params`].
///
/// # Example
///
/// ```
/// use tetmesh_types::NormalizeParams;
///
/// // Keep ids as written, but still validate
/// let params = NormalizeParams {
///     renumber: false,
///     ..Default::default()
/// };
/// assert!(params.check_references);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizeParams {
    /// Renumber the triangles and tetrahedra of a unified source onto dense
    /// 1-based ids. Split sources keep the ids of their `.face` and `.ele`
    /// files either way.
    ///
    /// Default: `true`
    pub renumber: bool,

    /// Fail when an element references a vertex id missing from the mesh.
    ///
    /// Default: `true`
    pub check_references: bool,

    /// Fail when a declared physical names count disagrees with the names read.
    ///
    /// Default: `true`
    pub check_name_count: bool,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            renumber: true,
            check_references: true,
            check_name_count: true,
        }
    }
}

impl NormalizeParams {
    /// Check vertex and element counts only. References are trusted and a
    /// physical names count mismatch is ignored.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            renumber: true,
            check_references: false,
            check_name_count: false,
        }
    }
}

/// Check a mesh against its declared counts and, optionally, its references.
///
/// # Errors
///
/// - [`MeshError::CountMismatch`] if the declared vertex, element or names
///   count differs from what was parsed.
/// - [`MeshError::DanglingVertexRef`] if `params.check_references` is set and
///   an element names a vertex id the mesh does not contain.
pub fn validate_mesh(mesh: &Mesh, params: &NormalizeParams) -> MeshResult<()> {
    check_count(
        CountKind::Vertices,
        mesh.declared_vertex_count,
        mesh.vertices.len(),
    )?;

    let parsed_elements = match mesh.source {
        MeshFormat::Unified => mesh.elements.len(),
        MeshFormat::Split => mesh.triangles.len() + mesh.tetrahedra.len(),
    };
    check_count(
        CountKind::Elements,
        mesh.declared_element_count,
        parsed_elements,
    )?;

    if params.check_name_count {
        if let Some(declared) = mesh.declared_name_count {
            check_count(
                CountKind::PhysicalNames,
                declared,
                mesh.physical_names.len(),
            )?;
        }
    }

    if params.check_references {
        let known: HashSet<u64> = mesh.vertices.iter().map(|v| v.id).collect();
        let elements: Box<dyn Iterator<Item = &Element>> = match mesh.source {
            MeshFormat::Unified => Box::new(mesh.elements.iter()),
            MeshFormat::Split => Box::new(mesh.triangles.iter().chain(&mesh.tetrahedra)),
        };
        for element in elements {
            if let Some(&vertex) = element.vertex_refs.iter().find(|r| !known.contains(*r)) {
                return Err(MeshError::DanglingVertexRef {
                    element: element.id,
                    vertex,
                });
            }
        }
    }

    Ok(())
}

fn check_count(what: CountKind, expected: usize, actual: usize) -> MeshResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MeshError::CountMismatch {
            what,
            expected,
            actual,
        })
    }
}

/// Validate and normalize a mesh in place with default params.
///
/// # Errors
///
/// See [`normalize_mesh_with_params`].
pub fn normalize_mesh(mesh: &mut Mesh) -> MeshResult<()> {
    normalize_mesh_with_params(mesh, &NormalizeParams::default())
}

/// Validate and normalize a mesh in place.
///
/// After success:
/// - `triangles()` and `tetrahedra()` hold every element of that kind.
/// - For a unified source, each of those lists is renumbered with
///   [`renumber_elements`] (if `params.renumber`), and `elements()` is left
///   exactly as read.
/// - For a split source, the per-kind lists keep their file ids and
///   `elements()` is the triangles followed by the tetrahedra with ids
///   shifted by the triangle count.
///
/// On error the mesh is left unchanged.
///
/// # Errors
///
/// Any error from [`validate_mesh`], [`renumber_elements`] or
/// [`merge_elements`].
///
/// # Example
///
/// ```
/// use tetmesh_types::{normalize_mesh, Element, ElementKind, Mesh, MeshFormat, MeshParts, Vertex};
///
/// let mut mesh = Mesh::from_parts(
///     MeshFormat::Unified,
///     MeshParts {
///         vertices: (10..14)
///             .map(|id| Vertex::from_coords(id, 0.0, 0.0, 0.0))
///             .collect(),
///         elements: vec![Element::new(7, ElementKind::Tetrahedron, vec![10, 11, 12, 13])],
///         declared_vertex_count: 4,
///         declared_element_count: 1,
///         ..Default::default()
///     },
/// );
/// normalize_mesh(&mut mesh).unwrap();
/// assert_eq!(mesh.tetrahedra()[0].id, 1);
/// assert_eq!(mesh.elements()[0].id, 7);
/// ```
pub fn normalize_mesh_with_params(mesh: &mut Mesh, params: &NormalizeParams) -> MeshResult<()> {
    validate_mesh(mesh, params)?;

    let (triangles, tetrahedra) = match mesh.source {
        MeshFormat::Unified => {
            let mut triangles: Vec<Element> = mesh
                .elements
                .iter()
                .filter(|e| e.is_triangle())
                .cloned()
                .collect();
            let mut tetrahedra: Vec<Element> = mesh
                .elements
                .iter()
                .filter(|e| e.is_tetrahedron())
                .cloned()
                .collect();
            let skipped = mesh.elements.len() - triangles.len() - tetrahedra.len();
            if skipped > 0 {
                debug!("{} elements of other types left out of classification", skipped);
            }
            if params.renumber {
                renumber_elements(&mut triangles)?;
                renumber_elements(&mut tetrahedra)?;
            }
            (triangles, tetrahedra)
        }
        MeshFormat::Split => {
            mesh.elements = merge_elements(&mesh.triangles, &mesh.tetrahedra)?;
            (mesh.triangles.clone(), mesh.tetrahedra.clone())
        }
    };

    mesh.triangles = triangles;
    mesh.tetrahedra = tetrahedra;
    mesh.normalized = true;

    info!(
        "Normalized {} mesh: {} vertices, {} triangles, {} tetrahedra",
        mesh.source,
        mesh.vertices.len(),
        mesh.triangles.len(),
        mesh.tetrahedra.len()
    );

    Ok(())
}

/// Renumber a list of same-kind elements onto ids `1..=len`.
///
/// Each id becomes `(id mod len) + 1` and the list is then stably sorted by
/// the new id. The formula is applied to every list, dense or not: ids
/// `1..=len` come out as `1..=len` again, but the element that carried `len`
/// moves to the front.
///
/// # Errors
///
/// [`MeshError::IdCollision`] if two elements map to the same new id, which
/// happens when the original ids are not distinct modulo `len`.
///
/// # Example
///
/// ```
/// use tetmesh_types::{renumber_elements, Element, ElementKind};
///
/// let mut tets: Vec<Element> = [5, 6, 4]
///     .into_iter()
///     .map(|id| Element::new(id, ElementKind::Tetrahedron, vec![id, 2, 3, 4]))
///     .collect();
/// renumber_elements(&mut tets).unwrap();
/// let ids: Vec<u64> = tets.iter().map(|t| t.id).collect();
/// assert_eq!(ids, vec![1, 2, 3]);
/// // 6 -> 1, 4 -> 2, 5 -> 3
/// assert_eq!(tets[0].vertex_refs[0], 6);
/// ```
pub fn renumber_elements(elements: &mut [Element]) -> MeshResult<()> {
    if elements.is_empty() {
        return Ok(());
    }

    let count = elements.len() as u64;
    let mut seen = HashSet::with_capacity(elements.len());
    for element in elements.iter() {
        let id = element.id % count + 1;
        if !seen.insert(id) {
            return Err(MeshError::IdCollision {
                kind: element.kind,
                id,
            });
        }
    }

    for element in elements.iter_mut() {
        element.id = element.id % count + 1;
    }
    elements.sort_by_key(|e| e.id);

    debug!("Renumbered {} elements", elements.len());
    Ok(())
}

/// Concatenate triangles and tetrahedra into one element list with
/// disjoint ids.
///
/// Tetrahedron ids are shifted by `triangles.len()`; nothing else changes.
///
/// # Errors
///
/// [`MeshError::IdOverflow`] if a shifted tetrahedron id does not fit in a
/// `u64`.
///
/// # Example
///
/// ```
/// use tetmesh_types::{merge_elements, Element, ElementKind};
///
/// let tris = vec![
///     Element::new(1, ElementKind::Triangle, vec![1, 2, 3]),
///     Element::new(2, ElementKind::Triangle, vec![1, 2, 4]),
/// ];
/// let tets = vec![Element::new(1, ElementKind::Tetrahedron, vec![1, 2, 3, 4])];
///
/// let merged = merge_elements(&tris, &tets).unwrap();
/// let ids: Vec<u64> = merged.iter().map(|e| e.id).collect();
/// assert_eq!(ids, vec![1, 2, 3]);
/// ```
pub fn merge_elements(
    triangles: &[Element],
    tetrahedra: &[Element],
) -> MeshResult<Vec<Element>> {
    let offset = triangles.len() as u64;
    let mut merged = Vec::with_capacity(triangles.len() + tetrahedra.len());
    merged.extend_from_slice(triangles);
    for tet in tetrahedra {
        let id = tet
            .id
            .checked_add(offset)
            .ok_or(MeshError::IdOverflow { id: tet.id, offset })?;
        merged.push(Element { id, ..tet.clone() });
    }
    Ok(merged)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{ElementKind, ElementTags, MeshParts, PhysicalName, Vertex};

    fn corner_vertices(ids: &[u64]) -> Vec<Vertex> {
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        ids.iter()
            .zip(corners.iter().cycle())
            .map(|(&id, c)| Vertex::from_coords(id, c[0], c[1], c[2]))
            .collect()
    }

    fn tri(id: u64, refs: [u64; 3]) -> Element {
        Element::new(id, ElementKind::Triangle, refs.to_vec())
    }

    fn tet(id: u64, refs: [u64; 4]) -> Element {
        Element::new(id, ElementKind::Tetrahedron, refs.to_vec())
    }

    fn unified(elements: Vec<Element>) -> Mesh {
        let declared_element_count = elements.len();
        Mesh::from_parts(
            MeshFormat::Unified,
            MeshParts {
                vertices: corner_vertices(&[10, 11, 12, 13]),
                elements,
                declared_vertex_count: 4,
                declared_element_count,
                ..Default::default()
            },
        )
    }

    fn split(triangles: Vec<Element>, tetrahedra: Vec<Element>) -> Mesh {
        let declared_element_count = triangles.len() + tetrahedra.len();
        Mesh::from_parts(
            MeshFormat::Split,
            MeshParts {
                vertices: corner_vertices(&[1, 2, 3, 4]),
                triangles,
                tetrahedra,
                declared_vertex_count: 4,
                declared_element_count,
                ..Default::default()
            },
        )
    }

    #[test]
    fn single_tetrahedron_renumbers_to_one() {
        let mut mesh = unified(vec![
            tet(7, [10, 11, 12, 13]).with_tags(ElementTags::Numeric(vec![1])),
        ]);
        normalize_mesh(&mut mesh).unwrap();

        assert!(mesh.is_normalized());
        assert_eq!(mesh.tetrahedra().len(), 1);
        assert_eq!(mesh.tetrahedra()[0].id, 1);
        assert_eq!(mesh.tetrahedra()[0].vertex_refs, vec![10, 11, 12, 13]);
        // The full list keeps the ids as read
        assert_eq!(mesh.elements()[0].id, 7);
    }

    #[test]
    fn unified_classification_skips_other_types() {
        let mut mesh = unified(vec![
            Element::new(1, ElementKind::Other(15), vec![10]),
            tri(2, [10, 11, 12]),
            tri(3, [10, 11, 13]),
            tet(4, [10, 11, 12, 13]),
        ]);
        normalize_mesh(&mut mesh).unwrap();

        assert_eq!(mesh.elements().len(), 4);
        assert_eq!(mesh.triangles().len(), 2);
        assert_eq!(mesh.tetrahedra().len(), 1);
    }

    #[test]
    fn unified_renumbering_rotates_offset_ranges() {
        // Gmsh numbers all elements in one range: faces 1..=2, tets 3..=5
        let mut mesh = unified(vec![
            tri(1, [10, 11, 12]),
            tri(2, [10, 11, 13]),
            tet(3, [10, 11, 12, 13]),
            tet(4, [11, 10, 12, 13]),
            tet(5, [12, 11, 10, 13]),
        ]);
        normalize_mesh(&mut mesh).unwrap();

        let tri_ids: Vec<u64> = mesh.triangles().iter().map(|e| e.id).collect();
        let tet_ids: Vec<u64> = mesh.tetrahedra().iter().map(|e| e.id).collect();
        assert_eq!(tri_ids, vec![1, 2]);
        assert_eq!(tet_ids, vec![1, 2, 3]);

        // 1 % 2 + 1 = 2, 2 % 2 + 1 = 1
        assert_eq!(mesh.triangles()[0].vertex_refs, vec![10, 11, 13]);
        assert_eq!(mesh.triangles()[1].vertex_refs, vec![10, 11, 12]);
        // 3 % 3 + 1 = 1, 4 % 3 + 1 = 2, 5 % 3 + 1 = 3
        assert_eq!(mesh.tetrahedra()[0].vertex_refs, vec![10, 11, 12, 13]);
        assert_eq!(mesh.tetrahedra()[2].vertex_refs, vec![12, 11, 10, 13]);
    }

    #[test]
    fn dense_unified_ids_still_rotate() {
        let mut mesh = Mesh::from_parts(
            MeshFormat::Unified,
            MeshParts {
                vertices: (1..=5)
                    .map(|id| Vertex::from_coords(id, 0.0, 0.0, 0.0))
                    .collect(),
                elements: vec![tri(1, [1, 2, 3]), tri(2, [2, 3, 4]), tri(3, [3, 4, 5])],
                declared_vertex_count: 5,
                declared_element_count: 3,
                ..Default::default()
            },
        );
        normalize_mesh(&mut mesh).unwrap();

        let ids: Vec<u64> = mesh.triangles().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // 3 -> 1, 1 -> 2, 2 -> 3
        assert_eq!(mesh.triangles()[0].vertex_refs, vec![3, 4, 5]);
        assert_eq!(mesh.triangles()[1].vertex_refs, vec![1, 2, 3]);
        assert_eq!(mesh.triangles()[2].vertex_refs, vec![2, 3, 4]);
    }

    #[test]
    fn split_merge_offsets_tetrahedra() {
        let mut mesh = split(
            vec![tri(1, [1, 2, 3]), tri(2, [1, 2, 4])],
            vec![tet(1, [1, 2, 3, 4])],
        );
        normalize_mesh(&mut mesh).unwrap();

        let tri_ids: Vec<u64> = mesh
            .elements()
            .iter()
            .filter(|e| e.is_triangle())
            .map(|e| e.id)
            .collect();
        let tet_ids: Vec<u64> = mesh
            .elements()
            .iter()
            .filter(|e| e.is_tetrahedron())
            .map(|e| e.id)
            .collect();
        assert_eq!(tri_ids, vec![1, 2]);
        assert_eq!(tet_ids, vec![3]);
        // The per-kind views keep their own numbering
        assert_eq!(mesh.tetrahedra()[0].id, 1);
    }

    #[test]
    fn split_ids_are_kept_as_written() {
        // Zero-based mesher output stays zero-based
        let mut mesh = split(
            vec![tri(0, [1, 2, 3]), tri(1, [1, 2, 4])],
            vec![tet(0, [1, 2, 3, 4])],
        );
        normalize_mesh(&mut mesh).unwrap();

        assert_eq!(mesh.triangles()[0].vertex_refs, vec![1, 2, 3]);
        assert_eq!(mesh.triangles()[0].id, 0);
        assert_eq!(mesh.triangles()[1].id, 1);
        assert_eq!(mesh.tetrahedra()[0].id, 0);
        let ids: Vec<u64> = mesh.elements().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn split_merge_overflow_is_an_error() {
        let mut mesh = split(
            vec![tri(1, [1, 2, 3]), tri(2, [1, 2, 4])],
            vec![tet(u64::MAX - 1, [1, 2, 3, 4])],
        );
        let err = normalize_mesh(&mut mesh).unwrap_err();
        assert_eq!(
            err,
            MeshError::IdOverflow {
                id: u64::MAX - 1,
                offset: 2
            }
        );
        assert!(!mesh.is_normalized());
        assert!(mesh.elements().is_empty());
    }

    #[test]
    fn merge_at_the_id_limit_succeeds() {
        let tris = vec![tri(1, [1, 2, 3])];
        let tets = vec![tet(u64::MAX - 1, [1, 2, 3, 4])];
        let merged = merge_elements(&tris, &tets).unwrap();
        assert_eq!(merged[1].id, u64::MAX);
    }

    #[test]
    fn vertex_count_mismatch_is_an_error() {
        let mut mesh = Mesh::from_parts(
            MeshFormat::Unified,
            MeshParts {
                vertices: corner_vertices(&[1, 2, 3, 4]),
                declared_vertex_count: 5,
                ..Default::default()
            },
        );
        let err = normalize_mesh(&mut mesh).unwrap_err();
        assert_eq!(
            err,
            MeshError::CountMismatch {
                what: CountKind::Vertices,
                expected: 5,
                actual: 4,
            }
        );
        assert!(!mesh.is_normalized());
    }

    #[test]
    fn split_element_count_sums_both_files() {
        let mut mesh = split(vec![tri(1, [1, 2, 3])], vec![tet(1, [1, 2, 3, 4])]);
        mesh.declared_element_count = 3;
        let err = normalize_mesh(&mut mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::CountMismatch {
                what: CountKind::Elements,
                expected: 3,
                actual: 2,
            }
        ));
    }

    #[test]
    fn dangling_reference_is_reported() {
        let mut mesh = unified(vec![tet(1, [10, 11, 12, 99])]);
        let err = normalize_mesh(&mut mesh).unwrap_err();
        assert_eq!(
            err,
            MeshError::DanglingVertexRef {
                element: 1,
                vertex: 99
            }
        );

        // Lenient params trust references
        normalize_mesh_with_params(&mut mesh, &NormalizeParams::lenient()).unwrap();
    }

    #[test]
    fn name_count_is_checked_unless_disabled() {
        let mut mesh = Mesh::from_parts(
            MeshFormat::Unified,
            MeshParts {
                physical_names: vec![PhysicalName {
                    dimension: 3,
                    id: 1,
                    name: "\"Bulk\"".into(),
                }],
                declared_name_count: Some(2),
                ..Default::default()
            },
        );
        assert!(matches!(
            normalize_mesh(&mut mesh),
            Err(MeshError::CountMismatch {
                what: CountKind::PhysicalNames,
                ..
            })
        ));
        normalize_mesh_with_params(&mut mesh, &NormalizeParams::lenient()).unwrap();
    }

    #[test]
    fn renumbering_collision_is_detected() {
        // 0 % 2 + 1 == 2 % 2 + 1 == 1
        let mut tris = vec![tri(0, [1, 2, 3]), tri(2, [1, 2, 4])];
        let err = renumber_elements(&mut tris).unwrap_err();
        assert_eq!(
            err,
            MeshError::IdCollision {
                kind: ElementKind::Triangle,
                id: 1
            }
        );
        // Left untouched on failure
        assert_eq!(tris[0].id, 0);
        assert_eq!(tris[1].id, 2);
    }

    #[test]
    fn renumbering_is_idempotent() {
        let ids = |tris: &[Element]| tris.iter().map(|e| e.id).collect::<Vec<u64>>();
        let mut tris = vec![tri(4, [1, 2, 3]), tri(3, [1, 2, 4]), tri(5, [1, 3, 4])];
        renumber_elements(&mut tris).unwrap();
        assert_eq!(ids(&tris), vec![1, 2, 3]);
        renumber_elements(&mut tris).unwrap();
        assert_eq!(ids(&tris), vec![1, 2, 3]);
        // The second pass moves the element carrying id 3 to the front
        assert_eq!(tris[0].vertex_refs, vec![1, 3, 4]);
    }

    #[test]
    fn renumbering_empty_list_is_noop() {
        let mut empty: Vec<Element> = Vec::new();
        renumber_elements(&mut empty).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn normalize_twice_is_stable() {
        let mut mesh = split(
            vec![tri(1, [1, 2, 3]), tri(2, [1, 2, 4])],
            vec![tet(1, [1, 2, 3, 4])],
        );
        normalize_mesh(&mut mesh).unwrap();
        let ids = |elements: &[Element]| elements.iter().map(|e| e.id).collect::<Vec<u64>>();
        let first = ids(mesh.elements());
        normalize_mesh(&mut mesh).unwrap();
        assert_eq!(ids(mesh.elements()), first);
        assert_eq!(first, vec![1, 2, 3]);

        let mut mesh = unified(vec![tri(1, [10, 11, 12]), tri(2, [10, 11, 13])]);
        normalize_mesh(&mut mesh).unwrap();
        let first = ids(mesh.triangles());
        normalize_mesh(&mut mesh).unwrap();
        assert_eq!(ids(mesh.triangles()), first);
    }

    #[test]
    fn renumber_disabled_keeps_ids() {
        let mut mesh = unified(vec![tet(7, [10, 11, 12, 13])]);
        let params = NormalizeParams {
            renumber: false,
            ..Default::default()
        };
        normalize_mesh_with_params(&mut mesh, &params).unwrap();
        assert_eq!(mesh.tetrahedra()[0].id, 7);
    }
}
