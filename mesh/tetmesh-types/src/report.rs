//! Mesh statistics and tetrahedron quality reporting.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;

use crate::Mesh;

/// Summary of a mesh's contents and tetrahedron volumes.
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Number of records in the combined element list.
    pub element_count: usize,
    /// Number of triangles.
    pub triangle_count: usize,
    /// Number of tetrahedra.
    pub tetrahedron_count: usize,
    /// Number of physical group labels.
    pub physical_name_count: usize,

    /// Vertices not referenced by any triangle or tetrahedron.
    pub unreferenced_vertex_count: usize,
    /// Tetrahedra with negative signed volume.
    pub inverted_tetrahedron_count: usize,
    /// Tetrahedra whose absolute volume is below the threshold.
    pub degenerate_tetrahedron_count: usize,
    /// Elements whose vertex references could not all be resolved.
    pub unresolved_element_count: usize,

    /// Sum of absolute tetrahedron volumes.
    pub total_volume: f64,
    /// Smallest signed tetrahedron volume, if any tetrahedra were measured.
    pub min_volume: Option<f64>,
    /// Largest signed tetrahedron volume, if any tetrahedra were measured.
    pub max_volume: Option<f64>,
}

impl MeshReport {
    /// Check if any issue was found.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Total count of issues found.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.unreferenced_vertex_count
            + self.inverted_tetrahedron_count
            + self.degenerate_tetrahedron_count
            + self.unresolved_element_count
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Elements: {}", self.element_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Tetrahedra: {}", self.tetrahedron_count)?;
        writeln!(f, "  Physical names: {}", self.physical_name_count)?;

        if let (Some(min), Some(max)) = (self.min_volume, self.max_volume) {
            writeln!(f)?;
            writeln!(f, "  Volume:")?;
            writeln!(f, "    Total: {:.6e}", self.total_volume)?;
            writeln!(f, "    Min: {min:.6e}")?;
            writeln!(f, "    Max: {max:.6e}")?;
        }

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            if self.unreferenced_vertex_count > 0 {
                writeln!(f, "    Unreferenced vertices: {}", self.unreferenced_vertex_count)?;
            }
            if self.inverted_tetrahedron_count > 0 {
                writeln!(
                    f,
                    "    Inverted tetrahedra: {}",
                    self.inverted_tetrahedron_count
                )?;
            }
            if self.degenerate_tetrahedron_count > 0 {
                writeln!(
                    f,
                    "    Degenerate tetrahedra: {}",
                    self.degenerate_tetrahedron_count
                )?;
            }
            if self.unresolved_element_count > 0 {
                writeln!(f, "    Unresolved elements: {}", self.unresolved_element_count)?;
            }
        }

        Ok(())
    }
}

/// Options for [`report_mesh_with_options`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Absolute volume below which a tetrahedron counts as degenerate.
    ///
    /// Default: `1e-15`
    pub degenerate_volume_threshold: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            degenerate_volume_threshold: 1e-15,
        }
    }
}

/// Build a report for a mesh with default options.
///
/// # Example
///
/// ```
/// use tetmesh_types::{normalize_mesh, report_mesh, Element, ElementKind, Mesh, MeshFormat, MeshParts, Vertex};
///
/// let mut mesh = Mesh::from_parts(
///     MeshFormat::Split,
///     MeshParts {
///         vertices: vec![
///             Vertex::from_coords(1, 0.0, 0.0, 0.0),
///             Vertex::from_coords(2, 1.0, 0.0, 0.0),
///             Vertex::from_coords(3, 0.0, 1.0, 0.0),
///             Vertex::from_coords(4, 0.0, 0.0, 1.0),
///         ],
///         tetrahedra: vec![Element::new(1, ElementKind::Tetrahedron, vec![1, 2, 3, 4])],
///         declared_vertex_count: 4,
///         declared_element_count: 1,
///         ..Default::default()
///     },
/// );
/// normalize_mesh(&mut mesh).unwrap();
///
/// let report = report_mesh(&mesh);
/// assert_eq!(report.tetrahedron_count, 1);
/// assert!((report.total_volume - 1.0 / 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn report_mesh(mesh: &Mesh) -> MeshReport {
    report_mesh_with_options(mesh, &ReportOptions::default())
}

/// Build a report for a mesh.
#[must_use]
pub fn report_mesh_with_options(mesh: &Mesh, options: &ReportOptions) -> MeshReport {
    let positions: HashMap<u64, Point3<f64>> =
        mesh.vertices.iter().map(|v| (v.id, v.position)).collect();

    let mut report = MeshReport {
        vertex_count: mesh.vertices.len(),
        element_count: mesh.elements.len(),
        triangle_count: mesh.triangles.len(),
        tetrahedron_count: mesh.tetrahedra.len(),
        physical_name_count: mesh.physical_names.len(),
        ..Default::default()
    };

    let mut referenced: HashSet<u64> = HashSet::new();
    for element in mesh.triangles.iter().chain(&mesh.tetrahedra) {
        referenced.extend(element.vertex_refs.iter().copied());
    }
    report.unreferenced_vertex_count = mesh
        .vertices
        .iter()
        .filter(|v| !referenced.contains(&v.id))
        .count();

    for element in mesh.triangles.iter().chain(&mesh.tetrahedra) {
        let corners: Option<Vec<Point3<f64>>> = element
            .vertex_refs
            .iter()
            .map(|id| positions.get(id).copied())
            .collect();
        let Some(corners) = corners else {
            report.unresolved_element_count += 1;
            continue;
        };
        if !element.is_tetrahedron() {
            continue;
        }
        if let [a, b, c, d] = corners.as_slice() {
            let volume = signed_volume(a, b, c, d);
            report.total_volume += volume.abs();
            report.min_volume = Some(report.min_volume.map_or(volume, |m| m.min(volume)));
            report.max_volume = Some(report.max_volume.map_or(volume, |m| m.max(volume)));
            if volume < 0.0 {
                report.inverted_tetrahedron_count += 1;
            }
            if volume.abs() < options.degenerate_volume_threshold {
                report.degenerate_tetrahedron_count += 1;
            }
        }
    }

    report
}

/// Signed volume of the tetrahedron `abcd`, positive when `d` lies on the
/// side of `abc` its right-hand normal points to.
#[must_use]
pub fn signed_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let ad = d - a;
    ab.cross(&ac).dot(&ad) / 6.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{normalize_mesh, Element, ElementKind, MeshFormat, MeshParts, Vertex};
    use approx::assert_relative_eq;

    fn mesh_with_tets(tets: Vec<Element>, extra_vertex: bool) -> Mesh {
        let mut vertices = vec![
            Vertex::from_coords(1, 0.0, 0.0, 0.0),
            Vertex::from_coords(2, 1.0, 0.0, 0.0),
            Vertex::from_coords(3, 0.0, 1.0, 0.0),
            Vertex::from_coords(4, 0.0, 0.0, 1.0),
        ];
        if extra_vertex {
            vertices.push(Vertex::from_coords(5, 5.0, 5.0, 5.0));
        }
        let declared_vertex_count = vertices.len();
        let declared_element_count = tets.len();
        let mut mesh = Mesh::from_parts(
            MeshFormat::Split,
            MeshParts {
                vertices,
                tetrahedra: tets,
                declared_vertex_count,
                declared_element_count,
                ..Default::default()
            },
        );
        normalize_mesh(&mut mesh).unwrap();
        mesh
    }

    #[test]
    fn unit_tetrahedron_volume() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let d = Point3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(signed_volume(&a, &b, &c, &d), 1.0 / 6.0);
        assert_relative_eq!(signed_volume(&b, &a, &c, &d), -1.0 / 6.0);
    }

    #[test]
    fn inverted_and_unreferenced_are_counted() {
        let mesh = mesh_with_tets(
            vec![
                Element::new(1, ElementKind::Tetrahedron, vec![1, 2, 3, 4]),
                Element::new(2, ElementKind::Tetrahedron, vec![2, 1, 3, 4]),
            ],
            true,
        );
        let report = report_mesh(&mesh);

        assert_eq!(report.tetrahedron_count, 2);
        assert_eq!(report.inverted_tetrahedron_count, 1);
        assert_eq!(report.unreferenced_vertex_count, 1);
        assert_relative_eq!(report.total_volume, 1.0 / 3.0);
        assert_relative_eq!(report.min_volume.unwrap(), -1.0 / 6.0);
        assert_relative_eq!(report.max_volume.unwrap(), 1.0 / 6.0);
        assert!(report.has_issues());
    }

    #[test]
    fn flat_tetrahedron_is_degenerate() {
        let mesh = mesh_with_tets(
            vec![Element::new(1, ElementKind::Tetrahedron, vec![1, 2, 3, 1])],
            false,
        );
        let report = report_mesh(&mesh);
        assert_eq!(report.degenerate_tetrahedron_count, 1);
        // Vertex 4 is unused
        assert_eq!(report.unreferenced_vertex_count, 1);
    }

    #[test]
    fn report_display_lists_issues() {
        let mesh = mesh_with_tets(
            vec![Element::new(1, ElementKind::Tetrahedron, vec![2, 1, 3, 4])],
            false,
        );
        let text = report_mesh(&mesh).to_string();
        assert!(text.contains("Tetrahedra: 1"));
        assert!(text.contains("Inverted tetrahedra: 1"));
    }
}
