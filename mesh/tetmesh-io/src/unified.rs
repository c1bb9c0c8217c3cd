//! Unified (single-file, section-tagged) format support.
//!
//! # Layout
//!
//! ```text
//! $MeshFormat
//! 2.2 0 8
//! $EndMeshFormat
//! $PhysicalNames
//! <count>
//! <dimension> <id> <name>
//! $EndPhysicalNames
//! $Nodes
//! <count>
//! <id> <x> <y> <z>
//! $EndNodes
//! $Elements
//! <count>
//! <id> <type> <tag_count> <tag>... <node>...
//! $EndElements
//! ```
//!
//! Sections may come in any order. `$PhysicalNames` is optional; unknown
//! sections are skipped.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use tetmesh_types::{
    Mesh, MeshFormat, MeshParts, NormalizeParams, normalize_mesh_with_params,
};
use tracing::{debug, info, warn};

use crate::codec::{ElementConfig, RecordCodec, decode_physical_name, encode_physical_name};
use crate::error::{IoError, IoResult};
use crate::open_file;

/// The only header version this module reads and writes.
pub const SUPPORTED_VERSION: &str = "2.2";

/// Header line written by [`save_unified`]: version, ASCII file type, size of a double.
const HEADER_LINE: &str = "2.2 0 8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Names,
    Nodes,
    Elements,
    Unknown,
}

impl Section {
    /// Classify a `$`-prefixed marker line. `None` means an end marker.
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "$MeshFormat" => Some(Self::Header),
            "$PhysicalNames" => Some(Self::Names),
            "$Nodes" => Some(Self::Nodes),
            "$Elements" => Some(Self::Elements),
            m if m.starts_with("$End") => None,
            _ => Some(Self::Unknown),
        }
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Header => "$MeshFormat",
            Self::Names => "$PhysicalNames",
            Self::Nodes => "$Nodes",
            Self::Elements => "$Elements",
            Self::Unknown => "$<unknown>",
        }
    }
}

/// Options for [`save_unified_with_options`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnifiedWriteOptions {
    /// Factor applied to every coordinate on write.
    ///
    /// Default: `1.0`
    pub scaling_factor: f64,
}

impl Default for UnifiedWriteOptions {
    fn default() -> Self {
        Self {
            scaling_factor: 1.0,
        }
    }
}

/// Resolve the on-disk path, appending `.msh` when the path lacks it.
#[must_use]
pub fn unified_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("msh"))
    {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".msh");
        PathBuf::from(name)
    }
}

/// Load and normalize a unified mesh.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is structurally invalid, or
/// fails validation (see [`normalize_mesh_with_params`]).
///
/// # Example
///
/// ```no_run
/// use tetmesh_io::load_unified;
///
/// let mesh = load_unified("device.msh").unwrap();
/// println!("{mesh}");
/// ```
pub fn load_unified<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    load_unified_with_params(path, &NormalizeParams::default())
}

/// Load and normalize a unified mesh with custom normalization params.
///
/// # Errors
///
/// See [`load_unified`].
pub fn load_unified_with_params<P: AsRef<Path>>(
    path: P,
    params: &NormalizeParams,
) -> IoResult<Mesh> {
    let mut mesh = read_unified_raw(path)?;
    normalize_mesh_with_params(&mut mesh, params)?;
    Ok(mesh)
}

/// Read a unified mesh without validating or normalizing it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is structurally invalid.
pub fn read_unified_raw<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let path = unified_path(path);
    debug!("Reading unified mesh {}", path.display());
    let reader = open_file(&path)?;
    let mesh = parse_unified(reader)?;
    info!(
        "Read {}: {} vertices, {} elements",
        path.display(),
        mesh.vertex_count(),
        mesh.element_count()
    );
    Ok(mesh)
}

/// Parse unified-format text into an un-normalized mesh.
///
/// # Errors
///
/// - [`IoError::VersionMismatch`] for any header version but 2.2.
/// - [`IoError::MalformedRecord`] for records that fail to decode.
/// - [`IoError::MissingSection`] if `$Nodes` or `$Elements` is absent, or if
///   `$MeshFormat` is absent or carries no version line.
/// - [`IoError::UnterminatedSection`] if the input ends inside a section.
pub fn parse_unified<R: BufRead>(reader: R) -> IoResult<Mesh> {
    let format = MeshFormat::Unified;
    let element_config = ElementConfig::default();

    let mut parts = MeshParts::default();
    let mut active: Option<Section> = None;
    let mut expecting_count = false;
    // Version line, nodes, elements
    let mut seen = [false; 3];

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('$') {
            let marker = trimmed.split_whitespace().next().unwrap_or(trimmed);
            active = Section::from_marker(marker);
            expecting_count = true;
            match active {
                Some(Section::Nodes) => seen[1] = true,
                Some(Section::Elements) => seen[2] = true,
                Some(Section::Unknown) => debug!("Skipping section {}", marker),
                _ => {}
            }
            continue;
        }

        let Some(section) = active else {
            continue;
        };

        let counted = matches!(section, Section::Names | Section::Nodes | Section::Elements);
        if counted && expecting_count {
            expecting_count = false;
            let count = parse_count(trimmed, section).map_err(|e| e.at_line(line_no))?;
            match section {
                Section::Names => parts.declared_name_count = Some(count),
                Section::Nodes => parts.declared_vertex_count = count,
                _ => parts.declared_element_count = count,
            }
            continue;
        }

        match section {
            Section::Header => {
                let version = trimmed.split_whitespace().next().unwrap_or_default();
                if version != SUPPORTED_VERSION {
                    return Err(IoError::VersionMismatch {
                        found: version.to_string(),
                    });
                }
                seen[0] = true;
            }
            Section::Names => parts
                .physical_names
                .push(decode_physical_name(trimmed).map_err(|e| e.at_line(line_no))?),
            Section::Nodes => parts
                .vertices
                .push(format.decode_vertex(trimmed).map_err(|e| e.at_line(line_no))?),
            Section::Elements => parts.elements.push(
                format
                    .decode_element(trimmed, &element_config)
                    .map_err(|e| e.at_line(line_no))?,
            ),
            Section::Unknown => {}
        }
    }

    if let Some(section) = active {
        return Err(IoError::UnterminatedSection {
            name: section.marker(),
        });
    }
    for (present, section) in seen
        .iter()
        .zip([Section::Header, Section::Nodes, Section::Elements])
    {
        if !present {
            return Err(IoError::MissingSection {
                name: section.marker(),
            });
        }
    }

    Ok(Mesh::from_parts(MeshFormat::Unified, parts))
}

fn parse_count(line: &str, section: Section) -> IoResult<usize> {
    let mut fields = line.split_whitespace();
    let count = fields.next().and_then(|t| t.parse().ok());
    match (count, fields.next()) {
        (Some(count), None) => Ok(count),
        _ => Err(IoError::malformed(format!(
            "expected a record count after {}, found `{line}`",
            section.marker()
        ))),
    }
}

/// Save a mesh in the unified format.
///
/// The `.msh` extension is appended if missing.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use tetmesh_io::{load_split, save_unified};
///
/// let mesh = load_split("out/nVolume.1").unwrap();
/// save_unified(&mesh, "out/nVolume_meshed").unwrap(); // writes out/nVolume_meshed.msh
/// ```
pub fn save_unified<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    save_unified_with_options(mesh, path, &UnifiedWriteOptions::default())
}

/// Save a mesh in the unified format with custom options.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_unified_with_options<P: AsRef<Path>>(
    mesh: &Mesh,
    path: P,
    options: &UnifiedWriteOptions,
) -> IoResult<()> {
    let path = unified_path(path);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    write_unified(mesh, &mut writer, options)?;
    writer.flush()?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Write a mesh in the unified format.
///
/// Sections are emitted in fixed order: header, physical names, nodes,
/// elements. The element section is the mesh's combined element list.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_unified<W: Write>(
    mesh: &Mesh,
    mut writer: W,
    options: &UnifiedWriteOptions,
) -> IoResult<()> {
    if !mesh.is_normalized() {
        warn!("Writing a mesh that has not been normalized");
    }
    let format = MeshFormat::Unified;

    writeln!(writer, "$MeshFormat")?;
    writeln!(writer, "{HEADER_LINE}")?;
    writeln!(writer, "$EndMeshFormat")?;

    writeln!(writer, "$PhysicalNames")?;
    writeln!(writer, "{}", mesh.physical_names().len())?;
    for name in mesh.physical_names() {
        writeln!(writer, "{}", encode_physical_name(name))?;
    }
    writeln!(writer, "$EndPhysicalNames")?;

    writeln!(writer, "$Nodes")?;
    writeln!(writer, "{}", mesh.vertex_count())?;
    for vertex in mesh.vertices() {
        writeln!(
            writer,
            "{}",
            format.encode_vertex(vertex, options.scaling_factor)
        )?;
    }
    writeln!(writer, "$EndNodes")?;

    writeln!(writer, "$Elements")?;
    writeln!(writer, "{}", mesh.element_count())?;
    for element in mesh.elements() {
        writeln!(writer, "{}", format.encode_element(element))?;
    }
    writeln!(writer, "$EndElements")?;

    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::unnecessary_raw_string_hashes
)]
mod tests {
    use super::*;
    use tetmesh_types::{CountKind, ElementKind, MeshError, normalize_mesh};

    const SINGLE_TET: &str = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$PhysicalNames
1
3 1 "Bulk"
$EndPhysicalNames
$Nodes
4
10 0 0 0
11 1 0 0
12 0 1 0
13 0 0 1
$EndNodes
$Elements
1
7 4 1 1 10 11 12 13
$EndElements
"#;

    fn parse(text: &str) -> IoResult<Mesh> {
        parse_unified(text.as_bytes())
    }

    #[test]
    fn parses_all_sections() {
        let mesh = parse(SINGLE_TET).unwrap();
        assert_eq!(mesh.source(), MeshFormat::Unified);
        assert_eq!(mesh.declared_vertex_count(), 4);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.declared_element_count(), 1);
        assert_eq!(mesh.physical_names()[0].name, "\"Bulk\"");
        assert_eq!(mesh.declared_name_count(), Some(1));
        assert_eq!(mesh.elements()[0].kind, ElementKind::Tetrahedron);
        assert_eq!(mesh.vertices()[1].position.x, 1.0);
    }

    #[test]
    fn sections_may_come_in_any_order() {
        let text = "$Elements\n1\n1 2 0 1 2 3\n$EndElements\n\
                    $Nodes\n3\n1 0 0 0\n2 1 0 0\n3 0 1 0\n$EndNodes\n\
                    $MeshFormat\n2.2 0 8\n$EndMeshFormat\n";
        let mut mesh = parse(text).unwrap();
        normalize_mesh(&mut mesh).unwrap();
        assert_eq!(mesh.triangles().len(), 1);
        assert!(mesh.physical_names().is_empty());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let text = SINGLE_TET.replace("2.2 0 8", "4.1 0 8");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, IoError::VersionMismatch { found } if found == "4.1"));
    }

    #[test]
    fn node_count_mismatch_fails_validation() {
        let text = SINGLE_TET.replacen("$Nodes\n4", "$Nodes\n5", 1);
        let mut mesh = parse(&text).unwrap();
        let err = normalize_mesh(&mut mesh).unwrap_err();
        assert_eq!(
            err,
            MeshError::CountMismatch {
                what: CountKind::Vertices,
                expected: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn lines_outside_sections_and_unknown_sections_are_ignored() {
        let text = format!(
            "stray text\n{SINGLE_TET}$Comments\nanything 1 2 3\n$EndComments\ntrailing\n"
        );
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn malformed_record_reports_line() {
        let text = SINGLE_TET.replace("12 0 1 0", "12 0 one 0");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, IoError::MalformedRecord { line: 12, .. }));
    }

    #[test]
    fn missing_count_line_is_malformed() {
        let text = SINGLE_TET.replace("$Elements\n1\n", "$Elements\n");
        assert!(matches!(
            parse(&text),
            Err(IoError::MalformedRecord { line: 16, .. })
        ));
    }

    #[test]
    fn unterminated_section_is_an_error() {
        let text = SINGLE_TET.replace("$EndElements\n", "");
        assert!(matches!(
            parse(&text),
            Err(IoError::UnterminatedSection {
                name: "$Elements"
            })
        ));
    }

    #[test]
    fn header_without_version_line_is_missing() {
        let text = "$MeshFormat\n$EndMeshFormat\n$Nodes\n0\n$EndNodes\n$Elements\n0\n$EndElements\n";
        assert!(matches!(
            parse(text),
            Err(IoError::MissingSection {
                name: "$MeshFormat"
            })
        ));
    }

    #[test]
    fn missing_nodes_section_is_an_error() {
        let text = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Elements\n0\n$EndElements\n";
        assert!(matches!(
            parse(text),
            Err(IoError::MissingSection { name: "$Nodes" })
        ));
    }

    #[test]
    fn write_emits_fixed_layout() {
        let mut mesh = parse(SINGLE_TET).unwrap();
        normalize_mesh(&mut mesh).unwrap();

        let mut out = Vec::new();
        write_unified(&mesh, &mut out, &UnifiedWriteOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n\
                        $PhysicalNames\n1\n3 1 \"Bulk\"\n$EndPhysicalNames\n\
                        $Nodes\n4\n\
                        10 0.0000000000000000e+00 0.0000000000000000e+00 0.0000000000000000e+00\n\
                        11 1.0000000000000000e+00 0.0000000000000000e+00 0.0000000000000000e+00\n\
                        12 0.0000000000000000e+00 1.0000000000000000e+00 0.0000000000000000e+00\n\
                        13 0.0000000000000000e+00 0.0000000000000000e+00 1.0000000000000000e+00\n\
                        $EndNodes\n\
                        $Elements\n1\n7 4 1 1 10 11 12 13\n$EndElements\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn scaling_factor_applies_to_coordinates() {
        let mut mesh = parse(SINGLE_TET).unwrap();
        normalize_mesh(&mut mesh).unwrap();

        let mut out = Vec::new();
        let options = UnifiedWriteOptions {
            scaling_factor: 1.0e-5,
        };
        write_unified(&mesh, &mut out, &options).unwrap();
        let reread = parse_unified(out.as_slice()).unwrap();
        assert_eq!(reread.vertices()[1].position.x, 1.0e-5);
    }

    #[test]
    fn path_gets_msh_extension() {
        assert_eq!(unified_path("out/mesh"), PathBuf::from("out/mesh.msh"));
        assert_eq!(unified_path("out/mesh.msh"), PathBuf::from("out/mesh.msh"));
        assert_eq!(unified_path("out/mesh.1"), PathBuf::from("out/mesh.1.msh"));
    }
}
