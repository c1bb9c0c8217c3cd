//! Split (three-file) format support.
//!
//! A split mesh is a triple of sibling files sharing one stem:
//!
//! ```text
//! <stem>.node   <count> <dim> <attributes> <markers>
//!               <id> <x> <y> <z> [attribute...] [marker]
//! <stem>.face   <count> <markers>
//!               <id> <n1> <n2> <n3> [marker]
//! <stem>.ele    <count> <nodes per tet> <attributes>
//!               <id> <n1> <n2> <n3> <n4> [attribute...]
//! ```
//!
//! Lines starting with `#` are comments and may appear anywhere, including
//! before the header. Anything after a `#` on a data line is ignored.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use tetmesh_types::{Mesh, MeshFormat, MeshParts, NormalizeParams, normalize_mesh_with_params};
use tracing::{debug, info, warn};

use crate::codec::{ElementConfig, RecordCodec};
use crate::error::{IoError, IoResult};
use crate::open_file;

/// Paths of the three files making up a split mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPaths {
    /// Vertex file.
    pub node: PathBuf,
    /// Triangle face file.
    pub face: PathBuf,
    /// Tetrahedron file.
    pub ele: PathBuf,
}

impl SplitPaths {
    /// Resolve the file triple for a stem or for any one of the three files.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use tetmesh_io::SplitPaths;
    ///
    /// let paths = SplitPaths::from_path("out/nVolume.1.ele");
    /// assert_eq!(paths.node, PathBuf::from("out/nVolume.1.node"));
    /// assert_eq!(SplitPaths::from_path("out/nVolume.1"), paths);
    /// ```
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let is_member = path.extension().and_then(|e| e.to_str()).is_some_and(|e| {
            MeshFormat::SPLIT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(e))
        });
        let stem = if is_member {
            path.with_extension("")
        } else {
            path.to_path_buf()
        };

        let sibling = |ext: &str| {
            let mut name = stem.as_os_str().to_owned();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        };
        Self {
            node: sibling("node"),
            face: sibling("face"),
            ele: sibling("ele"),
        }
    }
}

/// Options for [`save_split_with_options`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitWriteOptions {
    /// Comment line written at the top of each file. Must start with `#`.
    ///
    /// Default: `"# Generated by tetmesh-io"`
    pub comment: String,

    /// Factor applied to every coordinate on write.
    ///
    /// Default: `1.0`
    pub scaling_factor: f64,
}

impl Default for SplitWriteOptions {
    fn default() -> Self {
        Self {
            comment: "# Generated by tetmesh-io".to_string(),
            scaling_factor: 1.0,
        }
    }
}

/// Load and normalize a split mesh.
///
/// `path` may be the shared stem or any one of the three files.
///
/// # Errors
///
/// Returns an error if any of the files cannot be read, a record is
/// malformed, or the mesh fails validation.
///
/// # Example
///
/// ```no_run
/// use tetmesh_io::load_split;
///
/// let mesh = load_split("out/nVolume.1.node").unwrap();
/// println!("{} faces, {} tetrahedra", mesh.triangles().len(), mesh.tetrahedra().len());
/// ```
pub fn load_split<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    load_split_with_params(path, &NormalizeParams::default())
}

/// Load and normalize a split mesh with custom normalization params.
///
/// # Errors
///
/// See [`load_split`].
pub fn load_split_with_params<P: AsRef<Path>>(
    path: P,
    params: &NormalizeParams,
) -> IoResult<Mesh> {
    let mut mesh = read_split_raw(path)?;
    normalize_mesh_with_params(&mut mesh, params)?;
    Ok(mesh)
}

/// Read a split mesh without validating or normalizing it.
///
/// # Errors
///
/// Returns an error if a file cannot be read or a record is malformed.
pub fn read_split_raw<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let paths = SplitPaths::from_path(path);
    debug!("Reading split mesh {}", paths.node.display());

    let mesh = parse_split(
        open_file(&paths.node)?,
        open_file(&paths.face)?,
        open_file(&paths.ele)?,
    )?;

    info!(
        "Read {}: {} vertices, {} faces, {} tetrahedra",
        paths.node.display(),
        mesh.vertex_count(),
        mesh.triangles().len(),
        mesh.tetrahedra().len()
    );
    Ok(mesh)
}

/// Parse the three split files into an un-normalized mesh.
///
/// # Errors
///
/// [`IoError::MalformedRecord`] if a header or record fails to decode.
pub fn parse_split<N: BufRead, F: BufRead, E: BufRead>(
    node: N,
    face: F,
    ele: E,
) -> IoResult<Mesh> {
    let format = MeshFormat::Split;

    let (declared_vertex_count, vertices) =
        parse_records(node, |line| format.decode_vertex(line)).map_err(|e| e.in_file(".node"))?;

    let faces = ElementConfig::triangles();
    let (declared_faces, triangles) =
        parse_records(face, |line| format.decode_element(line, &faces))
            .map_err(|e| e.in_file(".face"))?;

    let tets = ElementConfig::tetrahedra();
    let (declared_tets, tetrahedra) =
        parse_records(ele, |line| format.decode_element(line, &tets))
            .map_err(|e| e.in_file(".ele"))?;

    Ok(Mesh::from_parts(
        MeshFormat::Split,
        MeshParts {
            vertices,
            triangles,
            tetrahedra,
            declared_vertex_count,
            declared_element_count: declared_faces + declared_tets,
            ..Default::default()
        },
    ))
}

/// Read one split file: comments are skipped, the first remaining line is
/// the header whose first field is the record count, every later line is a
/// record.
fn parse_records<R, T>(
    reader: R,
    mut decode: impl FnMut(&str) -> IoResult<T>,
) -> IoResult<(usize, Vec<T>)>
where
    R: BufRead,
{
    let mut declared = None;
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if declared.is_none() {
            let count = trimmed
                .split_whitespace()
                .next()
                .and_then(|t| t.parse::<usize>().ok())
                .ok_or_else(|| {
                    IoError::malformed(format!("invalid header `{trimmed}`")).at_line(line_no)
                })?;
            declared = Some(count);
            continue;
        }

        records.push(decode(trimmed).map_err(|e| e.at_line(line_no))?);
    }

    let declared = declared.ok_or_else(|| IoError::malformed("missing header line"))?;
    Ok((declared, records))
}

/// Save a mesh as a split triple.
///
/// `path` may be a stem or any of the three file names.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
///
/// # Example
///
/// ```no_run
/// use tetmesh_io::{load_unified, save_split};
///
/// let mesh = load_unified("device.msh").unwrap();
/// save_split(&mesh, "device").unwrap(); // device.node, device.face, device.ele
/// ```
pub fn save_split<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    save_split_with_options(mesh, path, &SplitWriteOptions::default())
}

/// Save a mesh as a split triple with custom options.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn save_split_with_options<P: AsRef<Path>>(
    mesh: &Mesh,
    path: P,
    options: &SplitWriteOptions,
) -> IoResult<()> {
    let paths = SplitPaths::from_path(path);

    let mut node = BufWriter::new(File::create(&paths.node)?);
    let mut face = BufWriter::new(File::create(&paths.face)?);
    let mut ele = BufWriter::new(File::create(&paths.ele)?);
    write_split(mesh, &mut node, &mut face, &mut ele, options)?;
    node.flush()?;
    face.flush()?;
    ele.flush()?;

    info!("Wrote {}", paths.node.display());
    Ok(())
}

/// Write a mesh as a split triple.
///
/// Faces come from the mesh's triangle view and tetrahedra from its
/// tetrahedron view, each with its own id range.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_split<N: Write, F: Write, E: Write>(
    mesh: &Mesh,
    mut node: N,
    mut face: F,
    mut ele: E,
    options: &SplitWriteOptions,
) -> IoResult<()> {
    if !mesh.is_normalized() {
        warn!("Writing a mesh that has not been normalized");
    }
    let format = MeshFormat::Split;
    let comment = options.comment.trim_end();

    writeln!(node, "{comment}")?;
    writeln!(node, "{} 3 0 0", mesh.vertex_count())?;
    for vertex in mesh.vertices() {
        writeln!(node, "{}", format.encode_vertex(vertex, options.scaling_factor))?;
    }

    writeln!(face, "{comment}")?;
    writeln!(face, "{}  0", mesh.triangles().len())?;
    for triangle in mesh.triangles() {
        writeln!(face, "{}", format.encode_element(triangle))?;
    }

    writeln!(ele, "{comment}")?;
    writeln!(ele, "{}  4  0", mesh.tetrahedra().len())?;
    for tetrahedron in mesh.tetrahedra() {
        writeln!(ele, "{}", format.encode_element(tetrahedron))?;
    }

    Ok(())
}
