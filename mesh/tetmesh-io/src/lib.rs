//! Tetrahedral mesh file I/O.
//!
//! Readers and writers for the two interchange formats a tetrahedral mesher
//! pipeline passes around:
//!
//! - **Unified** - One section-tagged `.msh` file (version 2.2, ASCII)
//! - **Split** - Three sibling files `.node`, `.face` and `.ele`
//!
//! Every loader reads into the canonical [`Mesh`] and then validates and
//! normalizes it (see [`normalize_mesh`]), so any loaded mesh can be written
//! to either format.
//!
//! # Example
//!
//! ```no_run
//! use tetmesh_io::{load_split, save_unified};
//!
//! // Mesher output: nVolume.1.node, nVolume.1.face, nVolume.1.ele
//! let mesh = load_split("nVolume.1.node").unwrap();
//! println!("{mesh}");
//!
//! save_unified(&mesh, "nVolume_meshed.msh").unwrap();
//! ```
//!
//! # Format Detection
//!
//! ```no_run
//! use tetmesh_io::{load_mesh, save_mesh};
//!
//! let mesh = load_mesh("device.msh").unwrap();
//! save_mesh(&mesh, "device.node").unwrap(); // also writes device.face, device.ele
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod codec;
mod error;
mod split;
mod unified;

pub use codec::{
    ElementConfig, NodesPerElement, RecordCodec, decode_physical_name, encode_physical_name,
    format_scientific,
};
pub use error::{IoError, IoResult};
pub use split::{
    SplitPaths, SplitWriteOptions, load_split, load_split_with_params, parse_split,
    read_split_raw, save_split, save_split_with_options, write_split,
};
pub use unified::{
    SUPPORTED_VERSION, UnifiedWriteOptions, load_unified, load_unified_with_params,
    parse_unified, read_unified_raw, save_unified, save_unified_with_options, unified_path,
    write_unified,
};

// Re-export the model so callers need a single dependency
pub use tetmesh_types::{
    CountKind, Element, ElementKind, ElementTags, Mesh, MeshError, MeshFormat, MeshParts, MeshReport,
    NormalizeParams, PhysicalName, Vertex, normalize_mesh, report_mesh,
};

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Open a file for buffered reading, mapping a missing file to
/// [`IoError::FileNotFound`].
pub(crate) fn open_file(path: &Path) -> IoResult<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn detect_format(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| {
        MeshError::UnsupportedMeshKind {
            name: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        }
        .into()
    })
}

/// Load a mesh from a file, detecting format from extension.
///
/// `.msh` selects the unified format; `.node`, `.face` or `.ele` select the
/// split format, reading all three siblings.
///
/// # Errors
///
/// Returns an error if:
/// - The format cannot be determined from the extension
/// - A file cannot be read
/// - The content is invalid for the detected format
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let path = path.as_ref();
    load_mesh_as(path, detect_format(path)?, &NormalizeParams::default())
}

/// Load a mesh in an explicit format with custom normalization params.
///
/// # Errors
///
/// See [`load_unified`] and [`load_split`].
pub fn load_mesh_as<P: AsRef<Path>>(
    path: P,
    format: MeshFormat,
    params: &NormalizeParams,
) -> IoResult<Mesh> {
    match format {
        MeshFormat::Unified => load_unified_with_params(path, params),
        MeshFormat::Split => load_split_with_params(path, params),
    }
}

/// Save a mesh to a file, detecting format from extension.
///
/// # Errors
///
/// Returns an error if:
/// - The format cannot be determined from the extension
/// - A file cannot be written
///
/// # Example
///
/// ```no_run
/// use tetmesh_io::{load_mesh, save_mesh};
///
/// let mesh = load_mesh("out/nVolume.1.ele").unwrap();
/// save_mesh(&mesh, "out/nVolume_meshed.msh").unwrap();
/// ```
pub fn save_mesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    save_mesh_as(mesh, path, detect_format(path)?, 1.0)
}

/// Save a mesh in an explicit format, scaling coordinates by `scaling_factor`.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn save_mesh_as<P: AsRef<Path>>(
    mesh: &Mesh,
    path: P,
    format: MeshFormat,
    scaling_factor: f64,
) -> IoResult<()> {
    match format {
        MeshFormat::Unified => save_unified_with_options(
            mesh,
            path,
            &UnifiedWriteOptions { scaling_factor },
        ),
        MeshFormat::Split => save_split_with_options(
            mesh,
            path,
            &SplitWriteOptions {
                scaling_factor,
                ..Default::default()
            },
        ),
    }
}
