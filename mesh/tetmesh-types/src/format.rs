//! Mesh format identifiers.

use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// The two interchange formats a [`Mesh`](crate::Mesh) can come from or go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshFormat {
    /// Single-file, section-tagged format (`.msh`, version 2.2 ASCII).
    Unified,
    /// Three sibling files: `.node`, `.face` and `.ele`.
    Split,
}

impl MeshFormat {
    /// Extensions of the three files making up a split mesh.
    pub const SPLIT_EXTENSIONS: [&'static str; 3] = ["node", "face", "ele"];

    /// Detect format from file extension.
    ///
    /// Any of the three split extensions selects [`MeshFormat::Split`].
    ///
    /// # Example
    ///
    /// ```
    /// use tetmesh_types::MeshFormat;
    ///
    /// assert_eq!(MeshFormat::from_path("box.msh"), Some(MeshFormat::Unified));
    /// assert_eq!(MeshFormat::from_path("box.1.ELE"), Some(MeshFormat::Split));
    /// assert_eq!(MeshFormat::from_path("box.stl"), None);
    /// ```
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "msh" => Some(Self::Unified),
            "node" | "face" | "ele" => Some(Self::Split),
            _ => None,
        }
    }

    /// Canonical extension. For the split format this is the vertex file.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Unified => "msh",
            Self::Split => "node",
        }
    }

    /// Human-readable label used in mesh summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unified => "Unified 2.2",
            Self::Split => "Split",
        }
    }
}

impl FromStr for MeshFormat {
    type Err = MeshError;

    /// Parse a format name. Accepts the format names and the names of the
    /// tools that produce them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unified" | "msh" | "gmsh" => Ok(Self::Unified),
            "split" | "tetgen" | "node" => Ok(Self::Split),
            _ => Err(MeshError::UnsupportedMeshKind {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unified => f.write_str("unified"),
            Self::Split => f.write_str("split"),
        }
    }
}
