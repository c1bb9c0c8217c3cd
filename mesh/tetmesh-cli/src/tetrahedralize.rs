//! Surface tetrahedralization through an external mesher.
//!
//! The mesher is run as a blocking subprocess. It writes its result next to
//! the surface as `<stem>.1.node`, `<stem>.1.face` and `<stem>.1.ele`, which
//! is read back and written as a unified mesh.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tetmesh_io::{SplitPaths, load_split, save_unified};
use tracing::info;
use xshell::{Shell, cmd};

/// First-iteration output triple the mesher writes for `surface`.
fn mesher_output(surface: &Path) -> SplitPaths {
    let mut stem = surface.with_extension("").into_os_string();
    stem.push(".1");
    SplitPaths::from_path(PathBuf::from(stem))
}

/// `<dir>/<stem>_meshed.msh` next to the surface.
fn default_output(surface: &Path) -> PathBuf {
    let stem = surface
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    surface.with_file_name(format!("{stem}_meshed.msh"))
}

pub fn run(surface: &Path, tetgen: &str, switches: &str, output: Option<PathBuf>) -> Result<()> {
    let sh = Shell::new()?;
    let output = output.unwrap_or_else(|| default_output(surface));

    println!("{}", format!("Tetrahedralizing {}...", surface.display()).dimmed());
    cmd!(sh, "{tetgen} {switches} {surface}")
        .run()
        .with_context(|| format!("{tetgen} failed on {}", surface.display()))?;

    let produced = mesher_output(surface);
    info!("Reading mesher output {}", produced.node.display());
    let mesh = load_split(&produced.node)
        .with_context(|| format!("failed to read {}", produced.node.display()))?;

    save_unified(&mesh, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("{mesh}");
    println!("  {} Wrote {}", "✓".green(), output.display());
    Ok(())
}
