//! Format conversion.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use tetmesh_io::{MeshFormat, NormalizeParams, load_mesh_as, save_mesh_as};
use tracing::info;

/// Arguments of `tetmesh convert`.
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub from: Option<MeshFormat>,
    pub to: Option<MeshFormat>,
    pub scale: f64,
    pub lenient: bool,
}

/// Resolve a format from an explicit flag or the path's extension.
pub fn resolve_format(path: &Path, explicit: Option<MeshFormat>) -> Result<MeshFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match MeshFormat::from_path(path) {
        Some(format) => Ok(format),
        None => bail!(
            "cannot tell the format of {} from its extension, pass --from/--to",
            path.display()
        ),
    }
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    let from = resolve_format(&args.input, args.from)?;
    let to = resolve_format(&args.output, args.to)?;
    let params = if args.lenient {
        NormalizeParams::lenient()
    } else {
        NormalizeParams::default()
    };

    let mesh = load_mesh_as(&args.input, from, &params)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    info!("Converting {} to {}", from, to);

    save_mesh_as(&mesh, &args.output, to, args.scale)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("{}", mesh.dimmed());
    println!(
        "  {} {} -> {}",
        "✓".green(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
