//! Mesh summary and quality report.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tetmesh_io::{MeshFormat, NormalizeParams, load_mesh_as, report_mesh};

use crate::convert::resolve_format;

pub fn run(input: &Path, from: Option<MeshFormat>) -> Result<()> {
    let format = resolve_format(input, from)?;
    let mesh = load_mesh_as(input, format, &NormalizeParams::default())
        .with_context(|| format!("failed to read {}", input.display()))?;
    let report = report_mesh(&mesh);

    println!();
    println!("{}", input.display().bold());
    println!("{mesh}");
    println!();
    print!("{report}");
    println!();

    if report.has_issues() {
        println!(
            "{}",
            format!("⚠ {} issue(s) found", report.issue_count()).yellow()
        );
    } else {
        println!("{}", "✓ No issues found".green());
    }
    Ok(())
}
