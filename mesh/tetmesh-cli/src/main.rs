//! `tetmesh` - convert and inspect tetrahedral meshes.
//!
//! # Commands
//!
//! - `tetmesh convert <INPUT> <OUTPUT>` - Convert between unified and split formats
//! - `tetmesh info <INPUT>` - Print the mesh summary and quality report
//! - `tetmesh tetrahedralize <SURFACE>` - Run the external mesher and convert its output
//!
//! Formats are detected from extensions (`.msh` or `.node`/`.face`/`.ele`)
//! unless given with `--from`/`--to`. Logging follows `RUST_LOG`, or `-v`/`-vv`.

mod convert;
mod info;
mod tetrahedralize;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tetmesh_io::MeshFormat;
use tracing_subscriber::EnvFilter;

/// Tetrahedral mesh converter
#[derive(Parser)]
#[command(name = "tetmesh")]
#[command(about = "Convert and inspect tetrahedral meshes", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a mesh between the unified and split formats
    Convert {
        /// Input mesh (a .msh file, or any of .node/.face/.ele)
        #[arg(name = "INPUT")]
        input: PathBuf,

        /// Output mesh (a .msh file, or a .node path or bare stem for split)
        #[arg(name = "OUTPUT")]
        output: PathBuf,

        /// Input format (unified, split), overrides extension detection
        #[arg(long)]
        from: Option<MeshFormat>,

        /// Output format (unified, split), overrides extension detection
        #[arg(long)]
        to: Option<MeshFormat>,

        /// Factor applied to every coordinate on write
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Skip reference and physical-name count checks
        #[arg(long)]
        lenient: bool,
    },

    /// Print a mesh summary and quality report
    Info {
        /// Input mesh
        #[arg(name = "INPUT")]
        input: PathBuf,

        /// Input format, overrides extension detection
        #[arg(long)]
        from: Option<MeshFormat>,
    },

    /// Tetrahedralize a closed surface with an external mesher
    Tetrahedralize {
        /// Surface file handed to the mesher (e.g. nVolume.stl)
        #[arg(name = "SURFACE")]
        surface: PathBuf,

        /// Mesher executable
        #[arg(long, default_value = "tetgen")]
        tetgen: String,

        /// Mesher switches
        #[arg(long, default_value = "-pq", allow_hyphen_values = true)]
        switches: String,

        /// Unified output path [default: <surface stem>_meshed.msh]
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            from,
            to,
            scale,
            lenient,
        } => convert::run(&convert::ConvertArgs {
            input,
            output,
            from,
            to,
            scale,
            lenient,
        }),
        Commands::Info { input, from } => info::run(&input, from),
        Commands::Tetrahedralize {
            surface,
            tetgen,
            switches,
            output,
        } => tetrahedralize::run(&surface, &tetgen, &switches, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn format_flags_parse_tool_names() {
        let cli = Cli::try_parse_from([
            "tetmesh", "convert", "in.node", "out", "--to", "gmsh", "--scale", "1e-3",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert { to, scale, .. } => {
                assert_eq!(to, Some(MeshFormat::Unified));
                assert!((scale - 1e-3).abs() < f64::EPSILON);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn unknown_format_name_is_rejected() {
        assert!(Cli::try_parse_from(["tetmesh", "info", "x.msh", "--from", "stl"]).is_err());
    }

    #[test]
    fn switches_accept_leading_hyphen() {
        let cli = Cli::try_parse_from([
            "tetmesh",
            "-vv",
            "tetrahedralize",
            "s.stl",
            "--switches",
            "-pqa1e-3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Tetrahedralize { switches, tetgen, .. } => {
                assert_eq!(switches, "-pqa1e-3");
                assert_eq!(tetgen, "tetgen");
            }
            _ => panic!("expected tetrahedralize"),
        }
    }
}
