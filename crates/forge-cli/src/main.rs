//! Build a rack design, save its document and export one STL per body.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use file_format::{load_parameter_file, write_document, LoadError, ProjectMetadata, SaveError};
use kernel_bridge::PrismKernel;
use part_recipes::{build_design, export_design, Design, RecipeError};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DesignKind {
    /// Three-piece 10-inch 1U panel
    RackPanel,
    /// Top and bottom rail brackets, left and right
    Brackets,
}

/// Build a rack design, save its document and export one STL per body.
#[derive(Debug, Parser)]
#[command(name = "rack-forge", version)]
struct Cli {
    /// Design to build
    #[arg(long, value_enum)]
    design: DesignKind,

    /// JSON parameter overrides applied before building
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Directory receiving one STL per body
    #[arg(long, value_name = "DIR", default_value = "out")]
    output_dir: PathBuf,

    /// Save the feature-tree document to this file
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// Build and report only
    #[arg(long)]
    no_export: bool,

    /// Add the bar between the rack panel's box cutouts
    #[arg(long)]
    retention_bar: bool,
}

/// Returns `false` when any body failed to build.
fn run(options: &Cli) -> Result<bool, CliError> {
    let mut design = match options.design {
        DesignKind::RackPanel => Design::rack_panel(options.retention_bar)?,
        DesignKind::Brackets => Design::brackets()?,
    };
    if let Some(path) = &options.params {
        load_parameter_file(path, &mut design.parameters)?;
    }

    let mut kernel = PrismKernel::new();
    let mut report = build_design(&design, &mut kernel);
    print!("{}", report.to_text());
    if !report.is_success() {
        return Ok(false);
    }

    if let Some(path) = &options.document {
        let metadata = ProjectMetadata::new(design.name.as_str());
        write_document(
            path,
            report.bodies.iter().map(|b| &b.body),
            &design.parameters,
            &metadata,
        )?;
        println!("Document written to {}", path.display());
    }
    if !options.no_export {
        let written = export_design(&mut report, &mut kernel, design.deflection, &options.output_dir)?;
        for path in &written {
            println!("  {}", path.display());
        }
        info!(files = written.len(), "export complete");
    }
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
