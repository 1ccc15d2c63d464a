//! bintab CLI - build and inspect label tabs from config files.

use anyhow::{Context, Result};
use bintab::{create_tab_body, TabConfig, TabParameters};
use bintab_kernel::{GeometryBackend, PrismKernel};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "bintab")]
#[command(about = "Label-tab generator for storage bins", long_about = None)]
struct Cli {
    /// Log construction steps (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a tab and report its geometry
    Build {
        /// Tab config (.toml or .json)
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a config without building geometry
    Check {
        /// Tab config (.toml or .json)
        file: PathBuf,
    },
    /// Print a config with every field at its default
    Defaults {
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct BuildReport {
    method: &'static str,
    bounding_box: BoxReport,
    volume: f64,
    profile_segments: usize,
    tip_edges: usize,
    back_fillet: Option<f64>,
    fillets: Vec<FilletReport>,
}

#[derive(Debug, Serialize)]
struct BoxReport {
    min: [f64; 3],
    max: [f64; 3],
    extent: [f64; 3],
}

#[derive(Debug, Serialize)]
struct FilletReport {
    name: &'static str,
    edge: String,
    radius: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { file, json } => {
            let params = load_parameters(&file)?;
            let report = build_report(&params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&file, &report);
            }
        }
        Commands::Check { file } => {
            let params = load_parameters(&file)?;
            println!(
                "{}: ok ({} method, width {}, length {})",
                file.display(),
                params.method().name(),
                params.width(),
                params.length()
            );
        }
        Commands::Defaults { json } => {
            let config = default_config();
            if json {
                println!("{}", config.to_json_string()?);
            } else {
                print!("{}", config.to_toml_string()?);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_parameters(path: &Path) -> Result<TabParameters> {
    let config = TabConfig::load(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    config
        .to_parameters()
        .with_context(|| format!("invalid tab parameters in {}", path.display()))
}

fn default_config() -> TabConfig {
    TabConfig {
        origin: [0.0; 3],
        top_clearance: 0.0,
        width: 1.2,
        length: 4.2,
        method: Default::default(),
        fillets: Default::default(),
    }
}

fn build_report(params: &TabParameters) -> Result<BuildReport> {
    let mut kernel = PrismKernel::new();
    let tab = create_tab_body(params, &mut kernel).context("tab construction failed")?;
    let bbox = kernel.bounding_box(tab.body)?;
    let volume = kernel.volume(tab.body)?;
    let extent = bbox.extent();
    info!(volume, "tab built");

    Ok(BuildReport {
        method: params.method().name(),
        bounding_box: BoxReport {
            min: [bbox.min.x, bbox.min.y, bbox.min.z],
            max: [bbox.max.x, bbox.max.y, bbox.max.z],
            extent: [extent.x, extent.y, extent.z],
        },
        volume,
        profile_segments: kernel.body_profile(tab.body)?.len(),
        tip_edges: tab.tip_edges.len(),
        back_fillet: tab.back_fillet.map(|b| b.fillet.radius),
        fillets: tab
            .fillets
            .iter()
            .map(|f| FilletReport {
                name: f.name,
                edge: f.edge.to_string(),
                radius: f.radius,
            })
            .collect(),
    })
}

fn print_report(file: &Path, report: &BuildReport) {
    let [dx, dy, dz] = report.bounding_box.extent;
    println!("label tab: {}", file.display());
    println!("  Method: {}", report.method);
    println!("  Extent: {:.4} x {:.4} x {:.4} (length x depth x height)", dx, dy, dz);
    println!("  Volume: {:.6}", report.volume);
    println!("  Profile segments: {}", report.profile_segments);
    println!("  Tip edges: {}", report.tip_edges);
    if let Some(r) = report.back_fillet {
        println!("  Back fillet: {}", r);
    }

    if !report.fillets.is_empty() {
        println!("\nFillets:");
        for f in &report.fillets {
            println!("  {} on {} (r = {})", f.name, f.edge, f.radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds() {
        let params = default_config().to_parameters().unwrap();
        let report = build_report(&params).unwrap();
        assert_eq!(report.method, "angle");
        assert_eq!(report.tip_edges, 1);
        assert_eq!(report.fillets.len(), 1);
        assert!((report.bounding_box.extent[0] - 4.2).abs() < 1e-9);
        assert!(report.back_fillet.is_none());
    }

    #[test]
    fn test_report_serializes() {
        let config = TabConfig::from_toml_str(
            "width = 12.0\nlength = 42.0\n[method]\ntype = \"dimensions\"\n",
        )
        .unwrap();
        let report = build_report(&config.to_parameters().unwrap()).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["method"], "dimensions");
        assert_eq!(value["fillets"].as_array().unwrap().len(), 2);
        let depth = value["bounding_box"]["extent"][1].as_f64().unwrap();
        assert!((depth - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["bintab", "-v", "build", "tab.toml", "--json"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Build { json: true, .. }));
        assert!(Cli::try_parse_from(["bintab"]).is_err());
    }
}
