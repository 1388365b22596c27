use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

mod analysis;
mod commands;
mod error;
mod telemetry;
mod utils;

use analysis::config::AnalysisConfig;

#[derive(Parser)]
#[command(name = "farm-audit")]
#[command(about = "Device-farm fraud detection tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a device table for coordinated farms
    Analyze {
        /// Path to device table CSV (.gz and .zst work too)
        table: String,

        /// Directory for result tables
        #[arg(short, long, default_value = "results")]
        output_dir: String,

        /// Number of top groups to show in the report
        #[arg(long, default_value = "10")]
        top: usize,

        /// Observations per subnet above which the subnet is dense
        #[arg(long, default_value = "20")]
        subnet_threshold: usize,

        /// Observations per IP above which the IP counts as shared
        #[arg(long, default_value = "1")]
        ip_threshold: usize,

        /// Number of behavior clusters
        #[arg(long, default_value = "3")]
        clusters: usize,

        /// Clustering seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Independent k-means restarts
        #[arg(long, default_value = "10")]
        restarts: usize,

        /// Iteration cap per restart
        #[arg(long, default_value = "300")]
        max_iterations: usize,

        /// Half-width of the drone trade-frequency band
        #[arg(long, default_value = "2.0")]
        drone_band: f64,
    },

    /// Generate a synthetic device table with planted farms
    Generate {
        /// Output CSV path
        #[arg(short, long, default_value = "data/device_data.csv")]
        output: String,

        /// Total devices to generate
        #[arg(long, default_value = "1000")]
        devices: usize,

        /// Generator seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate the device table if needed, then analyze it
    Run {
        /// Path to device table CSV
        #[arg(long, default_value = "data/device_data.csv")]
        table: String,

        /// Directory for result tables
        #[arg(short, long, default_value = "results")]
        output_dir: String,

        /// Regenerate the device table even if it exists
        #[arg(long)]
        regenerate: bool,

        /// Total devices when generating
        #[arg(long, default_value = "1000")]
        devices: usize,

        /// Number of top groups to show in the report
        #[arg(long, default_value = "10")]
        top: usize,

        /// Observations per subnet above which the subnet is dense
        #[arg(long, default_value = "20")]
        subnet_threshold: usize,

        /// Observations per IP above which the IP counts as shared
        #[arg(long, default_value = "1")]
        ip_threshold: usize,

        /// Number of behavior clusters
        #[arg(long, default_value = "3")]
        clusters: usize,

        /// Seed shared by the generator and the clusterer
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Independent k-means restarts
        #[arg(long, default_value = "10")]
        restarts: usize,

        /// Iteration cap per restart
        #[arg(long, default_value = "300")]
        max_iterations: usize,

        /// Half-width of the drone trade-frequency band
        #[arg(long, default_value = "2.0")]
        drone_band: f64,
    },

    /// Print a report from previously written result tables
    Summary {
        /// Directory holding the result tables
        #[arg(short, long, default_value = "results")]
        output_dir: String,

        /// Number of top groups to show
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            table,
            output_dir,
            top,
            subnet_threshold,
            ip_threshold,
            clusters,
            seed,
            restarts,
            max_iterations,
            drone_band,
        } => {
            let config = AnalysisConfig {
                subnet_threshold,
                ip_share_threshold: ip_threshold,
                clusters,
                seed,
                restarts,
                max_iterations,
                drone_freq_band: drone_band,
            };
            commands::analyze::run(&table, &output_dir, &config, top)
        }
        Commands::Generate {
            output,
            devices,
            seed,
        } => commands::generate::run(&output, devices, seed),
        Commands::Run {
            table,
            output_dir,
            regenerate,
            devices,
            top,
            subnet_threshold,
            ip_threshold,
            clusters,
            seed,
            restarts,
            max_iterations,
            drone_band,
        } => {
            let config = AnalysisConfig {
                subnet_threshold,
                ip_share_threshold: ip_threshold,
                clusters,
                seed,
                restarts,
                max_iterations,
                drone_freq_band: drone_band,
            };
            commands::run::run(&table, &output_dir, regenerate, devices, &config, top)
        }
        Commands::Summary { output_dir, top } => commands::summary::run(&output_dir, top),
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "farm-audit", &mut std::io::stdout());
            Ok(())
        }
    }
}
