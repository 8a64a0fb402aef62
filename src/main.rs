use agroclimate::{read_csv, ConfigFile, EnrichedFrame, Pipeline, SeasonConvention};
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

/// Prepares the Paraná agroclimatology table for analysis.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Runs the pipeline and writes the enriched table.
    Run {
        /// TOML config file; flags below override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, requires = "productivity")]
        climate: Option<PathBuf>,
        #[arg(long, requires = "climate")]
        productivity: Option<PathBuf>,
        /// Directory holding both CSV tables (largest is climate, smallest is productivity).
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Output path; a `.parquet` extension writes Parquet, anything else CSV.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        date_column: Option<String>,
        /// Keep years in [START, END] instead of the productivity table's years.
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        year_range: Option<Vec<i32>>,
        /// Label the season windows with Northern-Hemisphere names.
        #[arg(long)]
        northern_labels: bool,
    },
    /// Prints the row counts of the four regions of an enriched table.
    Regions { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Run {
            config,
            climate,
            productivity,
            input_dir,
            output,
            date_column,
            year_range,
            northern_labels,
        } => {
            let file = match &config {
                Some(path) => ConfigFile::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ConfigFile::default(),
            };
            let overrides = ConfigFile {
                climate,
                productivity,
                input_dir,
                output,
                date_column,
                retain_columns: None,
                year_range: year_range.map(|range| (range[0], range[1])),
                season_convention: northern_labels.then_some(SeasonConvention::Northern),
            };

            let pipeline = Pipeline::new(file.overlay(overrides).into_config()?)?;
            let report = pipeline.run().context("pipeline run failed")?;
            println!(
                "Wrote {} of {} rows to {} (years: {})",
                report.output_rows,
                report.input_rows,
                report.output_path.display(),
                report.years.join(", ")
            );
        }
        Commands::Regions { path } => {
            let frame = read_csv(&path)?;
            let partition = EnrichedFrame::new(frame)
                .regions()
                .with_context(|| format!("partitioning {}", path.display()))?;
            if let Some(center) = partition.centroid {
                println!(
                    "Centroid: latitude {:.4}, longitude {:.4}",
                    center.latitude, center.longitude
                );
            }
            for (region, frame) in partition.iter() {
                println!("{:<6} {}", region.as_str(), frame.height());
            }
        }
    }
    Ok(())
}
