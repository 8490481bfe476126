use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use genplay_core::operation::{BinningMethod, BinningParams, IslandParams, IslandResult};
use genplay_core::{GenomicPos, Score, TransformOperation};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::Session;
use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "genplay")]
#[command(about = "GenPlay - multi-genome coordinates and track operations")]
#[command(version)]
#[command(long_about = "
GenPlay translates positions between aligned genomes through a shared meta-genome
and computes statistics and derived tracks over bedGraph files, one chromosome per worker.

Examples:
  genplay stats --input signal.bedgraph --op average
  genplay islands --input signal.bedgraph --out islands.bedgraph --threshold 5 --max-gap 200
  genplay combine --first a.bedgraph --second b.bedgraph --out sum.bedgraph --method add
  genplay translate --offsets variants.tsv --genome NA12878 --allele allele01 \\
      --chromosome chr1 --position 250 --to hg19
  genplay config --example > genplay.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run operations on a single thread, in chromosome order
    #[arg(long, global = true)]
    pub deterministic: bool,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reduce a track to one number (min, max, sum, average, stddev, windows, bases)
    Stats {
        /// Input bedGraph file
        #[arg(short, long)]
        input: PathBuf,

        /// Statistic to compute
        #[arg(long, default_value = "average")]
        op: String,

        /// Restrict to these chromosomes (comma separated)
        #[arg(long, value_delimiter = ',')]
        chromosomes: Vec<String>,
    },

    /// Apply a constant to every score (add, subtract, multiply, divide)
    Constant {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long)]
        op: String,

        #[arg(long, allow_hyphen_values = true)]
        value: Score,
    },

    /// Keep windows whose score lies in an inclusive range
    Filter {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long, allow_hyphen_values = true, default_value_t = Score::MIN)]
        low: Score,

        #[arg(long, allow_hyphen_values = true, default_value_t = Score::MAX)]
        high: Score,

        /// Compare score per base instead of score
        #[arg(long)]
        per_base: bool,
    },

    /// Fraction of non-zero windows around each window
    Density {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        /// Neighbours on each side (default from config)
        #[arg(long)]
        half_width: Option<usize>,
    },

    /// Find enriched regions
    Islands {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        /// Minimum window score (default from config)
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<Score>,

        /// Largest gap in bases inside an island
        #[arg(long)]
        max_gap: Option<GenomicPos>,

        /// Shortest island kept, in bases
        #[arg(long)]
        min_length: Option<GenomicPos>,

        /// What to write for each island
        #[arg(long)]
        result: Option<IslandOutput>,
    },

    /// Re-tile a track into fixed-size bins
    Bin {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long)]
        bin_size: Option<GenomicPos>,

        #[arg(long)]
        method: Option<BinMethod>,
    },

    /// Combine two tracks (add, subtract, multiply, divide, average, min, max, overlap)
    Combine {
        #[arg(long)]
        first: PathBuf,

        #[arg(long)]
        second: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long, default_value = "add")]
        method: String,
    },

    /// Translate positions between genomes (use "Meta genome" for the shared coordinates)
    Translate {
        /// Offsets file: genome allele chromosome position delta
        #[arg(long)]
        offsets: PathBuf,

        #[arg(long)]
        genome: String,

        /// reference, allele01 or allele02
        #[arg(long, default_value = "allele01")]
        allele: String,

        #[arg(long)]
        chromosome: String,

        #[arg(long, num_args = 1.., required = true)]
        position: Vec<GenomicPos>,

        /// Output genome
        #[arg(long)]
        to: String,
    },

    /// Show configuration
    Config {
        /// Print an example configuration with every default
        #[arg(long)]
        example: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum IslandOutput {
    Windows,
    Sum,
    Average,
}

impl From<IslandOutput> for IslandResult {
    fn from(output: IslandOutput) -> Self {
        match output {
            IslandOutput::Windows => IslandResult::WindowScores,
            IslandOutput::Sum => IslandResult::IslandSum,
            IslandOutput::Average => IslandResult::IslandAverage,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BinMethod {
    Sum,
    Average,
    Maximum,
}

impl From<BinMethod> for BinningMethod {
    fn from(method: BinMethod) -> Self {
        match method {
            BinMethod::Sum => BinningMethod::Sum,
            BinMethod::Average => BinningMethod::Average,
            BinMethod::Maximum => BinningMethod::Maximum,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let session = || Session::new(config, cli.deterministic, cli.threads, cli.quiet);

    match cli.command {
        Commands::Stats { input, op, chromosomes } => {
            commands::stats::execute(&session()?, input, &op, chromosomes)?;
        }

        Commands::Constant { input, out, op, value } => {
            let op = commands::transform::constant(&op, value)?;
            commands::transform::execute(&session()?, input, out, op)?;
        }

        Commands::Filter { input, out, low, high, per_base } => {
            let op = commands::transform::threshold(low, high, per_base);
            commands::transform::execute(&session()?, input, out, op)?;
        }

        Commands::Density { input, out, half_width } => {
            let op = TransformOperation::Density {
                half_width: half_width.unwrap_or(config.density.half_width),
            };
            commands::transform::execute(&session()?, input, out, op)?;
        }

        Commands::Islands { input, out, threshold, max_gap, min_length, result } => {
            let defaults = &config.islands;
            let op = TransformOperation::Islands(IslandParams {
                threshold: threshold.unwrap_or(defaults.threshold),
                max_gap: max_gap.unwrap_or(defaults.max_gap),
                min_island_length: min_length.unwrap_or(defaults.min_island_length),
                result: result.map(IslandResult::from).unwrap_or(defaults.result),
            });
            commands::transform::execute(&session()?, input, out, op)?;
        }

        Commands::Bin { input, out, bin_size, method } => {
            let op = TransformOperation::Binning(BinningParams::new(
                bin_size.unwrap_or(config.binning.bin_size),
                method.map(BinningMethod::from).unwrap_or(config.binning.method),
            ));
            commands::transform::execute(&session()?, input, out, op)?;
        }

        Commands::Combine { first, second, out, method } => {
            commands::combine::execute(&session()?, first, second, out, &method)?;
        }

        Commands::Translate { offsets, genome, allele, chromosome, position, to } => {
            commands::translate::execute(offsets, &genome, &allele, &chromosome, &position, &to)?;
        }

        Commands::Config { example } => {
            let content = if example {
                Config::example_toml()?
            } else {
                toml::to_string_pretty(config)
                    .map_err(|e| CliError::config(format!("TOML serialization error: {}", e)))?
            };
            print!("{}", content);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose, cli.quiet)?;

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    if let Err(err) = run(cli, &config) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            print_error_and_exit(cli_err);
        }
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_islands_overrides() {
        let cli = Cli::parse_from([
            "genplay", "islands", "--input", "in.bedgraph", "--out", "out.bedgraph",
            "--threshold", "-2.5", "--result", "sum",
        ]);
        match cli.command {
            Commands::Islands { threshold, result, max_gap, .. } => {
                assert_eq!(threshold, Some(-2.5));
                assert!(matches!(result, Some(IslandOutput::Sum)));
                assert_eq!(max_gap, None);
            }
            _ => panic!("expected islands command"),
        }
    }

    #[test]
    fn test_parse_translate_positions() {
        let cli = Cli::parse_from([
            "genplay", "translate", "--offsets", "v.tsv", "--genome", "NA12878",
            "--chromosome", "chr1", "--position", "10", "250", "--to", "hg19",
        ]);
        match cli.command {
            Commands::Translate { position, allele, .. } => {
                assert_eq!(position, vec![10, 250]);
                assert_eq!(allele, "allele01");
            }
            _ => panic!("expected translate command"),
        }
    }
}
