use std::error::Error;
use std::io;
use std::io::prelude::*;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{error, info};

use xsecbin::config::{BinningConfig, SeedPolicy};
use xsecbin::text::{columns_from_file, write_binned_table, TableMetadata};
use xsecbin::{bin_series, TrailingPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Resolution,
    Box,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Trailing {
    Drop,
    Pad,
    Short,
}

impl From<Trailing> for TrailingPolicy {
    fn from(value: Trailing) -> Self {
        match value {
            Trailing::Drop => TrailingPolicy::Drop,
            Trailing::Pad => TrailingPolicy::Pad,
            Trailing::Short => TrailingPolicy::ShortGroup,
        }
    }
}

/// Bin the first two columns of a text table (location, value) to a lower resolution
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Whitespace or comma separated table, `#` lines are ignored
    input: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Mode::Resolution)]
    mode: Mode,

    /// Target resolving power for resolution mode
    #[arg(short, long, default_value_t = 100.0)]
    target: f64,

    /// Starting resolving power of each group in resolution mode
    #[arg(long, default_value_t = 15000.0, conflicts_with = "unbounded_seed")]
    seed: f64,

    /// Start each group at infinite resolving power instead of `--seed`
    #[arg(long)]
    unbounded_seed: bool,

    #[arg(long, default_value_t = 1e-2)]
    tolerance: f64,

    /// Window size for box mode
    #[arg(short, long, default_value_t = 10)]
    window: usize,

    /// What to do with a trailing partial window in box mode
    #[arg(long, value_enum, default_value_t = Trailing::Drop)]
    trailing: Trailing,

    /// Reverse the binned output, e.g. to get ascending wavelength
    #[arg(short, long)]
    reverse: bool,

    /// Molecule name for the table header
    #[arg(long, default_value = "")]
    name: String,

    /// Data source citation for the table header
    #[arg(long, default_value = "")]
    reference: String,

    /// Provenance line for the table header, e.g. the pressure and temperature
    /// the input was taken at
    #[arg(long)]
    selection: Option<String>,

    /// Write the table here rather than to STDOUT
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn binning_config(&self) -> BinningConfig {
        let mut builder = BinningConfig::builder();
        match self.mode {
            Mode::Resolution => {
                let seed = if self.unbounded_seed {
                    SeedPolicy::Unbounded
                } else {
                    SeedPolicy::Fixed(self.seed)
                };
                builder
                    .target_resolving_power(self.target)
                    .tolerance(self.tolerance)
                    .seed(seed);
            }
            Mode::Box => {
                builder
                    .window_size(self.window)
                    .trailing(self.trailing.into());
            }
        }
        builder.build()
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let columns = columns_from_file(&args.input)?;
    if columns.len() < 2 {
        return Err(format!(
            "Expected at least two columns in {}, found {}",
            args.input.display(),
            columns.len()
        )
        .into());
    }
    let config = args.binning_config();
    let binned = bin_series(&columns[0], &columns[1], &config)?;
    info!(
        "Binned {} samples from {} into {}",
        columns[0].len(),
        args.input.display(),
        binned.len()
    );
    let binned = if args.reverse {
        binned.reversed()
    } else {
        binned
    };

    let metadata = TableMetadata {
        name: args.name.clone(),
        source: args.reference.clone(),
        from_file: args.input.display().to_string(),
        selection: args.selection.clone().unwrap_or_default(),
        binning: binned.description.clone(),
    };

    match &args.output {
        Some(path) => {
            xsecbin::text::binned_table_to_file(path, &metadata, &binned.location, &binned.value)?
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_binned_table(&mut stdout, &metadata, &binned.location, &binned.value)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1);
    }
}
