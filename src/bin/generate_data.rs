use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use dental_dash::config;
use dental_dash::data::generator::{generate, GeneratorConfig};
use dental_dash::data::writer;

/// Generate a synthetic dental clinic appointment dataset.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of appointments to generate.
    #[arg(
        short,
        long,
        default_value_t = config::DEFAULT_ROWS as u64,
        value_parser = clap::value_parser!(u64).range(0..=config::MAX_ROWS as u64)
    )]
    rows: u64,

    /// CSV file to write.
    #[arg(short, long, default_value = config::DATA_FILE)]
    output: PathBuf,

    /// Appointments are spread over this many days up to today.
    #[arg(
        short,
        long,
        default_value_t = config::DEFAULT_WINDOW_DAYS,
        value_parser = clap::value_parser!(i64).range(0..=config::MAX_WINDOW_DAYS)
    )]
    window_days: i64,

    /// Seed for a reproducible dataset. Random when omitted.
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let gen_config = GeneratorConfig {
        rows: usize::try_from(args.rows).context("row count does not fit in memory")?,
        window_days: args.window_days,
        ..GeneratorConfig::default()
    };

    println!("Generating {} rows of fake dental clinic data...", gen_config.rows);
    let records = generate(&gen_config, Local::now().date_naive(), &mut rng)
        .context("generating appointments")?;

    writer::write_file(&args.output, &records)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Data generation complete. Saved to '{}'.", args.output.display());

    println!("\nFirst 5 rows of the generated data:");
    let preview = writer::to_csv_string(records.iter().take(5)).context("rendering preview")?;
    print!("{preview}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["generate_data"]).unwrap();
        assert_eq!(args.rows, config::DEFAULT_ROWS as u64);
        assert_eq!(args.window_days, config::DEFAULT_WINDOW_DAYS);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = Args::try_parse_from(["generate_data", "--window-days", "1000000000"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Args::try_parse_from(["generate_data", "--rows", "99999999999"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
