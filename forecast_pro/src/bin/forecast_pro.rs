//! # forecast_pro
//!
//! Command-line driver: load a CSV series, run the pipeline, print the report.

use clap::{Parser, Subcommand};
use forecast_pro::config::ForecastConfig;
use forecast_pro::data::{DataLoader, TimeSeries};
use forecast_pro::error::{ForecastError, Result};
use forecast_pro::pipeline::ForecastPipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forecast_pro", version)]
#[command(about = "ARIMA(1,1,1) forecasting for univariate time series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast future periods of a CSV series
    Forecast {
        /// Input CSV file; first column time, second column value
        #[arg(short, long)]
        input: PathBuf,

        /// Number of steps to forecast (1-5)
        #[arg(short, long)]
        steps: Option<usize>,

        /// strftime format of the time column
        #[arg(short, long)]
        time_format: Option<String>,

        /// Fail on irregular time indexes instead of falling back
        #[arg(long)]
        strict_frequency: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// JSON configuration file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run only the stationarity diagnostic
    Diagnose {
        /// Input CSV file; first column time, second column value
        #[arg(short, long)]
        input: PathBuf,

        /// strftime format of the time column
        #[arg(short, long)]
        time_format: Option<String>,
    },
}

fn run_forecast(
    input: PathBuf,
    steps: Option<usize>,
    time_format: Option<String>,
    strict_frequency: bool,
    json: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut settings = match config {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::new(),
    };
    if let Some(steps) = steps {
        settings = settings.with_steps(steps);
    }
    if let Some(format) = time_format {
        settings = settings.with_time_format(format);
    }
    if strict_frequency {
        settings = settings.with_strict_frequency(true);
    }

    let pipeline = ForecastPipeline::new(settings)?;
    let table = DataLoader::from_csv(&input)?;
    let report = pipeline.run_table(&table)?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn run_diagnose(input: PathBuf, time_format: Option<String>) -> Result<()> {
    let format = time_format.unwrap_or_else(|| ForecastConfig::default().time_format);
    let table = DataLoader::from_csv(&input)?;
    let series = TimeSeries::from_table(&table, &format)?;

    println!("=== Data Check ===");
    println!("Total data points: {}", series.len());
    println!();
    println!("=== Stationarity Test ===");
    let (diagnostic, warning) = ForecastPipeline::diagnose(&series);
    match diagnostic {
        Some(diag) => {
            println!("ADF Statistic: {:.2}", diag.statistic);
            println!("p-value: {:.4}", diag.p_value);
            for (level, value) in &diag.critical_values {
                println!("Critical value ({}): {:.3}", level, value);
            }
            println!("Verdict: {}", diag.verdict);
        }
        None => println!("Not available"),
    }
    if let Some(warning) = warning {
        println!();
        println!("=== Warnings ===");
        println!("- {}", warning);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_pro=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Forecast {
            input,
            steps,
            time_format,
            strict_frequency,
            json,
            config,
        } => run_forecast(input, steps, time_format, strict_frequency, json, config),
        Commands::Diagnose { input, time_format } => run_diagnose(input, time_format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if err.is_input_error() {
                ExitCode::from(2)
            } else if matches!(err, ForecastError::ModelFitFailure(_)) {
                ExitCode::from(3)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
