//! Stockcast CLI
//!
//! Runs a full analysis (AI summary, charts, forecast) or prints a forecast
//! table for one symbol.
//!
//! # Usage
//!
//! ```bash
//! # Optional: enables AI summaries
//! export GEMINI_API_KEY="your-key"
//!
//! cargo run --bin stockcast -- analyze AAPL --period 6mo --report technical
//! cargo run --bin stockcast -- forecast MSFT
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;
use std::time::Duration;
use stockcast::charts::business_days_after;
use stockcast::pipeline::{forecast_failure_message, forecast_text};
use stockcast::{
    AnalysisPipeline, AnalysisRequest, DataProvider, Figure, Period, ReportType, StockcastConfig,
    Summarizer,
};
use stockcast_utils::{LogFormat, init_tracing, load_dotenv};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "stockcast")]
#[command(about = "Stock price forecasts, trend lines and AI summaries", long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Directory for cached price history
    #[arg(long, global = true, env = "STOCKCAST_CACHE_DIR", default_value = "cache")]
    cache_dir: PathBuf,

    /// Cache lifetime in hours
    #[arg(long, global = true, default_value_t = 24)]
    cache_ttl_hours: u64,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// AI summary, price and indicator charts, and forecast summary
    Analyze {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// History period: 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max
        #[arg(short, long, default_value = "1y")]
        period: Period,

        /// Kind of AI report
        #[arg(short, long, value_enum, default_value_t = ReportType::DetailedFinancial)]
        report: ReportType,

        /// Skip the price forecast
        #[arg(long)]
        no_forecast: bool,

        /// Where chart files are written
        #[arg(short, long, default_value = "charts")]
        out_dir: PathBuf,

        /// Gemini model for the AI summary
        #[arg(long, env = "GEMINI_MODEL")]
        model: Option<String>,
    },

    /// Print the forecast table and summary
    Forecast {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// History period: 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max
        #[arg(short, long, default_value = "1y")]
        period: Period,

        /// Trading days to forecast
        #[arg(long, default_value_t = 15)]
        horizon: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG may come from the .env file, so load it before the subscriber.
    let env_file = load_dotenv(args.env_file.as_deref());

    init_tracing(
        "warn,stockcast=info",
        if args.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
    );

    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let builder = StockcastConfig::builder()
        .cache_dir(&args.cache_dir)
        .cache_ttl(cache_ttl(args.cache_ttl_hours))
        .with_env_api_key();

    match args.command {
        Command::Analyze {
            symbol,
            period,
            report,
            no_forecast,
            out_dir,
            model,
        } => {
            let builder = match model {
                Some(model) => builder.gemini_model(model),
                None => builder,
            };
            let config = builder.build()?;
            analyze(&config, symbol, period, report, !no_forecast, &out_dir).await
        }
        Command::Forecast {
            symbol,
            period,
            horizon,
        } => {
            let config = builder.forecast_horizon(horizon).build()?;
            forecast(&config, &symbol, period).await
        }
    }
}

fn cache_ttl(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

async fn analyze(
    config: &StockcastConfig,
    symbol: String,
    period: Period,
    report: ReportType,
    include_forecast: bool,
    out_dir: &std::path::Path,
) -> anyhow::Result<()> {
    let pipeline = AnalysisPipeline::from_config(config)?;
    let request = AnalysisRequest::new(symbol)
        .period(period)
        .report_type(report)
        .include_forecast(include_forecast);

    let report_type = request.report_type;
    let result = pipeline.run(&request).await;

    println!("## AI Analysis ({report_type})\n");
    println!("{}\n", result.summary);

    if include_forecast {
        println!("## Forecast Summary\n");
        println!("{}\n", result.forecast_summary);
    }

    let stem = result.symbol.to_lowercase();
    for (figure, suffix) in [
        (&result.price_chart, "price"),
        (&result.indicator_chart, "indicators"),
    ] {
        match figure {
            Some(figure) => write_chart(figure, out_dir, &format!("{stem}_{suffix}"))?,
            None => warn!("No {} chart for {}", suffix, result.symbol),
        }
    }

    Ok(())
}

fn write_chart(figure: &Figure, dir: &std::path::Path, stem: &str) -> anyhow::Result<()> {
    let (json, html) = figure
        .write(dir, stem)
        .with_context(|| format!("writing chart {stem} to {}", dir.display()))?;
    println!("Chart written: {} ({})", html.display(), json.display());
    Ok(())
}

async fn forecast(config: &StockcastConfig, symbol: &str, period: Period) -> anyhow::Result<()> {
    config.validate()?;
    let pipeline = AnalysisPipeline::new(
        DataProvider::yahoo(config.cache.clone()),
        Summarizer::new(None, &config.gemini_model, config.summary_max_tokens),
        config,
    );

    let (series, forecast) = match pipeline.forecast(symbol, period).await {
        Ok(result) => result,
        Err(e) => {
            warn!("No forecast for {}: {}", symbol, e);
            println!("{}", forecast_failure_message(&e));
            return Ok(());
        }
    };
    let Some(last) = series.last() else {
        return Ok(());
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Day", "Date", "Forecast", "Lower (95%)", "Upper (95%)"]);
    let dates = business_days_after(last.date, forecast.points.len());
    for (point, date) in forecast.points.iter().zip(dates) {
        table.add_row(vec![
            point.step.to_string(),
            date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", point.price),
            format!("{:.2}", point.interval.lower),
            format!("{:.2}", point.interval.upper),
        ]);
    }
    println!("{table}");
    println!(
        "Method: {:?}, annualized volatility {:.1}%\n",
        forecast.method,
        forecast.volatility * 100.0
    );

    println!("{}", forecast_text(&symbol.trim().to_uppercase(), &series, &forecast));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_ttl_hours() {
        assert_eq!(cache_ttl(24), Duration::from_secs(86_400));
        assert_eq!(cache_ttl(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_forecast_args() {
        let args = Args::try_parse_from(["stockcast", "forecast", "msft", "--horizon", "10"]).unwrap();
        match args.command {
            Command::Forecast {
                symbol,
                period,
                horizon,
            } => {
                assert_eq!(symbol, "msft");
                assert_eq!(period, Period::OneYear);
                assert_eq!(horizon, 10);
            }
            Command::Analyze { .. } => panic!("Expected forecast command"),
        }
    }
}
