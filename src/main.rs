use chrono::{NaiveDate, NaiveTime, Timelike};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;

use stocktrack_quant::anomaly::detect_portfolio_anomalies;
use stocktrack_quant::catalog::{load_catalog, load_holdings, validate_catalog};
use stocktrack_quant::config::EngineConfig;
use stocktrack_quant::forecast::{forecast_series, label_monthly, TrendExtrapolation};
use stocktrack_quant::monte_carlo::{simulate_with_seed, SimulationSummary};
use stocktrack_quant::risk::{classify_risk, risk_score, RiskFactors, RiskInputs};
use stocktrack_quant::search::search_text;
use stocktrack_quant::session::{classify_now, classify_session};

#[derive(Parser)]
#[command(name = "stocktrack", version, about = "Portfolio analytics from the command line")]
struct Cli {
    /// JSON settings file (holidays, search and simulation defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Market session state, for now or for a given date and time
    Session {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Local time as HH:MM
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
    },
    /// Label every holding of a portfolio file
    Anomalies {
        #[arg(long)]
        portfolio: PathBuf,
    },
    /// Risk category for an investment plan; missing factors are sampled
    Risk {
        #[arg(long)]
        growth: f64,
        #[arg(long)]
        years: f64,
        #[arg(long)]
        volatility: Option<f64>,
        #[arg(long)]
        drawdown: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Search an embedding catalog (file path or URL)
    Search {
        #[arg(long)]
        catalog: String,
        #[arg(long)]
        top_k: Option<usize>,
        query: String,
    },
    /// Monte Carlo projection; unset parameters come from the config
    Simulate {
        #[arg(long)]
        initial: Option<f64>,
        #[arg(long)]
        monthly: Option<f64>,
        #[arg(long)]
        rate: Option<f64>,
        #[arg(long)]
        volatility: Option<f64>,
        #[arg(long)]
        months: Option<usize>,
        #[arg(long)]
        sims: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Print every path, not only the summary
        #[arg(long)]
        paths: bool,
    },
    /// Extend a value series with the trend model
    Forecast {
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
        #[arg(long, default_value_t = 6)]
        horizon: usize,
        #[arg(long, default_value_t = 3)]
        lookback: usize,
        /// Month of the first forecast point
        #[arg(long)]
        start: Option<NaiveDate>,
    },
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Session { date, time } => {
            let state = match (date, time) {
                (None, None) => classify_now(&config.holidays),
                (date, time) => {
                    let now = chrono::Local::now().naive_local();
                    let date = date.unwrap_or(now.date());
                    let time = time.unwrap_or(now.time());
                    classify_session(date, time.hour(), time.minute(), &config.holidays)
                }
            };
            print_json(&state)?;
        }

        Command::Anomalies { portfolio } => {
            let holdings = load_holdings(&portfolio)?;
            let labels = detect_portfolio_anomalies(&holdings)?;
            let rows: Vec<_> = holdings
                .iter()
                .zip(&labels)
                .map(|(h, label)| json!({ "symbol": h.symbol, "anomaly": label }))
                .collect();
            print_json(&rows)?;
        }

        Command::Risk { growth, years, volatility, drawdown, seed } => {
            let mut factors = match seed {
                Some(s) => RiskFactors::sample(&mut StdRng::seed_from_u64(s)),
                None => RiskFactors::sample(&mut rand::thread_rng()),
            };
            if let Some(v) = volatility {
                factors.volatility = v;
            }
            if let Some(d) = drawdown {
                factors.max_drawdown = d;
            }

            let inputs = RiskInputs::from_factors(growth, years, &factors);
            print_json(&json!({
                "category": classify_risk(&inputs).as_str(),
                "score": risk_score(&inputs),
                "factors": factors,
            }))?;
        }

        Command::Search { catalog, top_k, query } => {
            let entries = load_catalog(&catalog).await?;
            let dim = validate_catalog(&entries)?;
            if dim != config.search.embedding_dim {
                log::warn!(
                    "catalog dimension {} differs from configured query dimension {}",
                    dim,
                    config.search.embedding_dim
                );
            }
            let top_k = top_k.unwrap_or(config.search.top_k);
            let results = search_text(&query, &entries, top_k, dim)?;
            print_json(&results)?;
        }

        Command::Simulate { initial, monthly, rate, volatility, months, sims, seed, paths } => {
            let mut params = config.simulation;
            params.initial_value = initial.unwrap_or(params.initial_value);
            params.monthly_contribution = monthly.unwrap_or(params.monthly_contribution);
            params.annual_rate_percent = rate.unwrap_or(params.annual_rate_percent);
            params.annual_volatility = volatility.unwrap_or(params.annual_volatility);
            params.months = months.unwrap_or(params.months);
            params.simulation_count = sims.unwrap_or(params.simulation_count);

            let batch = simulate_with_seed(&params, seed)?;
            let summary = SimulationSummary::from_batch(&batch)?;
            if paths {
                print_json(&json!({ "summary": summary, "paths": batch }))?;
            } else {
                print_json(&summary)?;
            }
        }

        Command::Forecast { values, horizon, lookback, start } => {
            let model = TrendExtrapolation::new(horizon, lookback);
            let predicted = forecast_series(&values, &model)?;
            match start {
                Some(start) => {
                    let labelled: Vec<_> = label_monthly(start, &predicted)
                        .into_iter()
                        .map(|(date, value)| json!({ "x": date, "y": value }))
                        .collect();
                    print_json(&labelled)?;
                }
                None => print_json(&predicted)?,
            }
        }
    }

    Ok(())
}
