//! Quantitative analytics behind the StockTrack portfolio dashboard.
//!
//! Every routine here is a plain function of its inputs: portfolio rows in,
//! labels, scores, rankings or simulated paths out. Nothing is cached between
//! calls; the only randomness comes from the generator the caller passes in.
//!
//! # Modules
//!
//! - `vector_math`: normalization, cosine similarity, drawdown
//! - `anomaly`: per-holding anomaly labels
//! - `risk`: risk category from growth, volatility, drawdown and horizon
//! - `search`: embedding similarity search over a stock catalog
//! - `session`: market session state from the clock and a holiday calendar
//! - `monte_carlo`: GBM projections with monthly contributions
//! - `forecast`: normalized-series forecasting around a pluggable model
//! - `catalog`, `config`: loading of catalogs, holdings and settings
//!
//! # Example
//!
//! ```
//! use stocktrack_quant::monte_carlo::{simulate_with_seed, SimulationParams};
//! use stocktrack_quant::risk::{classify_risk, RiskCategory, RiskInputs};
//!
//! let category = classify_risk(&RiskInputs {
//!     growth_rate: 0.0,
//!     duration_years: 0.0,
//!     volatility: 0.0,
//!     max_drawdown: 0.0,
//! });
//! assert_eq!(category, RiskCategory::Conservative);
//!
//! let params = SimulationParams { months: 12, simulation_count: 10, ..Default::default() };
//! let paths = simulate_with_seed(&params, Some(42)).unwrap();
//! assert_eq!(paths.len(), 10);
//! assert!(paths.iter().all(|p| p.len() == 13));
//! ```

pub mod anomaly;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forecast;
pub mod monte_carlo;
pub mod risk;
pub mod search;
pub mod session;
pub mod vector_math;

pub use anomaly::{detect_portfolio_anomalies, AnomalyLabel, HoldingSnapshot};
pub use error::{EngineError, Result};
pub use monte_carlo::{simulate_paths, simulate_with_seed, SimulationBatch, SimulationParams};
pub use risk::{classify_risk, RiskCategory, RiskInputs};
pub use search::{rank_by_similarity, CatalogEntry, RankedResult};
pub use session::{classify_session, HolidayCalendar, MarketSessionState, SessionStatus};
