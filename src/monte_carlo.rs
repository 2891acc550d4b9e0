//! Monte Carlo projection of a portfolio value under Geometric Brownian Motion
//! with a fixed monthly contribution.
//!
//! Each path is generated independently from the same generator; nothing is
//! carried between paths. Pass a seeded generator (or use
//! [`simulate_with_seed`] with `Some(seed)`) to get reproducible batches;
//! `None` falls back to the thread-local generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{EngineError, Result};

pub type PricePath = Vec<f64>;
pub type SimulationBatch = Vec<PricePath>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub initial_value: f64,
    pub monthly_contribution: f64,
    pub annual_rate_percent: f64,
    pub annual_volatility: f64,
    pub months: usize,
    pub simulation_count: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            initial_value: 10_000.0,
            monthly_contribution: 500.0,
            annual_rate_percent: 12.0,
            annual_volatility: 0.15,
            months: 120,
            simulation_count: 1000,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if self.simulation_count == 0 {
            return Err(EngineError::InvalidParameter(
                "simulation_count must be at least 1".into(),
            ));
        }
        if !self.annual_volatility.is_finite() || self.annual_volatility < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "annual_volatility must be a non-negative number, got {}",
                self.annual_volatility
            )));
        }
        for (name, value) in [
            ("initial_value", self.initial_value),
            ("monthly_contribution", self.monthly_contribution),
            ("annual_rate_percent", self.annual_rate_percent),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidParameter(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }

    /// Deterministic part of the monthly log return.
    pub fn monthly_drift(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0 - 0.5 * self.annual_volatility * self.annual_volatility
    }
}

/// One standard normal draw via Box-Muller. Uniform draws of exactly zero are
/// redrawn so `ln(u)` stays finite.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u = 0.0;
    while u == 0.0 {
        u = rng.gen::<f64>();
    }
    let mut v = 0.0;
    while v == 0.0 {
        v = rng.gen::<f64>();
    }
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

fn simulate_path<R: Rng + ?Sized>(params: &SimulationParams, drift: f64, rng: &mut R) -> PricePath {
    let mut path = Vec::with_capacity(params.months + 1);
    let mut value = params.initial_value;
    path.push(value);

    for _ in 1..=params.months {
        let shock = params.annual_volatility * standard_normal(&mut *rng);
        value = value * (drift + shock).exp() + params.monthly_contribution;
        path.push(value);
    }
    path
}

/// Simulate `simulation_count` independent paths of `months + 1` values each,
/// drawing all randomness from `rng`.
pub fn simulate_paths<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> Result<SimulationBatch> {
    params.validate()?;
    let drift = params.monthly_drift();

    log::debug!(
        "simulating {} paths over {} months (drift {:.6})",
        params.simulation_count,
        params.months,
        drift
    );

    Ok((0..params.simulation_count)
        .map(|_| simulate_path(params, drift, &mut *rng))
        .collect())
}

/// Simulate with a `StdRng` seeded from `seed`, or with the thread-local
/// generator when no seed is given.
pub fn simulate_with_seed(params: &SimulationParams, seed: Option<u64>) -> Result<SimulationBatch> {
    match seed {
        Some(s) => simulate_paths(params, &mut StdRng::seed_from_u64(s)),
        None => simulate_paths(params, &mut rand::thread_rng()),
    }
}

/// Distribution of terminal values across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub paths: usize,
    pub steps: usize,
    pub mean: f64,
    pub p10: f64,
    pub median: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
}

impl SimulationSummary {
    pub fn from_batch(batch: &[PricePath]) -> Result<Self> {
        let mut terminal: Vec<f64> = batch.iter().filter_map(|p| p.last().copied()).collect();
        if terminal.is_empty() {
            return Err(EngineError::InsufficientData("batch has no paths".into()));
        }
        terminal.sort_by(|a, b| a.total_cmp(b));

        let n = terminal.len();
        let pick = |q: f64| terminal[((n - 1) as f64 * q).round() as usize];

        Ok(SimulationSummary {
            paths: n,
            steps: batch.first().map(|p| p.len()).unwrap_or(0),
            mean: terminal.iter().sum::<f64>() / n as f64,
            p10: pick(0.1),
            median: pick(0.5),
            p90: pick(0.9),
            min: terminal[0],
            max: terminal[n - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams {
            initial_value: 1000.0,
            monthly_contribution: 100.0,
            annual_rate_percent: 8.0,
            annual_volatility: 0.2,
            months: 24,
            simulation_count: 50,
        }
    }

    #[test]
    fn batch_has_requested_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let batch = simulate_paths(&params(), &mut rng).unwrap();

        assert_eq!(batch.len(), 50);
        for path in &batch {
            assert_eq!(path.len(), 25);
            assert_eq!(path[0], 1000.0);
        }
    }

    #[test]
    fn zero_volatility_compounds_deterministically() {
        let p = SimulationParams {
            annual_volatility: 0.0,
            monthly_contribution: 0.0,
            simulation_count: 5,
            ..params()
        };
        let drift = p.monthly_drift();
        let batch = simulate_with_seed(&p, None).unwrap();

        for path in &batch {
            assert_eq!(path, &batch[0]);
            for (m, v) in path.iter().enumerate() {
                let expected = p.initial_value * (drift * m as f64).exp();
                assert!((v - expected).abs() < 1e-9 * expected, "month {}", m);
            }
        }
    }

    #[test]
    fn same_seed_same_batch() {
        let a = simulate_with_seed(&params(), Some(9)).unwrap();
        let b = simulate_with_seed(&params(), Some(9)).unwrap();
        let c = simulate_with_seed(&params(), Some(10)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unseeded_batches_differ() {
        let a = simulate_with_seed(&params(), None).unwrap();
        let b = simulate_with_seed(&params(), None).unwrap();
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
    }

    #[test]
    fn zero_months_gives_initial_value_only() {
        let p = SimulationParams { months: 0, ..params() };
        let batch = simulate_with_seed(&p, Some(1)).unwrap();
        assert!(batch.iter().all(|path| path == &vec![1000.0]));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let no_sims = SimulationParams { simulation_count: 0, ..params() };
        let neg_vol = SimulationParams { annual_volatility: -0.1, ..params() };
        let nan_start = SimulationParams { initial_value: f64::NAN, ..params() };
        for p in [no_sims, neg_vol, nan_start] {
            assert!(matches!(
                simulate_with_seed(&p, Some(1)),
                Err(EngineError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn normal_draws_have_unit_moments() {
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }

    #[test]
    fn zero_uniform_draw_is_redrawn() {
        use rand::rngs::mock::StepRng;

        // Yields 0.0, then 2^-53, then 2^-52 as f64 draws
        let mut rng = StepRng::new(0, 1 << 11);
        let z = standard_normal(&mut rng);

        let u = 2f64.powi(-53);
        let v = 2f64.powi(-52);
        let expected = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
        assert!(z.is_finite());
        assert!((z - expected).abs() < 1e-12, "{} != {}", z, expected);
    }

    #[test]
    fn summary_orders_percentiles() {
        let batch = simulate_with_seed(&params(), Some(3)).unwrap();
        let s = SimulationSummary::from_batch(&batch).unwrap();
        assert_eq!(s.paths, 50);
        assert_eq!(s.steps, 25);
        assert!(s.min <= s.p10 && s.p10 <= s.median && s.median <= s.p90 && s.p90 <= s.max);
        assert!(SimulationSummary::from_batch(&[]).is_err());
    }
}
