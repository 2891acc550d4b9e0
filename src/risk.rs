use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inputs to the risk classifier. Growth and drawdown are fractions, not percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub growth_rate: f64,
    pub duration_years: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Conservative,
    Moderate,
    Growth,
    Aggressive,
}

impl RiskCategory {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            RiskCategory::Aggressive
        } else if score > 0.5 {
            RiskCategory::Growth
        } else if score > 0.3 {
            RiskCategory::Moderate
        } else {
            RiskCategory::Conservative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Conservative => "Conservative",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::Growth => "Growth",
            RiskCategory::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded composite risk score. Every term saturates, so extreme inputs
/// cannot push the score past the top band by an unbounded amount.
pub fn risk_score(inputs: &RiskInputs) -> f64 {
    0.4 * (3.0 * inputs.growth_rate).tanh()
        + 0.3 * (1.0 - (-2.0 * inputs.volatility).exp())
        + 0.2 * (1.0 - (-5.0 * inputs.max_drawdown).exp())
        + 0.1 * (inputs.duration_years / 30.0)
}

pub fn classify_risk(inputs: &RiskInputs) -> RiskCategory {
    let score = risk_score(inputs);
    let category = RiskCategory::from_score(score);
    log::debug!("risk score {:.4} -> {}", score, category);
    category
}

/// Market risk factors shown next to the calculator result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFactors {
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe: f64,
}

impl RiskFactors {
    /// Draw plausible factors: volatility in [0.2, 1.0), drawdown in [0, 0.4),
    /// Sharpe in [0, 1.5).
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        RiskFactors {
            volatility: rng.gen::<f64>() * 0.8 + 0.2,
            max_drawdown: rng.gen::<f64>() * 0.4,
            sharpe: rng.gen::<f64>() * 1.5,
        }
    }
}

impl RiskInputs {
    pub fn from_factors(growth_rate: f64, duration_years: f64, factors: &RiskFactors) -> Self {
        RiskInputs {
            growth_rate,
            duration_years,
            volatility: factors.volatility,
            max_drawdown: factors.max_drawdown,
        }
    }
}
