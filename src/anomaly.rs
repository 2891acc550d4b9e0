use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// Composite score weights
const PNL_WEIGHT: f64 = 0.3;
const VOLUME_WEIGHT: f64 = 0.2;
const ALLOCATION_WEIGHT: f64 = 0.3;
const VOLATILITY_WEIGHT: f64 = 0.2;

// A position above this share of the portfolio (percent) counts as concentrated
const ALLOCATION_LIMIT: f64 = 30.0;
// Annualized volatility above which a holding counts as unstable
const VOLATILITY_LIMIT: f64 = 0.4;

const HIGH_THRESHOLD: f64 = 0.65;
const MEDIUM_THRESHOLD: f64 = 0.45;

/// One portfolio position at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub current_price: f64,
    pub avg_cost: f64,
    pub volume: f64,
    pub avg_volume: f64,
    #[serde(alias = "allocation")]
    pub allocation_percent: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyLabel {
    Low,
    Medium,
    High,
}

impl AnomalyLabel {
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_THRESHOLD {
            AnomalyLabel::High
        } else if score > MEDIUM_THRESHOLD {
            AnomalyLabel::Medium
        } else {
            AnomalyLabel::Low
        }
    }
}

/// Engineered features for a single holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoldingFeatures {
    pub pnl_ratio: f64,
    pub volume_ratio: f64,
    pub allocation: f64,
    pub volatility: f64,
}

impl HoldingFeatures {
    /// `index` is only used to point at the offending holding on failure.
    pub fn from_snapshot(holding: &HoldingSnapshot, index: usize) -> Result<Self> {
        if holding.avg_cost == 0.0 {
            return Err(EngineError::DivisionByZero { field: "avg_cost", index });
        }
        if holding.avg_volume == 0.0 {
            return Err(EngineError::DivisionByZero { field: "avg_volume", index });
        }

        Ok(HoldingFeatures {
            pnl_ratio: (holding.current_price - holding.avg_cost) / holding.avg_cost,
            volume_ratio: holding.volume / holding.avg_volume,
            allocation: holding.allocation_percent,
            volatility: holding.volatility,
        })
    }

    pub fn score(&self) -> f64 {
        let concentrated = if self.allocation > ALLOCATION_LIMIT { 1.0 } else { 0.0 };
        let unstable = if self.volatility > VOLATILITY_LIMIT { 1.0 } else { 0.0 };

        PNL_WEIGHT * self.pnl_ratio.abs()
            + VOLUME_WEIGHT * (1.0 - self.volume_ratio).abs()
            + ALLOCATION_WEIGHT * concentrated
            + VOLATILITY_WEIGHT * unstable
    }
}

/// Composite anomaly score of a single holding. `index` is the holding's
/// position in its portfolio and is only used in error reports.
pub fn anomaly_score(holding: &HoldingSnapshot, index: usize) -> Result<f64> {
    HoldingFeatures::from_snapshot(holding, index).map(|f| f.score())
}

/// Label every holding; the output is index-aligned with `portfolio`.
pub fn detect_portfolio_anomalies(portfolio: &[HoldingSnapshot]) -> Result<Vec<AnomalyLabel>> {
    let labels = portfolio
        .iter()
        .enumerate()
        .map(|(i, h)| HoldingFeatures::from_snapshot(h, i).map(|f| AnomalyLabel::from_score(f.score())))
        .collect::<Result<Vec<_>>>()?;

    let flagged = labels.iter().filter(|l| **l != AnomalyLabel::Low).count();
    if flagged > 0 {
        log::info!("{} of {} holdings flagged as anomalous", flagged, labels.len());
    }

    Ok(labels)
}
