//! Chart-ready views over one analytics payload.
//!
//! Pure transforms: nothing here performs I/O or mutates the payload.

use crate::client::Gateway;
use crate::error::GatewayError;
use crate::models::{AnalyticsResponse, ContributingFactor, RiskByDegree};

/// Colours cycled over the ranked contributing factors.
pub const FACTOR_PALETTE: [&str; 4] = ["#ef4444", "#f97316", "#eab308", "#3b82f6"];

/// Share of `count` in `total` as a percentage with one decimal.
///
/// An empty cohort yields 0 rather than NaN.
pub fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorSlice {
    pub name: String,
    pub value: u64,
    pub pct: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSlice {
    pub label: &'static str,
    pub count: u64,
    pub pct: f64,
    pub color: &'static str,
}

pub fn factor_slices(factors: &[ContributingFactor]) -> Vec<FactorSlice> {
    factors
        .iter()
        .enumerate()
        .map(|(i, f)| FactorSlice {
            name: f.name.clone(),
            value: f.value,
            pct: f.pct,
            color: FACTOR_PALETTE[i % FACTOR_PALETTE.len()],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsView {
    pub total_students: u64,
    pub avg_probability: f64,
    pub high_pct: f64,
    pub medium_pct: f64,
    pub low_pct: f64,
    pub distribution: Vec<DistributionSlice>,
    pub factors: Vec<FactorSlice>,
    pub response: AnalyticsResponse,
}

impl AnalyticsView {
    pub fn new(response: AnalyticsResponse) -> Self {
        let total = response.total_students;
        let dist = response.risk_distribution;

        let distribution = vec![
            DistributionSlice {
                label: "Bajo",
                count: dist.low,
                pct: percent_of(dist.low, total),
                color: "#22c55e",
            },
            DistributionSlice {
                label: "Moderado",
                count: dist.medium,
                pct: percent_of(dist.medium, total),
                color: "#eab308",
            },
            DistributionSlice {
                label: "Alto",
                count: dist.high,
                pct: percent_of(dist.high, total),
                color: "#ef4444",
            },
        ];

        Self {
            total_students: total,
            avg_probability: response.avg_probability,
            high_pct: percent_of(dist.high, total),
            medium_pct: percent_of(dist.medium, total),
            low_pct: percent_of(dist.low, total),
            distribution,
            factors: factor_slices(&response.contributing_factors),
            response,
        }
    }

    /// Degree rows in the order the server ranked them.
    pub fn degrees(&self) -> &[RiskByDegree] {
        &self.response.risk_by_degree
    }

    pub fn has_factors(&self) -> bool {
        !self.factors.is_empty()
    }
}

pub async fn load<G: Gateway + ?Sized>(gateway: &G) -> Result<AnalyticsView, GatewayError> {
    let response = gateway.analytics().await?;
    Ok(AnalyticsView::new(response))
}
