//! Display tiers for risk levels, probabilities and grades.
//!
//! Presentation only: nothing here feeds back into the server-assigned
//! `risk_level`.

use crate::models::{RiskFilter, RiskLevel};

/// Colour band used to tint a value on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Danger,
    Warning,
    Ok,
}

impl Tone {
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Danger => "#ef4444",
            Tone::Warning => "#eab308",
            Tone::Ok => "#22c55e",
        }
    }
}

pub fn prediction_badge(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "RIESGO ALTO",
        RiskLevel::Medium => "RIESGO MODERADO",
        _ => "RIESGO BAJO",
    }
}

pub fn list_badge(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "Alto Riesgo",
        RiskLevel::Medium => "Riesgo Moderado",
        _ => "Bajo Riesgo",
    }
}

pub fn badge_tone(level: RiskLevel) -> Tone {
    match level {
        RiskLevel::High => Tone::Danger,
        RiskLevel::Medium => Tone::Warning,
        _ => Tone::Ok,
    }
}

pub fn filter_label(filter: RiskFilter) -> &'static str {
    match filter {
        RiskFilter::All => "Todos",
        RiskFilter::Low => "Bajo",
        RiskFilter::Medium => "Medio",
        RiskFilter::High => "Alto",
    }
}

pub fn probability_tone(probability: f64) -> Tone {
    if probability >= 70.0 {
        Tone::Danger
    } else if probability >= 40.0 {
        Tone::Warning
    } else {
        Tone::Ok
    }
}

pub fn cgpa_tone(cgpa: f64) -> Tone {
    if cgpa >= 7.0 {
        Tone::Ok
    } else if cgpa >= 5.0 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

pub fn gauge_value(probability: f64) -> u8 {
    if probability.is_nan() {
        return 0;
    }
    probability.round().clamp(0.0, 100.0) as u8
}

pub fn gender_initial(gender: &str) -> &'static str {
    if gender == "Male" {
        "M"
    } else {
        "F"
    }
}
