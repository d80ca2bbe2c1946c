use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: u32 = 30;

// Carried as the backend reported it, never derived from a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl RiskFilter {
    pub const ALL: [RiskFilter; 4] = [
        RiskFilter::All,
        RiskFilter::Low,
        RiskFilter::Medium,
        RiskFilter::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFilter::All => "all",
            RiskFilter::Low => "low",
            RiskFilter::Medium => "medium",
            RiskFilter::High => "high",
        }
    }
}

impl fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown risk filter `{0}` (expected all, low, medium or high)")]
pub struct ParseRiskFilterError(String);

impl FromStr for RiskFilter {
    type Err = ParseRiskFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RiskFilter::All),
            "low" => Ok(RiskFilter::Low),
            "medium" => Ok(RiskFilter::Medium),
            "high" => Ok(RiskFilter::High),
            _ => Err(ParseRiskFilterError(value.to_string())),
        }
    }
}

/// Everything the model needs to score one student.
///
/// Field names on the wire are the dataset's column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInput {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: u8,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Profession")]
    pub profession: String,
    #[serde(rename = "Academic Pressure")]
    pub academic_pressure: u8,
    #[serde(rename = "Work Pressure")]
    pub work_pressure: u8,
    #[serde(rename = "CGPA")]
    pub cgpa: f64,
    #[serde(rename = "Study Satisfaction")]
    pub study_satisfaction: u8,
    #[serde(rename = "Job Satisfaction")]
    pub job_satisfaction: u8,
    #[serde(rename = "Sleep Duration")]
    pub sleep_duration: String,
    #[serde(rename = "Dietary Habits")]
    pub dietary_habits: String,
    #[serde(rename = "Degree")]
    pub degree: String,
    #[serde(rename = "Work/Study Hours")]
    pub work_study_hours: u8,
    /// The backend declares this one ordinal as a string column.
    #[serde(rename = "Financial Stress", with = "ordinal_text")]
    pub financial_stress: u8,
    #[serde(rename = "Family History of Mental Illness")]
    pub family_history: String,
    #[serde(rename = "Have you ever had suicidal thoughts ?")]
    pub suicidal_thoughts: String,
}

/// Serializes an ordinal as its decimal text, accepting either text or a
/// number when reading.
mod ordinal_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Percentage of the positive class, 0 to 100.
    pub probability: f64,
    pub prediction: u8,
    pub risk_level: RiskLevel,
    pub risk_label: String,
    #[serde(default)]
    pub contributing_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub gender: String,
    pub age: f64,
    pub city: String,
    pub profession: String,
    pub degree: String,
    pub cgpa: f64,
    pub sleep_duration: String,
    pub academic_pressure: f64,
    pub financial_stress: f64,
    pub dietary_habits: String,
    pub family_history: String,
    pub work_study_hours: f64,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub risk_label: String,
    /// Ground-truth label from the dataset. Reference only.
    pub depression_actual: u8,
}

/// Counters over the whole filtered cohort, not just the current page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortStats {
    pub total: u64,
    pub high_risk: u64,
    pub medium_risk: u64,
    pub low_risk: u64,
}

impl CohortStats {
    pub fn is_consistent(&self) -> bool {
        self.high_risk + self.medium_risk + self.low_risk == self.total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentsResponse {
    pub students: Vec<StudentRecord>,
    pub stats: CohortStats,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Query parameters for `/students`. Unset fields are left off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentsQuery {
    pub search: Option<String>,
    pub risk_filter: Option<RiskFilter>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl StudentsQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(filter) = self.risk_filter {
            pairs.push(("risk_filter", filter.as_str().to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size.filter(|p| *p > 0) {
            pairs.push(("page_size", page_size.to_string()));
        }

        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskByDegree {
    pub degree: String,
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub total: u64,
    pub high_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub name: String,
    pub value: u64,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskByPressure {
    pub pressure: u8,
    pub depression_rate: f64,
    pub avg_probability: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBySleep {
    pub sleep_duration: String,
    pub depression_rate: f64,
    pub avg_probability: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub degree: String,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub main_factor: String,
}

/// Cohort-level aggregates. Percentages arrive already rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub total_students: u64,
    pub avg_probability: f64,
    pub risk_distribution: RiskDistribution,
    #[serde(default)]
    pub risk_by_degree: Vec<RiskByDegree>,
    #[serde(default)]
    pub contributing_factors: Vec<ContributingFactor>,
    #[serde(default)]
    pub risk_by_pressure: Vec<RiskByPressure>,
    #[serde(default)]
    pub risk_by_sleep: Vec<RiskBySleep>,
    #[serde(default)]
    pub recent_alerts: Vec<AlertRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetColumns {
    pub cities: Vec<String>,
    pub professions: Vec<String>,
    pub degrees: Vec<String>,
    pub sleep_durations: Vec<String>,
    pub dietary_habits: Vec<String>,
    pub genders: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for DatasetColumns {
    /// Built-in options used when the backend cannot provide them.
    /// City is free text in the form, so no fixed list is offered.
    fn default() -> Self {
        Self {
            cities: Vec::new(),
            professions: owned(&["Student"]),
            degrees: owned(&[
                "BSc", "BA", "B.Pharm", "BCA", "B.Tech", "B.Com", "B.Ed", "BBA", "LLB", "B.Arch",
                "MBBS", "MCA", "MSc", "M.Tech", "MBA", "MD", "PhD",
            ]),
            sleep_durations: owned(&[
                "Less than 5 hours",
                "5-6 hours",
                "7-8 hours",
                "More than 8 hours",
            ]),
            dietary_habits: owned(&["Healthy", "Moderate", "Unhealthy"]),
            genders: owned(&["Male", "Female"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            status: "unavailable".to_string(),
            model_loaded: false,
            detail: Some(detail.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.model_loaded
    }
}
