//! In-memory backend and fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::Gateway;
use crate::error::{GatewayError, Operation};
use crate::models::{
    AlertRecord, AnalyticsResponse, CohortStats, ContributingFactor, DatasetColumns,
    HealthStatus, PredictionResult, RiskByDegree, RiskDistribution, RiskLevel, StudentInput,
    StudentRecord, StudentsQuery, StudentsResponse, PAGE_SIZE,
};

/// Replays scripted responses and records what it was asked. Clones share
/// the same script and call log.
#[derive(Clone, Default)]
pub struct FakeGateway {
    predictions: Arc<Mutex<VecDeque<Result<PredictionResult, GatewayError>>>>,
    pages: Arc<Mutex<VecDeque<Result<StudentsResponse, GatewayError>>>>,
    analytics: Arc<Mutex<Option<Result<AnalyticsResponse, GatewayError>>>>,
    columns: Arc<Mutex<Option<Result<DatasetColumns, GatewayError>>>>,
    predict_calls: Arc<Mutex<Vec<StudentInput>>>,
    list_calls: Arc<Mutex<Vec<StudentsQuery>>>,
}

impl FakeGateway {
    pub fn push_prediction(&self, result: Result<PredictionResult, GatewayError>) {
        self.predictions.lock().unwrap().push_back(result);
    }

    pub fn push_page(&self, result: Result<StudentsResponse, GatewayError>) {
        self.pages.lock().unwrap().push_back(result);
    }

    pub fn set_analytics(&self, result: Result<AnalyticsResponse, GatewayError>) {
        *self.analytics.lock().unwrap() = Some(result);
    }

    pub fn set_columns(&self, result: Result<DatasetColumns, GatewayError>) {
        *self.columns.lock().unwrap() = Some(result);
    }

    pub fn predict_calls(&self) -> Vec<StudentInput> {
        self.predict_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<StudentsQuery> {
        self.list_calls.lock().unwrap().clone()
    }
}

fn unscripted(operation: Operation) -> GatewayError {
    GatewayError::RequestFailed {
        operation,
        status: 503,
        message: "no scripted response".to_string(),
    }
}

#[async_trait::async_trait]
impl Gateway for FakeGateway {
    async fn predict(&self, input: &StudentInput) -> Result<PredictionResult, GatewayError> {
        self.predict_calls.lock().unwrap().push(input.clone());
        self.predictions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted(Operation::Predict)))
    }

    async fn list_students(
        &self,
        query: &StudentsQuery,
    ) -> Result<StudentsResponse, GatewayError> {
        self.list_calls.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted(Operation::ListStudents)))
    }

    async fn analytics(&self) -> Result<AnalyticsResponse, GatewayError> {
        self.analytics
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(unscripted(Operation::Analytics)))
    }

    async fn dataset_columns(&self) -> Result<DatasetColumns, GatewayError> {
        self.columns
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(unscripted(Operation::DatasetColumns)))
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::unavailable("no scripted response")
    }
}

pub fn failure(operation: Operation, message: &str) -> GatewayError {
    GatewayError::RequestFailed {
        operation,
        status: 500,
        message: message.to_string(),
    }
}

pub fn sample_record(id: &str, risk_level: RiskLevel) -> StudentRecord {
    let (probability, risk_label) = match risk_level {
        RiskLevel::High => (82.0, "RIESGO ALTO"),
        RiskLevel::Medium => (55.5, "RIESGO MODERADO"),
        _ => (12.3, "RIESGO BAJO"),
    };

    StudentRecord {
        id: id.to_string(),
        gender: "Female".to_string(),
        age: 21.0,
        city: "Pune".to_string(),
        profession: "Student".to_string(),
        degree: "B.Tech".to_string(),
        cgpa: 7.25,
        sleep_duration: "5-6 hours".to_string(),
        academic_pressure: 4.0,
        financial_stress: 3.0,
        dietary_habits: "Moderate".to_string(),
        family_history: "No".to_string(),
        work_study_hours: 6.0,
        probability,
        risk_level,
        risk_label: risk_label.to_string(),
        depression_actual: u8::from(risk_level == RiskLevel::High),
    }
}

/// A page whose counters are derived from the records it carries.
pub fn sample_page(page: u32, total_pages: u32, students: Vec<StudentRecord>) -> StudentsResponse {
    let count = |level: RiskLevel| students.iter().filter(|s| s.risk_level == level).count() as u64;
    let stats = CohortStats {
        total: students.len() as u64,
        high_risk: count(RiskLevel::High),
        medium_risk: count(RiskLevel::Medium),
        low_risk: count(RiskLevel::Low),
    };

    StudentsResponse {
        students,
        stats,
        page,
        page_size: PAGE_SIZE,
        total_pages,
    }
}

pub fn sample_analytics() -> AnalyticsResponse {
    AnalyticsResponse {
        total_students: 200,
        avg_probability: 58.3,
        risk_distribution: RiskDistribution {
            low: 70,
            medium: 50,
            high: 80,
        },
        risk_by_degree: vec![RiskByDegree {
            degree: "B.Tech".to_string(),
            low: 10,
            medium: 5,
            high: 25,
            total: 40,
            high_pct: 62.5,
        }],
        contributing_factors: [
            "Presión Académica Alta",
            "Estrés Financiero Alto",
            "Sueño Insuficiente",
            "CGPA Bajo",
            "Otro",
        ]
            .iter()
            .enumerate()
            .map(|(i, name)| ContributingFactor {
                name: name.to_string(),
                value: 100 - i as u64 * 10,
                pct: 50.0 - i as f64 * 5.0,
            })
            .collect(),
        risk_by_pressure: vec![],
        risk_by_sleep: vec![],
        recent_alerts: vec![AlertRecord {
            id: "140".to_string(),
            degree: "MSc".to_string(),
            probability: 99.1,
            risk_level: RiskLevel::High,
            main_factor: "Alta presión académica".to_string(),
        }],
    }
}
