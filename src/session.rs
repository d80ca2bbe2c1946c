//! The prediction form and the single in-flight scoring request behind it.

use std::ops::RangeInclusive;

use crate::client::Gateway;
use crate::error::GatewayError;
use crate::models::{PredictionResult, StudentInput};
use crate::risk;

pub const AGE_RANGE: RangeInclusive<u8> = 17..=40;
pub const CGPA_RANGE: RangeInclusive<f64> = 0.0..=10.0;
/// Academic pressure, financial stress, study satisfaction.
pub const ORDINAL_RANGE: RangeInclusive<u8> = 1..=5;
/// Work pressure and job satisfaction; 0 means "not working".
pub const WORK_ORDINAL_RANGE: RangeInclusive<u8> = 0..=5;
pub const HOURS_RANGE: RangeInclusive<u8> = 0..=12;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be Yes or No, got `{value}`")]
    NotYesNo { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEdit {
    Gender(String),
    Age(u8),
    City(String),
    Profession(String),
    AcademicPressure(u8),
    WorkPressure(u8),
    Cgpa(f64),
    StudySatisfaction(u8),
    JobSatisfaction(u8),
    SleepDuration(String),
    DietaryHabits(String),
    Degree(String),
    WorkStudyHours(u8),
    FinancialStress(u8),
    FamilyHistory(String),
    SuicidalThoughts(String),
}

fn check_range(field: &'static str, value: u8, range: &RangeInclusive<u8>) -> Result<u8, FormError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(FormError::OutOfRange {
            field,
            value: value.to_string(),
            min: range.start().to_string(),
            max: range.end().to_string(),
        })
    }
}

fn check_cgpa(value: f64) -> Result<f64, FormError> {
    if CGPA_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(FormError::OutOfRange {
            field: "CGPA",
            value: value.to_string(),
            min: CGPA_RANGE.start().to_string(),
            max: CGPA_RANGE.end().to_string(),
        })
    }
}

fn check_text(field: &'static str, value: String) -> Result<String, FormError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        Err(FormError::Empty { field })
    } else {
        Ok(value)
    }
}

fn check_yes_no(field: &'static str, value: String) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed == "Yes" || trimmed == "No" {
        return Ok(trimmed.to_string());
    }
    Err(FormError::NotYesNo { field, value })
}

/// Editable student profile. Every mutation is validated, so the draft is
/// always a well-formed [`StudentInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct StudentForm {
    draft: StudentInput,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self {
            draft: StudentInput {
                gender: "Male".to_string(),
                age: 22,
                city: "Bangalore".to_string(),
                profession: "Student".to_string(),
                academic_pressure: 3,
                work_pressure: 0,
                cgpa: 5.0,
                study_satisfaction: 3,
                job_satisfaction: 0,
                sleep_duration: "7-8 hours".to_string(),
                dietary_habits: "Moderate".to_string(),
                degree: "BSc".to_string(),
                work_study_hours: 5,
                financial_stress: 2,
                family_history: "No".to_string(),
                suicidal_thoughts: "No".to_string(),
            },
        }
    }
}

impl StudentForm {
    /// Build a form from a complete profile, validating every field.
    pub fn from_input(input: StudentInput) -> Result<Self, FormError> {
        let mut form = Self::default();
        let edits = [
            FormEdit::Gender(input.gender),
            FormEdit::Age(input.age),
            FormEdit::City(input.city),
            FormEdit::Profession(input.profession),
            FormEdit::AcademicPressure(input.academic_pressure),
            FormEdit::WorkPressure(input.work_pressure),
            FormEdit::Cgpa(input.cgpa),
            FormEdit::StudySatisfaction(input.study_satisfaction),
            FormEdit::JobSatisfaction(input.job_satisfaction),
            FormEdit::SleepDuration(input.sleep_duration),
            FormEdit::DietaryHabits(input.dietary_habits),
            FormEdit::Degree(input.degree),
            FormEdit::WorkStudyHours(input.work_study_hours),
            FormEdit::FinancialStress(input.financial_stress),
            FormEdit::FamilyHistory(input.family_history),
            FormEdit::SuicidalThoughts(input.suicidal_thoughts),
        ];
        for edit in edits {
            form.apply(edit)?;
        }
        Ok(form)
    }

    pub fn draft(&self) -> &StudentInput {
        &self.draft
    }

    /// Apply one edit. A rejected edit leaves the draft unchanged.
    pub fn apply(&mut self, edit: FormEdit) -> Result<(), FormError> {
        let d = &mut self.draft;
        match edit {
            FormEdit::Gender(v) => d.gender = check_text("Gender", v)?,
            FormEdit::Age(v) => d.age = check_range("Age", v, &AGE_RANGE)?,
            FormEdit::City(v) => d.city = check_text("City", v)?,
            FormEdit::Profession(v) => d.profession = check_text("Profession", v)?,
            FormEdit::AcademicPressure(v) => {
                d.academic_pressure = check_range("Academic Pressure", v, &ORDINAL_RANGE)?
            }
            FormEdit::WorkPressure(v) => {
                d.work_pressure = check_range("Work Pressure", v, &WORK_ORDINAL_RANGE)?
            }
            FormEdit::Cgpa(v) => d.cgpa = check_cgpa(v)?,
            FormEdit::StudySatisfaction(v) => {
                d.study_satisfaction = check_range("Study Satisfaction", v, &ORDINAL_RANGE)?
            }
            FormEdit::JobSatisfaction(v) => {
                d.job_satisfaction = check_range("Job Satisfaction", v, &WORK_ORDINAL_RANGE)?
            }
            FormEdit::SleepDuration(v) => d.sleep_duration = check_text("Sleep Duration", v)?,
            FormEdit::DietaryHabits(v) => d.dietary_habits = check_text("Dietary Habits", v)?,
            FormEdit::Degree(v) => d.degree = check_text("Degree", v)?,
            FormEdit::WorkStudyHours(v) => {
                d.work_study_hours = check_range("Work/Study Hours", v, &HOURS_RANGE)?
            }
            FormEdit::FinancialStress(v) => {
                d.financial_stress = check_range("Financial Stress", v, &ORDINAL_RANGE)?
            }
            FormEdit::FamilyHistory(v) => {
                d.family_history = check_yes_no("Family History of Mental Illness", v)?
            }
            FormEdit::SuicidalThoughts(v) => {
                d.suicidal_thoughts = check_yes_no("Have you ever had suicidal thoughts ?", v)?
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a prediction is already in progress")]
    Busy,

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PredictionSession {
    form: StudentForm,
    state: SessionState,
    result: Option<PredictionResult>,
    results_visible: bool,
    error: Option<String>,
}

impl Default for PredictionSession {
    fn default() -> Self {
        Self::new(StudentForm::default())
    }
}

impl PredictionSession {
    pub fn new(form: StudentForm) -> Self {
        Self {
            form,
            state: SessionState::Idle,
            result: None,
            results_visible: false,
            error: None,
        }
    }

    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    pub fn edit(&mut self, edit: FormEdit) -> Result<(), FormError> {
        self.form.apply(edit)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn badge(&self) -> Option<&'static str> {
        self.displayed().map(|r| risk::prediction_badge(r.risk_level))
    }

    /// The result to render: only once the results panel has been revealed.
    pub fn displayed(&self) -> Option<&PredictionResult> {
        self.result.as_ref().filter(|_| self.results_visible)
    }

    /// Start a submission and hand back the request body to send.
    ///
    /// The previous result stays in place until the new one arrives.
    pub fn begin_submit(&mut self) -> Result<StudentInput, SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        self.state = SessionState::Loading;
        self.error = None;
        Ok(self.form.draft().clone())
    }

    pub fn finish_submit(&mut self, outcome: Result<PredictionResult, GatewayError>) {
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.results_visible = true;
                self.state = SessionState::Success;
            }
            Err(err) => {
                self.error = Some(err.user_message());
                self.state = SessionState::Error;
            }
        }
    }

    pub async fn submit<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<(), SessionError> {
        let input = self.begin_submit()?;
        tracing::debug!(degree = %input.degree, age = input.age, "submitting prediction");
        let outcome = gateway.predict(&input).await;
        self.finish_submit(outcome);

        match &self.error {
            Some(message) if self.state == SessionState::Error => {
                Err(SessionError::Failed(message.clone()))
            }
            _ => Ok(()),
        }
    }
}
