//! Choices offered by the prediction form's selection controls.

use crate::client::Gateway;
use crate::models::DatasetColumns;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsSource {
    Backend,
    BuiltIn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
    pub columns: DatasetColumns,
    pub source: OptionsSource,
}

impl FormOptions {
    /// Fetch the dataset's column values, falling back to the built-in
    /// lists on any failure. The failure is logged, never surfaced.
    pub async fn load<G: Gateway + ?Sized>(gateway: &G) -> Self {
        match gateway.dataset_columns().await {
            Ok(columns) => Self {
                columns: fill_gaps(columns),
                source: OptionsSource::Backend,
            },
            Err(err) => {
                tracing::debug!(error = %err, "dataset columns unavailable, using built-in options");
                Self::built_in()
            }
        }
    }

    pub fn built_in() -> Self {
        Self {
            columns: DatasetColumns::default(),
            source: OptionsSource::BuiltIn,
        }
    }

    pub fn sleep_durations(&self) -> &[String] {
        &self.columns.sleep_durations
    }

    pub fn dietary_habits(&self) -> &[String] {
        &self.columns.dietary_habits
    }

    pub fn degrees(&self) -> &[String] {
        &self.columns.degrees
    }

    pub fn genders(&self) -> &[String] {
        &self.columns.genders
    }
}

/// An empty list from the backend would leave a control with nothing to
/// pick; use the built-in list for that control instead.
fn fill_gaps(mut columns: DatasetColumns) -> DatasetColumns {
    let defaults = DatasetColumns::default();
    let pairs = [
        (&mut columns.professions, defaults.professions),
        (&mut columns.degrees, defaults.degrees),
        (&mut columns.sleep_durations, defaults.sleep_durations),
        (&mut columns.dietary_habits, defaults.dietary_habits),
        (&mut columns.genders, defaults.genders),
    ];
    for (list, fallback) in pairs {
        if list.is_empty() {
            *list = fallback;
        }
    }
    columns
}
