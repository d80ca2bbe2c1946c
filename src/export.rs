use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::StudentsResponse;

const HEADERS: [&str; 8] = [
    "ID",
    "Gender",
    "Age",
    "Program",
    "CGPA",
    "Academic Pressure",
    "Probability",
    "Risk Level",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

impl CsvExport {
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("estudiantes_riesgo_{}.csv", today.format("%Y-%m-%d"))
}

/// Render the loaded page (not the whole cohort) as CSV.
///
/// Returns `None` when there is nothing to export. Every cell is quoted,
/// rows keep the display order.
pub fn export_page(
    page: Option<&StudentsResponse>,
    today: NaiveDate,
) -> anyhow::Result<Option<CsvExport>> {
    let students = match page {
        Some(page) if !page.students.is_empty() => &page.students,
        _ => return Ok(None),
    };

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for student in students {
        writer.write_record([
            student.id.clone(),
            student.gender.clone(),
            student.age.to_string(),
            student.degree.clone(),
            student.cgpa.to_string(),
            student.academic_pressure.to_string(),
            format!("{}%", student.probability),
            student.risk_level.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to finish CSV: {}", err.error()))?;
    let contents = String::from_utf8(bytes).context("CSV output was not UTF-8")?;

    Ok(Some(CsvExport {
        filename: export_filename(today),
        contents,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use crate::testing::{sample_page, sample_record};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn nothing_to_export_yields_none() {
        assert!(export_page(None, date()).unwrap().is_none());
        let empty = sample_page(1, 0, vec![]);
        assert!(export_page(Some(&empty), date()).unwrap().is_none());
    }

    #[test]
    fn one_line_per_record_plus_header_all_quoted() {
        let page = sample_page(
            2,
            4,
            vec![
                sample_record("2", RiskLevel::High),
                sample_record("8", RiskLevel::Medium),
                sample_record("13", RiskLevel::Low),
            ],
        );
        let export = export_page(Some(&page), date()).unwrap().unwrap();
        let lines: Vec<&str> = export.contents.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            r#""ID","Gender","Age","Program","CGPA","Academic Pressure","Probability","Risk Level""#
        );
        assert_eq!(
            lines[1],
            r#""2","Female","21","B.Tech","7.25","4","82%","high""#
        );
        assert!(lines[3].starts_with(r#""13","#));
        for line in &lines {
            assert!(line.split(',').all(|cell| cell.starts_with('"') && cell.ends_with('"')));
        }
    }

    #[test]
    fn embedded_quotes_and_commas_stay_in_one_cell() {
        let mut record = sample_record("5", RiskLevel::Low);
        record.degree = r#"B.A, "Hons""#.to_string();
        let page = sample_page(1, 1, vec![record]);
        let export = export_page(Some(&page), date()).unwrap().unwrap();

        let mut reader = csv::Reader::from_reader(export.contents.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[3], r#"B.A, "Hons""#);
        assert_eq!(&row[6], "12.3%");
    }

    #[test]
    fn filename_embeds_date() {
        let page = sample_page(1, 1, vec![sample_record("1", RiskLevel::Low)]);
        let export = export_page(Some(&page), date()).unwrap().unwrap();
        assert_eq!(export.filename, "estudiantes_riesgo_2026-03-09.csv");
    }

    #[test]
    fn export_is_deterministic() {
        let page = sample_page(1, 1, vec![sample_record("1", RiskLevel::High)]);
        assert_eq!(
            export_page(Some(&page), date()).unwrap(),
            export_page(Some(&page), date()).unwrap()
        );
    }
}
