use std::fmt::Write;

use chrono::NaiveDate;

use crate::analytics::{format_percent, AnalyticsView};
use crate::risk;

/// Render the analytics screen as a markdown document.
pub fn build_report(view: &AnalyticsView, generated_on: NaiveDate) -> String {
    let mut output = String::new();
    let response = &view.response;

    let _ = writeln!(output, "# Student Depression Risk Report");
    let _ = writeln!(
        output,
        "Generated on {} for {} evaluated students",
        generated_on, view.total_students
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(
        output,
        "- Average risk probability: {}%",
        response.avg_probability
    );
    for slice in &view.distribution {
        let _ = writeln!(
            output,
            "- {}: {} students ({})",
            slice.label,
            slice.count,
            format_percent(slice.pct)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Contributing Factors");

    if view.factors.is_empty() {
        let _ = writeln!(output, "No contributing factors reported.");
    } else {
        for factor in &view.factors {
            let _ = writeln!(
                output,
                "- {} `{}`: {} students ({}%)",
                factor.name, factor.color, factor.value, factor.pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk by Program");

    if view.degrees().is_empty() {
        let _ = writeln!(output, "No programs with enough students.");
    } else {
        let _ = writeln!(output, "| Program | Low | Medium | High | Total | High % |");
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for row in view.degrees() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {}% |",
                row.degree, row.low, row.medium, row.high, row.total, row.high_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk by Academic Pressure");

    if response.risk_by_pressure.is_empty() {
        let _ = writeln!(output, "No pressure breakdown available.");
    } else {
        for row in &response.risk_by_pressure {
            let _ = writeln!(
                output,
                "- Pressure {}: {} students, depression rate {}%, avg probability {}%",
                row.pressure, row.count, row.depression_rate, row.avg_probability
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk by Sleep Duration");

    if response.risk_by_sleep.is_empty() {
        let _ = writeln!(output, "No sleep breakdown available.");
    } else {
        for row in &response.risk_by_sleep {
            let _ = writeln!(
                output,
                "- {}: {} students, depression rate {}%, avg probability {}%",
                row.sleep_duration, row.count, row.depression_rate, row.avg_probability
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");

    if response.recent_alerts.is_empty() {
        let _ = writeln!(output, "No alerts.");
    } else {
        for alert in &response.recent_alerts {
            let _ = writeln!(
                output,
                "- {} ({}) {}% {}: {}",
                alert.id,
                alert.degree,
                alert.probability,
                risk::list_badge(alert.risk_level),
                alert.main_factor
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_analytics;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    #[test]
    fn report_lists_sections_and_shares() {
        let report = build_report(&AnalyticsView::new(sample_analytics()), date());
        assert!(report.starts_with("# Student Depression Risk Report\n"));
        assert!(report.contains("Generated on 2026-02-02 for 200 evaluated students"));
        assert!(report.contains("- Alto: 80 students (40.0%)"));
        assert!(report.contains("- Average risk probability: 58.3%"));
        assert!(report.contains("| B.Tech | 10 | 5 | 25 | 40 | 62.5% |"));
        assert!(report.contains("- 140 (MSc) 99.1% Alto Riesgo: Alta presión académica"));
        assert!(report.contains("- Otro `#ef4444`"));
    }

    #[test]
    fn empty_sections_render_placeholders() {
        let mut response = sample_analytics();
        response.contributing_factors.clear();
        response.recent_alerts.clear();
        response.risk_by_degree.clear();

        let report = build_report(&AnalyticsView::new(response), date());
        assert!(report.contains("No contributing factors reported."));
        assert!(report.contains("No programs with enough students."));
        assert!(report.contains("No alerts."));
    }
}
