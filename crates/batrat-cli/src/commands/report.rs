use batrat_core::{AnalysisConfig, AnalysisError, DataSession, FieldSpec, Record, describe};
use batrat_stats::{ContingencyTable, grouped_counts};

use super::fmt_opt;

const PREVIEW_ROWS: usize = 5;
const OUTCOME: &str = "risk";
const ASSOCIATED_WITH: &str = "reward";
const PREDICTORS: [&str; 2] = ["seconds_after_rat_arrival", "hours_after_sunset"];

pub fn run(session: &DataSession, config: &AnalysisConfig, output_path: Option<&str>) {
    let report = generate_report(session, config);

    match output_path {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &report) {
                eprintln!("Failed to write report to {path}: {e}");
                std::process::exit(1);
            }
            println!("Report saved to: {path}");
        }
        None => print!("{report}"),
    }
}

pub fn generate_report(session: &DataSession, config: &AnalysisConfig) -> String {
    let mut report = String::new();
    report.push_str("# Bat vs. Rat: Forage Behaviour Report\n\n");
    report.push_str(&format!(
        "- Landings: {} rows{}\n- Arrivals: {} rows{}\n- Significance level: {}\n\n",
        session.landings().len(),
        source_suffix(session.landings_path()),
        session.arrivals().len(),
        source_suffix(session.arrivals_path()),
        config.significance_level
    ));

    report.push_str("## Bat landings (first rows)\n\n");
    report.push_str(&markdown_records(session.preview_landings(PREVIEW_ROWS)));
    report.push_str("\n## Rat arrivals (first rows)\n\n");
    report.push_str(&markdown_records(session.preview_arrivals(PREVIEW_ROWS)));

    report.push_str("\n## Summary statistics: landings\n\n");
    report.push_str(&markdown_summary(session.landings()));
    report.push_str("\n## Summary statistics: arrivals\n\n");
    report.push_str(&markdown_summary(session.arrivals()));

    report.push_str("\n## Risk behaviour by season\n\n");
    match grouped_counts(session.landings(), OUTCOME, "season") {
        Ok(table) => report.push_str(&markdown_table(&table)),
        Err(e) => report.push_str(&unavailable(&e.into())),
    }

    report.push_str(&format!(
        "\n## Chi-square test: {OUTCOME} × {ASSOCIATED_WITH}\n\n"
    ));
    match super::chisq::compute(session, config, OUTCOME, ASSOCIATED_WITH) {
        Ok((analysis, dropped)) => {
            let test = &analysis.test;
            report.push_str(&markdown_table(&analysis.table));
            report.push_str(&format!(
                "\n- Records used: {} ({} excluded)\n- Chi-square statistic: {:.4}\n- Degrees of freedom: {}\n- p-value: {:.6}\n- **{}**\n",
                analysis.table.grand_total(),
                dropped,
                test.statistic,
                test.degrees_of_freedom,
                test.p_value,
                analysis.verdict(config.significance_level).message()
            ));
            if analysis.low_validity {
                report.push_str(&format!(
                    "- ⚠ Smallest expected count is {:.2}; the chi-square approximation is unreliable.\n",
                    test.min_expected
                ));
            }
        }
        Err(e) => report.push_str(&unavailable(&e)),
    }

    report.push_str(&format!(
        "\n## Logistic regression: {OUTCOME} ~ {}\n\n",
        PREDICTORS.join(" + ")
    ));
    match super::logit::compute(session, config, OUTCOME, &PREDICTORS) {
        Ok((model, dropped)) => {
            if !model.converged {
                report.push_str(
                    "> ⚠ The fit did not converge; the coefficients below are unreliable.\n\n",
                );
            }
            report.push_str("| Term | Coef | Std err | z | P>\\|z\\| | 95% CI |\n");
            report.push_str("|------|------|---------|---|---------|--------|\n");
            for t in &model.terms {
                let ci = t
                    .conf_int
                    .map(|(lo, hi)| format!("[{lo:.4}, {hi:.4}]"))
                    .unwrap_or_else(|| "—".to_string());
                let name = if t.aliased {
                    format!("{} (aliased)", t.name)
                } else {
                    t.name.clone()
                };
                report.push_str(&format!(
                    "| {} | {:.4} | {} | {} | {} | {} |\n",
                    name,
                    t.estimate,
                    fmt_opt(t.standard_error, 4),
                    fmt_opt(t.z, 3),
                    fmt_opt(t.p_value, 4),
                    ci
                ));
            }
            report.push_str(&format!(
                "\n- Outcome coded 1: `{}`\n- Observations: {} ({} excluded)\n- Log-likelihood: {:.4} (null {:.4})\n- Pseudo R²: {:.4}\n- LLR p-value: {}\n- AIC: {:.3}, BIC: {:.3}\n- Converged: {} after {} iterations\n",
                model.positive_label,
                model.n_observations,
                dropped,
                model.log_likelihood,
                model.null_log_likelihood,
                model.pseudo_r_squared,
                fmt_opt(model.llr_p_value, 6),
                model.aic,
                model.bic,
                if model.converged { "yes" } else { "no" },
                model.iterations
            ));
        }
        Err(e) => report.push_str(&unavailable(&e)),
    }

    report
}

fn source_suffix(path: Option<&std::path::Path>) -> String {
    path.map(|p| format!(" from `{}`", p.display()))
        .unwrap_or_default()
}

fn unavailable(err: &AnalysisError) -> String {
    format!("_{}_ ({err})\n", err.user_message())
}

fn markdown_records<R: Record>(records: &[R]) -> String {
    let fields = R::Field::ALL;
    let mut out = String::new();
    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    out.push_str(&format!("| {} |\n", names.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(fields.len())));
    for r in records {
        let cells: Vec<String> = fields
            .iter()
            .map(|&f| r.value(f).map_or_else(|| "NA".to_string(), |v| v.to_string()))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn markdown_summary<R: Record>(records: &[R]) -> String {
    let mut out = String::from(
        "| Field | Kind | Count | Missing | Mean | Std | Min | Median | Max | Top (freq) |\n",
    );
    out.push_str("|-------|------|-------|---------|------|-----|-----|--------|-----|------------|\n");
    for s in describe(records) {
        let (mean, std, min, median, max) = match &s.numeric {
            Some(n) => (
                format!("{:.3}", n.mean),
                fmt_opt(n.std, 3),
                format!("{:.3}", n.min),
                format!("{:.3}", n.median),
                format!("{:.3}", n.max),
            ),
            None => Default::default(),
        };
        let top = s
            .categorical
            .as_ref()
            .map(|c| format!("{} ({})", c.top, c.freq))
            .unwrap_or_default();
        out.push_str(&format!(
            "| {} | {} | {} | {} | {mean} | {std} | {min} | {median} | {max} | {top} |\n",
            s.field, s.kind, s.count, s.missing
        ));
    }
    out
}

fn markdown_table(table: &ContingencyTable) -> String {
    let mut out = format!(
        "| {} \\ {} | {} | Total |\n",
        table.row_field(),
        table.col_field(),
        table.col_labels().join(" | ")
    );
    out.push_str(&format!("|{}\n", "---|".repeat(table.n_cols() + 2)));
    for ((label, row), total) in table
        .row_labels()
        .iter()
        .zip(table.counts())
        .zip(table.row_totals())
    {
        let cells: Vec<String> = row.iter().map(u64::to_string).collect();
        out.push_str(&format!("| {label} | {} | {total} |\n", cells.join(" | ")));
    }
    let totals: Vec<String> = table.col_totals().iter().map(u64::to_string).collect();
    out.push_str(&format!(
        "| Total | {} | {} |\n",
        totals.join(" | "),
        table.grand_total()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use batrat_core::{ArrivalRecord, ObservationRecord};

    fn session() -> DataSession {
        let landings = (0..60)
            .map(|i| ObservationRecord {
                risk: Some(if i % 2 == 0 || i % 7 == 0 { "1" } else { "0" }.to_string()),
                reward: Some(if i % 3 == 0 { "1" } else { "0" }.to_string()),
                season: Some(if i < 30 { "0" } else { "1" }.to_string()),
                seconds_after_rat_arrival: Some((i * 13 % 97) as f64),
                hours_after_sunset: Some((i % 9) as f64 * 0.5),
                ..Default::default()
            })
            .collect();
        let arrivals = vec![ArrivalRecord {
            month: Some("0".into()),
            rat_minutes: Some(1.5),
            ..Default::default()
        }];
        DataSession::from_records(landings, arrivals)
    }

    #[test]
    fn report_has_every_section() {
        let report = generate_report(&session(), &AnalysisConfig::default());
        for heading in [
            "# Bat vs. Rat",
            "## Bat landings (first rows)",
            "## Rat arrivals (first rows)",
            "## Summary statistics: landings",
            "## Risk behaviour by season",
            "## Chi-square test: risk × reward",
            "## Logistic regression: risk ~ seconds_after_rat_arrival + hours_after_sunset",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("| const |"));
        assert!(report.contains("- Landings: 60 rows"));
    }

    #[test]
    fn failed_analysis_is_reported_inline() {
        let session = DataSession::from_records(vec![ObservationRecord::default()], Vec::new());
        let report = generate_report(&session, &AnalysisConfig::default());
        assert!(report.contains("_analysis unavailable_"));
    }

    #[test]
    fn markdown_table_has_margins() {
        let table = ContingencyTable::from_counts(
            "risk",
            "season",
            vec!["0".into(), "1".into()],
            vec!["0".into(), "1".into()],
            vec![vec![1, 2], vec![3, 4]],
        )
        .unwrap();
        let md = markdown_table(&table);
        assert!(md.contains("| 0 | 1 | 2 | 3 |"));
        assert!(md.ends_with("| Total | 4 | 6 | 10 |\n"));
    }
}
