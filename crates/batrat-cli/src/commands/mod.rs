pub mod chisq;
pub mod counts;
pub mod describe;
pub mod explore;
pub mod hist;
pub mod logit;
pub mod preview;
pub mod report;

use batrat_core::{AnalysisConfig, AnalysisError, DataSession, FieldSpec, Record};

/// Which of the two session datasets a command works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Landings,
    Arrivals,
}

impl Dataset {
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Landings => "landings",
            Dataset::Arrivals => "arrivals",
        }
    }
}

/// Parse a dataset name into the enum.
pub fn parse_dataset(s: &str) -> Dataset {
    match s {
        "landings" | "dataset1" | "1" => Dataset::Landings,
        "arrivals" | "dataset2" | "2" => Dataset::Arrivals,
        _ => {
            eprintln!("Unknown dataset '{s}', using landings");
            Dataset::Landings
        }
    }
}

/// Load both datasets once for the whole invocation, or exit.
pub fn load_session(landings: &str, arrivals: &str) -> DataSession {
    match DataSession::load(landings, arrivals) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to load data: {e}");
            std::process::exit(1);
        }
    }
}

/// Defaults, or the given JSON config file. Exits on an invalid file.
pub fn load_config(path: Option<&str>) -> AnalysisConfig {
    let Some(path) = path else {
        return AnalysisConfig::default();
    };
    match AnalysisConfig::from_path(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Print the analyst-facing message for a failed analysis and exit.
pub fn fail(context: &str, err: &AnalysisError) -> ! {
    log::debug!("{context}: {err:?}");
    eprintln!("{context}: {} ({err})", err.user_message());
    std::process::exit(1);
}

/// Fixed-width text table of records, one column per schema field.
pub fn format_records<R: Record>(records: &[R]) -> String {
    let fields = R::Field::ALL;
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            fields
                .iter()
                .map(|&f| r.value(f).map_or_else(|| "NA".to_string(), |v| v.to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(j, f)| {
            cells
                .iter()
                .map(|row| row[j].chars().count())
                .chain(std::iter::once(f.name().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = fields
        .iter()
        .zip(&widths)
        .map(|(f, &w)| format!("{:<w$}", f.name()))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Optional number for tables; absent values print as a dash.
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "—".to_string())
}

/// Horizontal bar scaled so `max` fills `width` cells.
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * width).div_ceil(max);
    "█".repeat(len.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use batrat_core::ArrivalRecord;

    // -----------------------------------------------------------------------
    // parse_dataset tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_dataset_names() {
        assert_eq!(parse_dataset("landings"), Dataset::Landings);
        assert_eq!(parse_dataset("arrivals"), Dataset::Arrivals);
        assert_eq!(parse_dataset("dataset2"), Dataset::Arrivals);
    }

    #[test]
    fn test_parse_dataset_unknown_defaults_landings() {
        assert_eq!(parse_dataset("bats"), Dataset::Landings);
        assert_eq!(parse_dataset(""), Dataset::Landings);
    }

    #[test]
    fn test_dataset_labels() {
        assert_eq!(Dataset::Landings.label(), "landings");
        assert_eq!(Dataset::Arrivals.label(), "arrivals");
    }

    // -----------------------------------------------------------------------
    // formatting helpers
    // -----------------------------------------------------------------------

    #[test]
    fn test_format_records_has_header_and_rows() {
        let rows = vec![
            ArrivalRecord {
                month: Some("0".into()),
                rat_minutes: Some(1.5),
                ..Default::default()
            },
            ArrivalRecord::default(),
        ];
        let text = format_records(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("time"));
        assert!(lines[0].contains("rat_arrival_number"));
        assert!(lines[1].contains("1.5"));
        assert!(lines[2].starts_with("NA"));
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(0.12345), 3), "0.123");
        assert_eq!(fmt_opt(None, 3), "—");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10, 10, 4).chars().count(), 4);
        assert_eq!(bar(5, 10, 4).chars().count(), 2);
        assert_eq!(bar(1, 10, 4).chars().count(), 1);
        assert_eq!(bar(0, 10, 4), "");
        assert_eq!(bar(3, 0, 4), "");
    }
}
