//! Cross-tabulation and the chi-square test of independence.
//!
//! Rows and columns are the distinct labels observed in the two fields,
//! sorted (numerically when the labels are numbers). Expected counts under
//! independence are `row_total * col_total / grand_total`; the statistic is
//! `Σ (observed − expected)² / expected` on `(rows − 1)(cols − 1)` degrees of
//! freedom, with the p-value taken from the chi-square upper tail.
//!
//! The asymptotic approximation is unreliable when expected counts are
//! small. Results with any expected cell below
//! [`AnalysisConfig::min_expected_count`] are still produced but flagged
//! `low_validity`.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use batrat_core::{
    AnalysisConfig, AnalysisError, AnalysisResult, FieldKind, FieldSpec, Record, SchemaError,
    Value, label_order,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Contingency table
// ═══════════════════════════════════════════════════════════════════════════════

/// Observed joint frequencies of two categorical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    row_field: String,
    col_field: String,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build a table from explicit counts (`counts[row][col]`).
    pub fn from_counts(
        row_field: impl Into<String>,
        col_field: impl Into<String>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self, SchemaError> {
        if row_labels.is_empty() || col_labels.is_empty() {
            return Err(SchemaError::InvalidTable(
                "a table needs at least one row and one column".into(),
            ));
        }
        if counts.len() != row_labels.len()
            || counts.iter().any(|row| row.len() != col_labels.len())
        {
            return Err(SchemaError::InvalidTable(format!(
                "counts do not match a {}x{} table",
                row_labels.len(),
                col_labels.len()
            )));
        }
        if has_duplicates(&row_labels) || has_duplicates(&col_labels) {
            return Err(SchemaError::InvalidTable("duplicate labels".into()));
        }
        Ok(Self {
            row_field: row_field.into(),
            col_field: col_field.into(),
            row_labels,
            col_labels,
            counts,
        })
    }

    /// Cross-tabulate cleaned records. Every record must hold a value in both
    /// fields; a missing value fails with [`SchemaError::MissingValue`].
    ///
    /// Labels a field's vocabulary classifies alike share one row or column,
    /// named by the first spelling seen.
    pub fn tabulate<R: Record>(
        records: &[R],
        row_field: R::Field,
        col_field: R::Field,
    ) -> Result<Self, SchemaError> {
        if records.is_empty() {
            return Err(SchemaError::EmptyInput);
        }
        let (mut rows, mut cols) = (Vec::new(), Vec::new());
        let mut pairs = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let row = category(&mut rows, row_field, label_of(record, row_field, index)?);
            let col = category(&mut cols, col_field, label_of(record, col_field, index)?);
            pairs.push((row, col));
        }
        Ok(Self::from_pairs(row_field.name(), col_field.name(), &pairs))
    }

    fn from_pairs(row_field: &str, col_field: &str, pairs: &[(String, String)]) -> Self {
        let row_labels = sorted_distinct(pairs.iter().map(|(r, _)| r));
        let col_labels = sorted_distinct(pairs.iter().map(|(_, c)| c));
        let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
        for (r, c) in pairs {
            // Labels were collected from these very pairs.
            let i = row_labels.iter().position(|l| l == r).unwrap_or(0);
            let j = col_labels.iter().position(|l| l == c).unwrap_or(0);
            counts[i][j] += 1;
        }
        Self {
            row_field: row_field.to_string(),
            col_field: col_field.to_string(),
            row_labels,
            col_labels,
            counts,
        }
    }

    pub fn row_field(&self) -> &str {
        &self.row_field
    }

    pub fn col_field(&self) -> &str {
        &self.col_field
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    /// Observed count for a (row label, column label) pair.
    pub fn count(&self, row: &str, col: &str) -> Option<u64> {
        let i = self.row_labels.iter().position(|l| l == row)?;
        let j = self.col_labels.iter().position(|l| l == col)?;
        Some(self.counts[i][j])
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.n_cols())
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

impl fmt::Display for ContingencyTable {
    /// Plain-text cross-tabulation with margins.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = format!("{} \\ {}", self.row_field, self.col_field);
        let w0 = self
            .row_labels
            .iter()
            .map(|l| l.len())
            .chain([head.len(), "total".len()])
            .max()
            .unwrap_or(5);
        let w = self
            .col_labels
            .iter()
            .map(|l| l.len())
            .chain([self.grand_total().to_string().len(), "total".len()])
            .max()
            .unwrap_or(5);

        write!(f, "{head:<w0$}")?;
        for label in &self.col_labels {
            write!(f, "  {label:>w$}")?;
        }
        writeln!(f, "  {:>w$}", "total")?;

        for (label, (row, total)) in self
            .row_labels
            .iter()
            .zip(self.counts.iter().zip(self.row_totals()))
        {
            write!(f, "{label:<w0$}")?;
            for c in row {
                write!(f, "  {c:>w$}")?;
            }
            writeln!(f, "  {total:>w$}")?;
        }

        write!(f, "{:<w0$}", "total")?;
        for c in self.col_totals() {
            write!(f, "  {c:>w$}")?;
        }
        write!(f, "  {:>w$}", self.grand_total())
    }
}

fn label_of<R: Record>(record: &R, field: R::Field, index: usize) -> Result<String, SchemaError> {
    match record.value(field) {
        Some(Value::Label(s)) => Ok(s.to_string()),
        Some(Value::Number(v)) if v.is_finite() => Ok(v.to_string()),
        _ => Err(SchemaError::MissingValue {
            field: field.name(),
            index,
        }),
    }
}

/// The registered spelling of `label`'s category, registering it if new.
fn category<F: FieldSpec>(seen: &mut Vec<String>, field: F, label: String) -> String {
    match seen.iter().find(|s| field.same_category(s, &label)) {
        Some(s) => s.clone(),
        None => {
            seen.push(label.clone());
            label
        }
    }
}

fn sorted_distinct<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for l in labels {
        if !out.contains(l) {
            out.push(l.clone());
        }
    }
    out.sort_by(|a, b| label_order(a, b).then_with(|| a.cmp(b)));
    out
}

fn has_duplicates(labels: &[String]) -> bool {
    labels
        .iter()
        .enumerate()
        .any(|(i, l)| labels[..i].contains(l))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Independence test
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of the chi-square test of independence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndependenceTestResult {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// Expected counts under independence, same shape as the table.
    pub expected_counts: Vec<Vec<f64>>,
    /// Smallest expected cell count.
    pub min_expected: f64,
    /// Whether Yates' continuity correction was applied.
    pub yates_corrected: bool,
}

/// Decision at a significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// p < alpha: independence rejected.
    Associated,
    Independent,
}

impl Verdict {
    pub fn from_p(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Verdict::Associated
        } else {
            Verdict::Independent
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Verdict::Associated => "Significant association found",
            Verdict::Independent => "No significant association found",
        }
    }
}

/// A contingency table together with its independence test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyAnalysis {
    pub table: ContingencyTable,
    pub test: IndependenceTestResult,
    /// Some expected count is below the configured minimum; the chi-square
    /// approximation should not be trusted.
    pub low_validity: bool,
}

impl ContingencyAnalysis {
    pub fn verdict(&self, alpha: f64) -> Verdict {
        Verdict::from_p(self.test.p_value, alpha)
    }
}

/// Run the chi-square test on an existing table.
pub fn independence_test(
    table: &ContingencyTable,
    config: &AnalysisConfig,
) -> AnalysisResult<IndependenceTestResult> {
    if table.n_rows() < 2 || table.n_cols() < 2 {
        return Err(AnalysisError::DegenerateTable(format!(
            "need at least two categories in each field, got {} '{}' x {} '{}'",
            table.n_rows(),
            table.row_field(),
            table.n_cols(),
            table.col_field()
        )));
    }

    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    let grand = table.grand_total();

    if let Some(i) = row_totals.iter().position(|&t| t == 0) {
        return Err(AnalysisError::DegenerateTable(format!(
            "{} = {} has no observations",
            table.row_field(),
            table.row_labels()[i]
        )));
    }
    if let Some(j) = col_totals.iter().position(|&t| t == 0) {
        return Err(AnalysisError::DegenerateTable(format!(
            "{} = {} has no observations",
            table.col_field(),
            table.col_labels()[j]
        )));
    }

    let n = grand as f64;
    let expected: Vec<Vec<f64>> = row_totals
        .iter()
        .map(|&rt| {
            col_totals
                .iter()
                .map(|&ct| rt as f64 * ct as f64 / n)
                .collect()
        })
        .collect();

    let degrees_of_freedom = (table.n_rows() - 1) * (table.n_cols() - 1);
    let yates_corrected = config.yates_correction && degrees_of_freedom == 1;

    let mut statistic = 0.0;
    for (obs_row, exp_row) in table.counts().iter().zip(&expected) {
        for (&o, &e) in obs_row.iter().zip(exp_row) {
            let mut diff = (o as f64 - e).abs();
            if yates_corrected {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / e;
        }
    }

    let dist = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| AnalysisError::DegenerateTable(e.to_string()))?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);

    let min_expected = expected
        .iter()
        .flatten()
        .copied()
        .fold(f64::INFINITY, f64::min);

    Ok(IndependenceTestResult {
        statistic,
        degrees_of_freedom,
        p_value,
        expected_counts: expected,
        min_expected,
        yates_corrected,
    })
}

/// Cross-tabulate `row_field` against `col_field` and test independence,
/// with default settings.
pub fn analyze<R: Record>(
    records: &[R],
    row_field: &str,
    col_field: &str,
) -> AnalysisResult<ContingencyAnalysis> {
    analyze_with(records, row_field, col_field, &AnalysisConfig::default())
}

/// [`analyze`] with explicit settings.
pub fn analyze_with<R: Record>(
    records: &[R],
    row_field: &str,
    col_field: &str,
    config: &AnalysisConfig,
) -> AnalysisResult<ContingencyAnalysis> {
    let row = R::Field::parse(row_field)?.require_kind(FieldKind::Categorical)?;
    let col = R::Field::parse(col_field)?.require_kind(FieldKind::Categorical)?;

    let table = ContingencyTable::tabulate(records, row, col)?;
    let test = independence_test(&table, config)?;
    let low_validity = test.min_expected < config.min_expected_count;

    if low_validity {
        log::warn!(
            "{} x {}: smallest expected count {:.2} is below {}; chi-square approximation unreliable",
            row.name(),
            col.name(),
            test.min_expected,
            config.min_expected_count
        );
    }
    log::debug!(
        "{} x {}: chi2={:.4}, df={}, p={:.6}",
        row.name(),
        col.name(),
        test.statistic,
        test.degrees_of_freedom,
        test.p_value
    );

    Ok(ContingencyAnalysis {
        table,
        test,
        low_validity,
    })
}

/// Counts of `x` split by `hue`, the data behind a grouped count plot.
///
/// Unlike [`analyze`], records missing either value are skipped rather than
/// rejected, since no inference is drawn from the counts.
pub fn grouped_counts<R: Record>(
    records: &[R],
    x: &str,
    hue: &str,
) -> Result<ContingencyTable, SchemaError> {
    let x = R::Field::parse(x)?.require_kind(FieldKind::Categorical)?;
    let hue = R::Field::parse(hue)?.require_kind(FieldKind::Categorical)?;

    let (mut xs, mut hues) = (Vec::new(), Vec::new());
    let pairs: Vec<(String, String)> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| Some((label_of(r, x, i).ok()?, label_of(r, hue, i).ok()?)))
        .map(|(a, b)| (category(&mut xs, x, a), category(&mut hues, hue, b)))
        .collect();
    if pairs.is_empty() {
        return Err(SchemaError::EmptyInput);
    }
    Ok(ContingencyTable::from_pairs(x.name(), hue.name(), &pairs))
}
