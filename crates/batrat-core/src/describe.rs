//! Descriptive summaries over any fixed-schema record set.
//!
//! `describe` mirrors a dataframe "describe all columns": counts for every
//! field, moments and quantiles for continuous fields, and the modal label
//! for categorical and text fields. `histogram` and `value_counts` produce
//! the data behind the distribution plots.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::SchemaError;
use crate::schema::{FieldKind, FieldSpec, Record, Value, label_order};

/// Moments and quantiles of a continuous field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Modal label of a categorical or text field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

/// Summary of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: &'static str,
    pub kind: FieldKind,
    pub count: usize,
    pub missing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalSummary>,
}

/// Summarize every field of the schema.
pub fn describe<R: Record>(records: &[R]) -> Vec<FieldSummary> {
    R::Field::ALL
        .iter()
        .map(|&field| describe_field(records, field))
        .collect()
}

/// Summarize a single field.
pub fn describe_field<R: Record>(records: &[R], field: R::Field) -> FieldSummary {
    let count = records.iter().filter(|r| r.value(field).is_some()).count();
    let missing = records.len() - count;

    let (numeric, categorical) = match field.kind() {
        FieldKind::Continuous => (numeric_summary(&numbers(records, field)), None),
        FieldKind::Categorical | FieldKind::Text => {
            let counts = value_counts(records, field);
            let categorical = counts.first().map(|(top, freq)| CategoricalSummary {
                unique: counts.len(),
                top: top.clone(),
                freq: *freq,
            });
            (None, categorical)
        }
    };

    FieldSummary {
        field: field.name(),
        kind: field.kind(),
        count,
        missing,
        numeric,
        categorical,
    }
}

/// Present numeric values of `field`, in record order.
pub fn numbers<R: Record>(records: &[R], field: R::Field) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.value(field).and_then(Value::as_number))
        .filter(|v| v.is_finite())
        .collect()
}

fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.len() > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(NumericSummary {
        mean,
        std,
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Linear-interpolation quantile of ascending, non-empty data.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Label frequencies of `field`, most frequent first (ties in label order).
pub fn value_counts<R: Record>(records: &[R], field: R::Field) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in records.iter().filter_map(|r| r.value(field)) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    let mut rows: Vec<(String, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| label_order(&a.0, &b.0)));
    rows
}

/// One equal-width histogram bin. The last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub field: &'static str,
    pub bins: Vec<HistogramBin>,
    pub total: usize,
    pub missing: usize,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Sturges' rule: `ceil(log2 n) + 1`.
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Equal-width histogram of a continuous field.
///
/// `bins` defaults to [`sturges_bins`]. When every value is equal a single
/// unit-wide bin centred on that value is returned.
pub fn histogram<R: Record>(
    records: &[R],
    field: R::Field,
    bins: Option<usize>,
) -> Result<Histogram, SchemaError> {
    field.require_kind(FieldKind::Continuous)?;
    let values = numbers(records, field);
    if values.is_empty() {
        return Err(SchemaError::EmptyInput);
    }
    let missing = records.len() - values.len();

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if max == min {
        return Ok(Histogram {
            field: field.name(),
            bins: vec![HistogramBin {
                lower: min - 0.5,
                upper: max + 0.5,
                count: values.len(),
            }],
            total: values.len(),
            missing,
        });
    }

    let k = bins.unwrap_or_else(|| sturges_bins(values.len())).max(1);
    let width = (max - min) / k as f64;
    let mut counts = vec![0usize; k];
    for &v in &values {
        let idx = (((v - min) / width) as usize).min(k - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == k {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect();

    Ok(Histogram {
        field: field.name(),
        bins,
        total: values.len(),
        missing,
    })
}
