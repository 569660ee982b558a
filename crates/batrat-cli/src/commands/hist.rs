use batrat_core::{
    AnalysisError, DataSession, FieldSpec, Histogram, Record, SchemaError, histogram, numbers,
};
use batrat_stats::KernelDensity;

use super::{Dataset, bar};

const BAR_WIDTH: usize = 50;

/// Marks the density curve on each bar.
const CURVE_MARK: char = '•';

pub fn run(session: &DataSession, dataset: Dataset, field: &str, bins: Option<usize>) {
    let result = match dataset {
        Dataset::Landings => build(session.landings(), field, bins),
        Dataset::Arrivals => build(session.arrivals(), field, bins),
    };
    match result {
        Ok((h, curve)) => print!("{}", render(&h, &curve)),
        Err(e) => super::fail(&format!("histogram of {field}"), &AnalysisError::from(e)),
    }
}

/// Histogram of `field` and its kernel density estimate in count units, one
/// value per bin. The curve is empty when the field has no spread.
pub fn build<R: Record>(
    records: &[R],
    field: &str,
    bins: Option<usize>,
) -> Result<(Histogram, Vec<f64>), SchemaError> {
    let field = R::Field::parse(field)?;
    let h = histogram(records, field, bins)?;
    let curve = KernelDensity::new(&numbers(records, field))
        .map(|kde| kde.expected_counts(&h))
        .unwrap_or_default();
    Ok((h, curve))
}

/// One line per bin: `[lower, upper)  count  density  bar`, with the density
/// curve marked on the bar.
pub fn render(h: &Histogram, curve: &[f64]) -> String {
    let scale = curve
        .iter()
        .copied()
        .fold(h.max_count() as f64, f64::max)
        .ceil() as usize;
    let mut out = format!(
        "{}: {} values, {} missing\n",
        h.field, h.total, h.missing
    );
    let last = h.bins.len().saturating_sub(1);
    for (i, b) in h.bins.iter().enumerate() {
        let close = if i == last { ']' } else { ')' };
        let line = match curve.get(i) {
            Some(&expected) => format!(
                "[{:>10.3}, {:>10.3}{close} {:>6} {:>8.1}  {}",
                b.lower,
                b.upper,
                b.count,
                expected,
                mark_curve(&bar(b.count, scale, BAR_WIDTH), expected, scale)
            ),
            None => format!(
                "[{:>10.3}, {:>10.3}{close} {:>6}  {}",
                b.lower,
                b.upper,
                b.count,
                bar(b.count, scale, BAR_WIDTH)
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn mark_curve(bar: &str, expected: f64, scale: usize) -> String {
    let mut cells: Vec<char> = bar.chars().collect();
    cells.resize(BAR_WIDTH, ' ');
    if scale > 0 {
        let pos = ((expected / scale as f64) * BAR_WIDTH as f64).round() as usize;
        cells[pos.clamp(1, BAR_WIDTH) - 1] = CURVE_MARK;
    }
    cells.into_iter().collect()
}
