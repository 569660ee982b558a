use batrat_core::{
    AnalysisError, DataSession, FieldKind, FieldSpec, Record, SchemaError, value_counts,
};
use batrat_stats::grouped_counts;

use super::{Dataset, bar};

const BAR_WIDTH: usize = 40;

pub fn run(session: &DataSession, dataset: Dataset, field: &str, by: Option<&str>) {
    let result = match dataset {
        Dataset::Landings => render(session.landings(), field, by),
        Dataset::Arrivals => render(session.arrivals(), field, by),
    };
    match result {
        Ok(text) => print!("{text}"),
        Err(e) => super::fail("counts", &AnalysisError::from(e)),
    }
}

fn render<R: Record>(records: &[R], field: &str, by: Option<&str>) -> Result<String, SchemaError> {
    if let Some(hue) = by {
        let table = grouped_counts(records, field, hue)?;
        return Ok(format!("{table}\n"));
    }

    let parsed = R::Field::parse(field)?.require_kind(FieldKind::Categorical)?;
    let counts = value_counts(records, parsed);
    let max = counts.first().map(|(_, c)| *c).unwrap_or(0);
    let w = counts
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(parsed.name().len());

    let mut out = format!("{:<w$}  {:>6}\n", parsed.name(), "count");
    for (label, count) in &counts {
        out.push_str(&format!(
            "{label:<w$}  {count:>6}  {}\n",
            bar(*count, max, BAR_WIDTH)
        ));
    }
    Ok(out)
}
