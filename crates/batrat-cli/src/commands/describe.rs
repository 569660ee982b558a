use batrat_core::{DataSession, FieldSummary, describe};

use super::{Dataset, fmt_opt};

pub fn run(session: &DataSession, dataset: Dataset, json: bool) {
    let summaries = match dataset {
        Dataset::Landings => describe(session.landings()),
        Dataset::Arrivals => describe(session.arrivals()),
    };

    if json {
        match serde_json::to_string_pretty(&summaries) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to serialize summary: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}\n", dataset.label());
    print!("{}", summary_table(&summaries));
}

/// One row per field: counts, then moments for continuous fields or the
/// modal label for categorical and text fields.
pub fn summary_table(summaries: &[FieldSummary]) -> String {
    let w = summaries
        .iter()
        .map(|s| s.field.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut out = format!(
        "{:<w$} {:>11} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {}\n",
        "field", "kind", "count", "miss", "mean", "std", "min", "25%", "50%", "75%", "max", "top (freq/unique)"
    );
    for s in summaries {
        out.push_str(&format!(
            "{:<w$} {:>11} {:>6} {:>6}",
            s.field,
            s.kind.to_string(),
            s.count,
            s.missing
        ));
        match (&s.numeric, &s.categorical) {
            (Some(n), _) => out.push_str(&format!(
                " {:>10.3} {:>10} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                n.mean,
                fmt_opt(n.std, 3),
                n.min,
                n.q25,
                n.median,
                n.q75,
                n.max
            )),
            (None, Some(c)) => out.push_str(&format!(
                "{:>79}{} ({}/{})",
                "", c.top, c.freq, c.unique
            )),
            (None, None) => {}
        }
        out.push('\n');
    }
    out
}
