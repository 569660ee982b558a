use batrat_core::DataSession;

use super::Dataset;

pub fn run(session: &DataSession, dataset: Dataset, rows: usize) {
    let (table, total) = match dataset {
        Dataset::Landings => (
            super::format_records(session.preview_landings(rows)),
            session.landings().len(),
        ),
        Dataset::Arrivals => (
            super::format_records(session.preview_arrivals(rows)),
            session.arrivals().len(),
        ),
    };
    println!("{} ({} rows)\n", dataset.label(), total);
    print!("{table}");
}
