//! CSV loading into an immutable, explicitly shared session handle.
//!
//! Both datasets are read once at session start. The resulting
//! [`DataSession`] is handed to every pipeline call by shared reference and
//! is never written to afterwards.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::records::{ArrivalRecord, ObservationRecord, TabularRecord};
use crate::schema::FieldSpec;

/// Rows read from one CSV source.
#[derive(Debug, Clone)]
pub struct LoadedTable<R> {
    pub records: Vec<R>,
    /// Non-empty cells that failed to parse for their field's kind.
    pub unparseable_cells: usize,
}

/// Read a fixed-schema CSV file.
pub fn read_csv<R: TabularRecord>(path: &Path) -> Result<LoadedTable<R>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_from(file, path)
}

/// Read fixed-schema CSV data from any reader. `path` is only used in errors.
pub fn read_from<R: TabularRecord, Rd: Read>(
    input: Rd,
    path: &Path,
) -> Result<LoadedTable<R>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(csv_err)?.clone();

    // Column index for every schema field; extra columns are ignored.
    let mut columns = Vec::with_capacity(R::Field::ALL.len());
    for &field in R::Field::ALL {
        let idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(field.name()))
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: field.name(),
            })?;
        columns.push((field, idx));
    }

    let mut records = Vec::new();
    let mut unparseable_cells = 0usize;
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let mut record = R::default();
        for &(field, idx) in &columns {
            if !record.set_cell(field, row.get(idx).unwrap_or("")) {
                unparseable_cells += 1;
            }
        }
        records.push(record);
    }

    if unparseable_cells > 0 {
        log::warn!(
            "{}: {unparseable_cells} cell(s) could not be parsed and were read as missing",
            path.display()
        );
    }
    log::debug!("{}: loaded {} rows", path.display(), records.len());

    Ok(LoadedTable {
        records,
        unparseable_cells,
    })
}

/// The two datasets of one analysis session.
#[derive(Debug, Clone, Default)]
pub struct DataSession {
    landings: Vec<ObservationRecord>,
    arrivals: Vec<ArrivalRecord>,
    landings_path: Option<PathBuf>,
    arrivals_path: Option<PathBuf>,
}

impl DataSession {
    /// Load the landing dataset and the arrival log from CSV files.
    pub fn load(
        landings_path: impl AsRef<Path>,
        arrivals_path: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let landings_path = landings_path.as_ref();
        let arrivals_path = arrivals_path.as_ref();
        let landings = read_csv::<ObservationRecord>(landings_path)?;
        let arrivals = read_csv::<ArrivalRecord>(arrivals_path)?;
        Ok(Self {
            landings: landings.records,
            arrivals: arrivals.records,
            landings_path: Some(landings_path.to_path_buf()),
            arrivals_path: Some(arrivals_path.to_path_buf()),
        })
    }

    /// Build a session from records already in memory.
    pub fn from_records(landings: Vec<ObservationRecord>, arrivals: Vec<ArrivalRecord>) -> Self {
        Self {
            landings,
            arrivals,
            landings_path: None,
            arrivals_path: None,
        }
    }

    pub fn landings(&self) -> &[ObservationRecord] {
        &self.landings
    }

    pub fn arrivals(&self) -> &[ArrivalRecord] {
        &self.arrivals
    }

    /// First `n` landing records.
    pub fn preview_landings(&self, n: usize) -> &[ObservationRecord] {
        &self.landings[..n.min(self.landings.len())]
    }

    /// First `n` arrival records.
    pub fn preview_arrivals(&self, n: usize) -> &[ArrivalRecord] {
        &self.arrivals[..n.min(self.arrivals.len())]
    }

    pub fn landings_path(&self) -> Option<&Path> {
        self.landings_path.as_deref()
    }

    pub fn arrivals_path(&self) -> Option<&Path> {
        self.arrivals_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LandingField;

    const LANDINGS: &str = "\
start_time,bat_landing_to_food,habit,rat_period_start,rat_period_end,seconds_after_rat_arrival,risk,reward,month,sunset_time,hours_after_sunset,season
30/12/2017 18:37,16,rat,30/12/2017 18:35,30/12/2017 18:38,108,1,0,0,30/12/2017 16:45,1.87,0
30/12/2017 19:51,0.07,fast,30/12/2017 19:50,30/12/2017 19:55,17,0,1,0,30/12/2017 16:45,3.1,0
30/12/2017 19:51,abc,,30/12/2017 19:50,30/12/2017 19:55,,0,1,0,30/12/2017 16:45,NA,0
";

    #[test]
    fn reads_rows_and_counts_unparseable_cells() {
        let table: LoadedTable<ObservationRecord> =
            read_from(LANDINGS.as_bytes(), Path::new("landings.csv")).unwrap();
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.unparseable_cells, 1);

        let first = &table.records[0];
        assert_eq!(first.risk.as_deref(), Some("1"));
        assert_eq!(first.seconds_after_rat_arrival, Some(108.0));

        let third = &table.records[2];
        assert_eq!(third.bat_landing_to_food, None);
        assert_eq!(third.habit, None);
        assert_eq!(third.hours_after_sunset, None);
    }

    #[test]
    fn missing_column_is_reported() {
        let data = "risk,reward\n1,0\n";
        let err = read_from::<ObservationRecord, _>(data.as_bytes(), Path::new("x.csv"))
            .unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => {
                assert_eq!(column, LandingField::StartTime.name())
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn headers_match_case_insensitively_and_extra_columns_are_ignored() {
        let data = "\
extra,TIME,Month,hours_after_sunset,bat_landing_number,food_availability,rat_minutes,rat_arrival_number
x,26/12/2017 16:13,0,-0.5,20,4,0,0
";
        let table: LoadedTable<ArrivalRecord> =
            read_from(data.as_bytes(), Path::new("arrivals.csv")).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].hours_after_sunset, Some(-0.5));
        assert_eq!(table.records[0].time.as_deref(), Some("26/12/2017 16:13"));
    }

    #[test]
    fn preview_is_clamped() {
        let session = DataSession::from_records(vec![ObservationRecord::default(); 3], vec![]);
        assert_eq!(session.preview_landings(5).len(), 3);
        assert_eq!(session.preview_landings(2).len(), 2);
        assert!(session.preview_arrivals(5).is_empty());
    }
}
