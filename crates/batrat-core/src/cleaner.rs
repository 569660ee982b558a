//! Row exclusion ahead of a statistical analysis.
//!
//! Cleaning never imputes and never rewrites a record: a row is either kept
//! as-is or excluded because one of the required fields is missing or holds
//! a label outside the field's vocabulary.

use std::ops::Deref;

use crate::error::SchemaError;
use crate::schema::{FieldSpec, Record};

/// Records that passed cleaning, borrowed from the session data.
#[derive(Debug)]
pub struct CleanedRecords<'a, R: Record> {
    records: Vec<&'a R>,
    dropped: usize,
}

// Manual impl: a derive would demand `R: Clone`.
impl<R: Record> Clone for CleanedRecords<'_, R> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            dropped: self.dropped,
        }
    }
}

impl<'a, R: Record> CleanedRecords<'a, R> {
    pub fn records(&self) -> &[&'a R] {
        &self.records
    }

    /// Number of input records that were excluded.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<'a, R: Record> Deref for CleanedRecords<'a, R> {
    type Target = [&'a R];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// Exclude every record lacking a valid value in any of `required_fields`.
///
/// Field names are validated against the schema first; an empty input, an
/// empty field list or an unknown name fails with [`SchemaError`].
pub fn clean<'a, R: Record>(
    records: &'a [R],
    required_fields: &[&str],
) -> Result<CleanedRecords<'a, R>, SchemaError> {
    let fields = required_fields
        .iter()
        .map(|name| R::Field::parse(name))
        .collect::<Result<Vec<_>, _>>()?;
    clean_fields(records, &fields)
}

/// [`clean`] over already-resolved fields.
pub fn clean_fields<'a, R: Record>(
    records: &'a [R],
    required: &[R::Field],
) -> Result<CleanedRecords<'a, R>, SchemaError> {
    if records.is_empty() {
        return Err(SchemaError::EmptyInput);
    }
    if required.is_empty() {
        return Err(SchemaError::NoRequiredFields);
    }

    let required = distinct(required);

    let kept: Vec<&R> = records
        .iter()
        .filter(|r| required.iter().all(|&f| r.is_valid(f)))
        .collect();
    let dropped = records.len() - kept.len();

    log::debug!(
        "clean on [{}]: kept {} of {} records",
        required
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", "),
        kept.len(),
        records.len()
    );

    Ok(CleanedRecords {
        records: kept,
        dropped,
    })
}

/// `fields` without repeats, first occurrence kept.
fn distinct<F: FieldSpec>(fields: &[F]) -> Vec<F> {
    let mut out = Vec::with_capacity(fields.len());
    for &f in fields {
        if !out.contains(&f) {
            out.push(f);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{LandingField, ObservationRecord};

    fn rec(risk: Option<&str>, secs: Option<f64>, hours: Option<f64>) -> ObservationRecord {
        ObservationRecord {
            risk: risk.map(String::from),
            seconds_after_rat_arrival: secs,
            hours_after_sunset: hours,
            ..Default::default()
        }
    }

    #[test]
    fn drops_rows_missing_required_fields() {
        let data = vec![
            rec(Some("1"), Some(10.0), Some(1.0)),
            rec(None, Some(10.0), Some(1.0)),
            rec(Some("0"), None, Some(1.0)),
            rec(Some("0"), Some(3.0), Some(2.0)),
        ];
        let cleaned = clean(
            &data,
            &["risk", "seconds_after_rat_arrival", "hours_after_sunset"],
        )
        .unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.dropped(), 2);
        // Kept rows are the originals, untouched and in order.
        assert!(std::ptr::eq(cleaned[0], &data[0]));
        assert!(std::ptr::eq(cleaned[1], &data[3]));
    }

    #[test]
    fn drops_labels_outside_vocabulary() {
        let data = vec![
            rec(Some("yes"), Some(1.0), Some(1.0)),
            rec(Some("sometimes"), Some(1.0), Some(1.0)),
        ];
        let cleaned = clean_fields(&data, &[LandingField::Risk]).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].risk.as_deref(), Some("yes"));
    }

    #[test]
    fn unrequired_fields_do_not_matter() {
        let data = vec![rec(Some("1"), None, None)];
        let cleaned = clean(&data, &["risk"]).unwrap();
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn empty_input_is_a_schema_error() {
        let data: Vec<ObservationRecord> = Vec::new();
        assert_eq!(
            clean(&data, &["risk"]).unwrap_err(),
            SchemaError::EmptyInput
        );
    }

    #[test]
    fn unknown_field_is_a_schema_error() {
        let data = vec![rec(Some("1"), None, None)];
        assert_eq!(
            clean(&data, &["risk", "wingspan"]).unwrap_err(),
            SchemaError::UnknownField("wingspan".into())
        );
        assert_eq!(
            clean(&data, &[]).unwrap_err(),
            SchemaError::NoRequiredFields
        );
    }

    #[test]
    fn repeated_fields_are_checked_once() {
        assert_eq!(
            distinct(&[LandingField::Risk, LandingField::Reward, LandingField::Risk]),
            vec![LandingField::Risk, LandingField::Reward]
        );
        let data = vec![rec(Some("1"), Some(1.0), None), rec(Some("0"), None, None)];
        let cleaned = clean(&data, &["risk", "seconds_after_rat_arrival", "risk"]).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.dropped(), 1);
    }

    #[test]
    fn cleaning_may_leave_nothing() {
        let data = vec![rec(None, None, None)];
        let cleaned = clean(&data, &["risk"]).unwrap();
        assert!(cleaned.is_empty());
        assert_eq!(cleaned.dropped(), 1);
    }
}
