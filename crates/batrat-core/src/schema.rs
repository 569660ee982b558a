//! Field capabilities for the two fixed dataset schemas.
//!
//! Analysts pick fields by name at runtime. Rather than indexing a dynamic
//! frame, every lookup goes through [`FieldSpec::parse`] and a kind check so
//! that an unknown or mistyped field surfaces as a [`SchemaError`] before any
//! numeric or categorical operation runs.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::error::SchemaError;

/// How a field's values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Real-valued measurement.
    Continuous,
    /// Label from a small set; eligible for cross-tabulation.
    Categorical,
    /// Free text such as timestamps. Only counted, never analysed.
    Text,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Continuous => "continuous",
            FieldKind::Categorical => "categorical",
            FieldKind::Text => "text",
        })
    }
}

/// Closed two-label vocabulary used by binary indicator fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryVocabulary {
    pub positive: &'static [&'static str],
    pub negative: &'static [&'static str],
}

impl BinaryVocabulary {
    /// Classify a raw label: `Some(true)` for the positive class,
    /// `Some(false)` for the negative class, `None` when outside the vocabulary.
    pub fn classify(&self, label: &str) -> Option<bool> {
        let label = label.trim();
        if let Ok(v) = label.parse::<f64>() {
            return if v == 1.0 {
                Some(true)
            } else if v == 0.0 {
                Some(false)
            } else {
                None
            };
        }
        if self.positive.iter().any(|p| p.eq_ignore_ascii_case(label)) {
            Some(true)
        } else if self.negative.iter().any(|n| n.eq_ignore_ascii_case(label)) {
            Some(false)
        } else {
            None
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.classify(label).is_some()
    }
}

/// Static description of one schema's fields.
pub trait FieldSpec: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every field, in file column order.
    const ALL: &'static [Self];

    /// Canonical column name.
    fn name(self) -> &'static str;

    fn kind(self) -> FieldKind;

    /// Closed vocabulary, for fields that have one.
    fn vocabulary(self) -> Option<&'static BinaryVocabulary> {
        None
    }

    /// Whether two labels of this field name the same category. Fields with
    /// a vocabulary compare by class, so `1` and `1.0`, or `yes` and `Yes`,
    /// coincide; anything else compares verbatim.
    fn same_category(self, a: &str, b: &str) -> bool {
        match self.vocabulary().map(|v| (v.classify(a), v.classify(b))) {
            Some((Some(x), Some(y))) => x == y,
            _ => a == b,
        }
    }

    /// Capability-checked lookup by column name (ASCII case-insensitive).
    fn parse(name: &str) -> Result<Self, SchemaError> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SchemaError::UnknownField(wanted.to_string()))
    }

    /// Fail unless this field has the expected kind.
    fn require_kind(self, expected: FieldKind) -> Result<Self, SchemaError> {
        if self.kind() == expected {
            Ok(self)
        } else {
            Err(SchemaError::WrongKind {
                field: self.name(),
                expected,
            })
        }
    }
}

/// A single cell value borrowed from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Label(&'a str),
}

impl Value<'_> {
    pub fn as_number(self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(v),
            Value::Label(_) => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Label(s) => f.write_str(s),
        }
    }
}

/// One row of a fixed-schema dataset.
pub trait Record {
    type Field: FieldSpec;

    /// The value of `field`, or `None` when the cell is missing.
    fn value(&self, field: Self::Field) -> Option<Value<'_>>;

    /// True when `field` holds a usable value: finite for continuous fields,
    /// inside the vocabulary for fields that declare one.
    fn is_valid(&self, field: Self::Field) -> bool {
        match self.value(field) {
            None => false,
            Some(Value::Number(v)) => v.is_finite(),
            Some(Value::Label(label)) => match field.vocabulary() {
                Some(vocab) => vocab.contains(label),
                None => !label.is_empty(),
            },
        }
    }
}

impl<R: Record + ?Sized> Record for &R {
    type Field = R::Field;

    fn value(&self, field: Self::Field) -> Option<Value<'_>> {
        (**self).value(field)
    }
}

/// Tokens read as a missing cell.
pub const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "None"];

pub fn is_missing_token(raw: &str) -> bool {
    let raw = raw.trim();
    MISSING_TOKENS.contains(&raw)
}

/// Order labels numerically when both parse as numbers, lexically otherwise.
pub fn label_order(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCAB: BinaryVocabulary = BinaryVocabulary {
        positive: &["1", "yes", "true"],
        negative: &["0", "no", "false"],
    };

    #[test]
    fn classify_accepts_numeric_spellings() {
        assert_eq!(VOCAB.classify("1"), Some(true));
        assert_eq!(VOCAB.classify("1.0"), Some(true));
        assert_eq!(VOCAB.classify(" 0 "), Some(false));
        assert_eq!(VOCAB.classify("2"), None);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(VOCAB.classify("YES"), Some(true));
        assert_eq!(VOCAB.classify("False"), Some(false));
        assert_eq!(VOCAB.classify("maybe"), None);
    }

    #[test]
    fn missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("  NA "));
        assert!(is_missing_token("nan"));
        assert!(!is_missing_token("0"));
    }

    #[test]
    fn labels_sort_numerically_when_possible() {
        assert_eq!(label_order("2", "10"), Ordering::Less);
        assert_eq!(label_order("b", "a"), Ordering::Greater);
        assert_eq!(label_order("1.0", "1"), Ordering::Equal);
    }
}
