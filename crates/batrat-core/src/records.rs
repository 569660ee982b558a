//! Record types for the landing and arrival datasets.

use serde::Serialize;

use crate::schema::{BinaryVocabulary, FieldKind, FieldSpec, Record, Value, is_missing_token};

pub const RISK_VOCABULARY: BinaryVocabulary = BinaryVocabulary {
    positive: &["1", "yes", "true", "risk-taking"],
    negative: &["0", "no", "false", "risk-avoidance"],
};

pub const REWARD_VOCABULARY: BinaryVocabulary = BinaryVocabulary {
    positive: &["1", "yes", "true", "rewarded"],
    negative: &["0", "no", "false", "unrewarded"],
};

// ---------------------------------------------------------------------------
// Landing schema (dataset 1)
// ---------------------------------------------------------------------------

/// Columns of the bat landing dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingField {
    StartTime,
    BatLandingToFood,
    Habit,
    RatPeriodStart,
    RatPeriodEnd,
    SecondsAfterRatArrival,
    Risk,
    Reward,
    Month,
    SunsetTime,
    HoursAfterSunset,
    Season,
}

impl FieldSpec for LandingField {
    const ALL: &'static [Self] = &[
        Self::StartTime,
        Self::BatLandingToFood,
        Self::Habit,
        Self::RatPeriodStart,
        Self::RatPeriodEnd,
        Self::SecondsAfterRatArrival,
        Self::Risk,
        Self::Reward,
        Self::Month,
        Self::SunsetTime,
        Self::HoursAfterSunset,
        Self::Season,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::BatLandingToFood => "bat_landing_to_food",
            Self::Habit => "habit",
            Self::RatPeriodStart => "rat_period_start",
            Self::RatPeriodEnd => "rat_period_end",
            Self::SecondsAfterRatArrival => "seconds_after_rat_arrival",
            Self::Risk => "risk",
            Self::Reward => "reward",
            Self::Month => "month",
            Self::SunsetTime => "sunset_time",
            Self::HoursAfterSunset => "hours_after_sunset",
            Self::Season => "season",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::BatLandingToFood | Self::SecondsAfterRatArrival | Self::HoursAfterSunset => {
                FieldKind::Continuous
            }
            Self::Habit | Self::Risk | Self::Reward | Self::Month | Self::Season => {
                FieldKind::Categorical
            }
            Self::StartTime | Self::RatPeriodStart | Self::RatPeriodEnd | Self::SunsetTime => {
                FieldKind::Text
            }
        }
    }

    fn vocabulary(self) -> Option<&'static BinaryVocabulary> {
        match self {
            Self::Risk => Some(&RISK_VOCABULARY),
            Self::Reward => Some(&REWARD_VOCABULARY),
            _ => None,
        }
    }
}

/// One bat landing event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub start_time: Option<String>,
    pub bat_landing_to_food: Option<f64>,
    pub habit: Option<String>,
    pub rat_period_start: Option<String>,
    pub rat_period_end: Option<String>,
    pub seconds_after_rat_arrival: Option<f64>,
    pub risk: Option<String>,
    pub reward: Option<String>,
    pub month: Option<String>,
    pub sunset_time: Option<String>,
    pub hours_after_sunset: Option<f64>,
    pub season: Option<String>,
}

impl Record for ObservationRecord {
    type Field = LandingField;

    fn value(&self, field: LandingField) -> Option<Value<'_>> {
        match field {
            LandingField::StartTime => label(&self.start_time),
            LandingField::BatLandingToFood => self.bat_landing_to_food.map(Value::Number),
            LandingField::Habit => label(&self.habit),
            LandingField::RatPeriodStart => label(&self.rat_period_start),
            LandingField::RatPeriodEnd => label(&self.rat_period_end),
            LandingField::SecondsAfterRatArrival => {
                self.seconds_after_rat_arrival.map(Value::Number)
            }
            LandingField::Risk => label(&self.risk),
            LandingField::Reward => label(&self.reward),
            LandingField::Month => label(&self.month),
            LandingField::SunsetTime => label(&self.sunset_time),
            LandingField::HoursAfterSunset => self.hours_after_sunset.map(Value::Number),
            LandingField::Season => label(&self.season),
        }
    }
}

impl TabularRecord for ObservationRecord {
    fn set_cell(&mut self, field: LandingField, raw: &str) -> bool {
        match field {
            LandingField::StartTime => set_label(&mut self.start_time, raw),
            LandingField::BatLandingToFood => set_number(&mut self.bat_landing_to_food, raw),
            LandingField::Habit => set_label(&mut self.habit, raw),
            LandingField::RatPeriodStart => set_label(&mut self.rat_period_start, raw),
            LandingField::RatPeriodEnd => set_label(&mut self.rat_period_end, raw),
            LandingField::SecondsAfterRatArrival => {
                set_number(&mut self.seconds_after_rat_arrival, raw)
            }
            LandingField::Risk => set_label(&mut self.risk, raw),
            LandingField::Reward => set_label(&mut self.reward, raw),
            LandingField::Month => set_label(&mut self.month, raw),
            LandingField::SunsetTime => set_label(&mut self.sunset_time, raw),
            LandingField::HoursAfterSunset => set_number(&mut self.hours_after_sunset, raw),
            LandingField::Season => set_label(&mut self.season, raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Arrival schema (dataset 2)
// ---------------------------------------------------------------------------

/// Columns of the rat arrival log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalField {
    Time,
    Month,
    HoursAfterSunset,
    BatLandingNumber,
    FoodAvailability,
    RatMinutes,
    RatArrivalNumber,
}

impl FieldSpec for ArrivalField {
    const ALL: &'static [Self] = &[
        Self::Time,
        Self::Month,
        Self::HoursAfterSunset,
        Self::BatLandingNumber,
        Self::FoodAvailability,
        Self::RatMinutes,
        Self::RatArrivalNumber,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Month => "month",
            Self::HoursAfterSunset => "hours_after_sunset",
            Self::BatLandingNumber => "bat_landing_number",
            Self::FoodAvailability => "food_availability",
            Self::RatMinutes => "rat_minutes",
            Self::RatArrivalNumber => "rat_arrival_number",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Time => FieldKind::Text,
            Self::Month => FieldKind::Categorical,
            _ => FieldKind::Continuous,
        }
    }
}

/// One 30-minute observation window from the arrival log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArrivalRecord {
    pub time: Option<String>,
    pub month: Option<String>,
    pub hours_after_sunset: Option<f64>,
    pub bat_landing_number: Option<f64>,
    pub food_availability: Option<f64>,
    pub rat_minutes: Option<f64>,
    pub rat_arrival_number: Option<f64>,
}

impl Record for ArrivalRecord {
    type Field = ArrivalField;

    fn value(&self, field: ArrivalField) -> Option<Value<'_>> {
        match field {
            ArrivalField::Time => label(&self.time),
            ArrivalField::Month => label(&self.month),
            ArrivalField::HoursAfterSunset => self.hours_after_sunset.map(Value::Number),
            ArrivalField::BatLandingNumber => self.bat_landing_number.map(Value::Number),
            ArrivalField::FoodAvailability => self.food_availability.map(Value::Number),
            ArrivalField::RatMinutes => self.rat_minutes.map(Value::Number),
            ArrivalField::RatArrivalNumber => self.rat_arrival_number.map(Value::Number),
        }
    }
}

impl TabularRecord for ArrivalRecord {
    fn set_cell(&mut self, field: ArrivalField, raw: &str) -> bool {
        match field {
            ArrivalField::Time => set_label(&mut self.time, raw),
            ArrivalField::Month => set_label(&mut self.month, raw),
            ArrivalField::HoursAfterSunset => set_number(&mut self.hours_after_sunset, raw),
            ArrivalField::BatLandingNumber => set_number(&mut self.bat_landing_number, raw),
            ArrivalField::FoodAvailability => set_number(&mut self.food_availability, raw),
            ArrivalField::RatMinutes => set_number(&mut self.rat_minutes, raw),
            ArrivalField::RatArrivalNumber => set_number(&mut self.rat_arrival_number, raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// A record that can be filled cell by cell from a CSV row.
pub trait TabularRecord: Record + Default {
    /// Store one raw cell. Returns `false` when the cell held something that
    /// could not be parsed for the field's kind; the field is then missing.
    fn set_cell(&mut self, field: Self::Field, raw: &str) -> bool;
}

fn label(slot: &Option<String>) -> Option<Value<'_>> {
    slot.as_deref().map(Value::Label)
}

fn set_label(slot: &mut Option<String>, raw: &str) -> bool {
    *slot = if is_missing_token(raw) {
        None
    } else {
        Some(raw.trim().to_string())
    };
    true
}

fn set_number(slot: &mut Option<f64>, raw: &str) -> bool {
    if is_missing_token(raw) {
        *slot = None;
        return true;
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            *slot = Some(v);
            true
        }
        _ => {
            *slot = None;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_field_lookup_is_case_insensitive() {
        assert_eq!(LandingField::parse("Risk").unwrap(), LandingField::Risk);
        assert_eq!(
            LandingField::parse(" seconds_after_rat_arrival ").unwrap(),
            LandingField::SecondsAfterRatArrival
        );
        assert!(LandingField::parse("rat_minutes").is_err());
    }

    #[test]
    fn every_landing_field_has_unique_name() {
        let mut names: Vec<_> = LandingField::ALL.iter().map(|f| f.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), LandingField::ALL.len());
    }

    #[test]
    fn set_cell_parses_numbers_and_missing() {
        let mut rec = ObservationRecord::default();
        assert!(rec.set_cell(LandingField::HoursAfterSunset, " 1.5 "));
        assert_eq!(rec.hours_after_sunset, Some(1.5));
        assert!(rec.set_cell(LandingField::HoursAfterSunset, "NA"));
        assert_eq!(rec.hours_after_sunset, None);
        assert!(!rec.set_cell(LandingField::HoursAfterSunset, "soon"));
        assert_eq!(rec.hours_after_sunset, None);
    }

    #[test]
    fn vocabulary_fields_group_spellings_by_class() {
        assert!(LandingField::Risk.same_category("1", "1.0"));
        assert!(LandingField::Reward.same_category("yes", "Yes"));
        assert!(LandingField::Reward.same_category("0", "no"));
        assert!(!LandingField::Risk.same_category("1", "0.0"));
        // No vocabulary: verbatim.
        assert!(!LandingField::Season.same_category("0", "0.0"));
        assert!(LandingField::Season.same_category("1", "1"));
    }

    #[test]
    fn validity_respects_vocabulary() {
        let rec = ObservationRecord {
            risk: Some("maybe".into()),
            reward: Some("yes".into()),
            ..Default::default()
        };
        assert!(!rec.is_valid(LandingField::Risk));
        assert!(rec.is_valid(LandingField::Reward));
        assert!(!rec.is_valid(LandingField::Season));
    }

    #[test]
    fn arrival_values_by_field() {
        let rec = ArrivalRecord {
            month: Some("3".into()),
            rat_minutes: Some(2.5),
            ..Default::default()
        };
        assert_eq!(rec.value(ArrivalField::Month), Some(Value::Label("3")));
        assert_eq!(rec.value(ArrivalField::RatMinutes), Some(Value::Number(2.5)));
        assert_eq!(rec.value(ArrivalField::Time), None);
    }
}
