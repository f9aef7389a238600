use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::FeatureRow;
use crate::error::{DashboardError, Result};

/// Label column of the historical dataset.
pub const LABEL_COLUMN: &str = "Survived";

/// Feature columns, in the order the canonical model expects them.
pub const FEATURE_COLUMNS: [&str; 7] = ["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare", "Embarked"];

/// All dataset columns: label first, then the features.
pub const COLUMNS: [&str; 8] = [
    LABEL_COLUMN,
    "Pclass",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Fare",
    "Embarked",
];

// ---------------------------------------------------------------------------
// Categorical codes
// ---------------------------------------------------------------------------

/// Ticket class, encoded 1/2/3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    pub const ALL: [PassengerClass; 3] = [Self::First, Self::Second, Self::Third];

    pub fn code(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            _ => None,
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "1st"),
            Self::Second => write!(f, "2nd"),
            Self::Third => write!(f, "3rd"),
        }
    }
}

/// Encoded 0 = male, 1 = female.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Self::Male, Self::Female];

    pub fn code(self) -> u8 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Male),
            1 => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

/// Port of embarkation, encoded 0/1/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Cherbourg,
    Queenstown,
    Southampton,
}

impl Port {
    pub const ALL: [Port; 3] = [Self::Cherbourg, Self::Queenstown, Self::Southampton];

    pub fn code(self) -> u8 {
        match self {
            Self::Cherbourg => 0,
            Self::Queenstown => 1,
            Self::Southampton => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Cherbourg),
            1 => Some(Self::Queenstown),
            2 => Some(Self::Southampton),
            _ => None,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cherbourg => write!(f, "Cherbourg"),
            Self::Queenstown => write!(f, "Queenstown"),
            Self::Southampton => write!(f, "Southampton"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one untyped row as it comes out of a file
// ---------------------------------------------------------------------------

/// A row before validation. Every cell is read as `f64` so that files written
/// with float-typed code columns (`3.0`) still load.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(rename = "Survived")]
    pub survived: f64,
    #[serde(rename = "Pclass")]
    pub pclass: f64,
    #[serde(rename = "Sex")]
    pub sex: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "SibSp")]
    pub sibsp: f64,
    #[serde(rename = "Parch")]
    pub parch: f64,
    #[serde(rename = "Fare")]
    pub fare: f64,
    #[serde(rename = "Embarked")]
    pub embarked: f64,
}

// ---------------------------------------------------------------------------
// PassengerFeatures / PassengerRecord
// ---------------------------------------------------------------------------

/// The seven model inputs describing one passenger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerFeatures {
    pub pclass: PassengerClass,
    pub sex: Sex,
    pub age: f64,
    pub sibsp: u32,
    pub parch: u32,
    pub fare: f64,
    pub embarked: Port,
}

impl PassengerFeatures {
    /// Check the bounds the prediction form enforces.
    pub fn validate(&self) -> Result<()> {
        check_range("Age", self.age, 0.0, 80.0, "[0, 80]")?;
        check_range("SibSp", self.sibsp as f64, 0.0, 10.0, "[0, 10]")?;
        check_range("Parch", self.parch as f64, 0.0, 10.0, "[0, 10]")?;
        check_range("Fare", self.fare, 0.0, 600.0, "[0.0, 600.0]")?;
        Ok(())
    }

    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn values(&self) -> [f64; 7] {
        [
            self.pclass.code() as f64,
            self.sex.code() as f64,
            self.age,
            self.sibsp as f64,
            self.parch as f64,
            self.fare,
            self.embarked.code() as f64,
        ]
    }

    /// Named inference row holding all seven features.
    pub fn feature_row(&self) -> FeatureRow {
        FEATURE_COLUMNS
            .iter()
            .zip(self.values())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

fn check_range(field: &'static str, value: f64, lo: f64, hi: f64, range: &'static str) -> Result<()> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(DashboardError::InputOutOfRange { field, value, range })
    }
}

/// One historical passenger: features plus the survival label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerRecord {
    pub features: PassengerFeatures,
    pub survived: bool,
}

impl PassengerRecord {
    /// Validate a raw row. `row` is zero-based and only used in the error.
    pub fn try_from_raw(row: usize, raw: &RawRecord) -> Result<Self> {
        let survived = match integral(row, "Survived", raw.survived)? {
            0 => false,
            1 => true,
            other => return Err(invalid(row, format!("Survived = {other}, expected 0 or 1"))),
        };
        let pclass = PassengerClass::from_code(integral(row, "Pclass", raw.pclass)?)
            .ok_or_else(|| invalid(row, format!("Pclass = {}, expected 1, 2 or 3", raw.pclass)))?;
        let sex = Sex::from_code(integral(row, "Sex", raw.sex)?)
            .ok_or_else(|| invalid(row, format!("Sex = {}, expected 0 or 1", raw.sex)))?;
        let embarked = Port::from_code(integral(row, "Embarked", raw.embarked)?)
            .ok_or_else(|| invalid(row, format!("Embarked = {}, expected 0, 1 or 2", raw.embarked)))?;

        let age = non_negative(row, "Age", raw.age)?;
        let fare = non_negative(row, "Fare", raw.fare)?;
        let sibsp = count(row, "SibSp", raw.sibsp)?;
        let parch = count(row, "Parch", raw.parch)?;

        Ok(PassengerRecord {
            features: PassengerFeatures {
                pclass,
                sex,
                age,
                sibsp,
                parch,
                fare,
                embarked,
            },
            survived,
        })
    }

    pub fn label(&self) -> u8 {
        u8::from(self.survived)
    }

    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [f64; 8] {
        let f = self.features.values();
        [self.label() as f64, f[0], f[1], f[2], f[3], f[4], f[5], f[6]]
    }
}

fn invalid(row: usize, reason: String) -> DashboardError {
    DashboardError::InvalidRecord { row, reason }
}

fn integral(row: usize, column: &str, value: f64) -> Result<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(invalid(row, format!("{column} = {value} is not an integer code")))
    }
}

fn non_negative(row: usize, column: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(row, format!("{column} = {value} must be a non-negative number")))
    }
}

fn count(row: usize, column: &str, value: f64) -> Result<u32> {
    let v = integral(row, column, value)?;
    u32::try_from(v).map_err(|_| invalid(row, format!("{column} = {v} must be a non-negative count")))
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The validated passenger table. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<PassengerRecord>,
    /// Column names of the source table, unused ones included.
    columns: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<PassengerRecord>) -> Self {
        Dataset {
            records,
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Replace the recorded source columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Validate raw rows, failing on the first malformed one.
    pub fn from_raw(rows: &[RawRecord]) -> Result<Self> {
        rows.iter()
            .enumerate()
            .map(|(i, raw)| PassengerRecord::try_from_raw(i, raw))
            .collect::<Result<Vec<_>>>()
            .map(Dataset::new)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of source columns other than the label.
    pub fn feature_count(&self) -> usize {
        self.columns.iter().filter(|c| c.as_str() != LABEL_COLUMN).count()
    }

    /// Extract one column as `f64` values.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.records.iter().map(|r| r.values()[index]).collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(PassengerRecord::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pclass: f64, embarked: f64) -> RawRecord {
        RawRecord {
            survived: 1.0,
            pclass,
            sex: 1.0,
            age: 29.5,
            sibsp: 1.0,
            parch: 0.0,
            fare: 71.2833,
            embarked,
        }
    }

    #[test]
    fn float_typed_codes_are_accepted() {
        let rec = PassengerRecord::try_from_raw(0, &raw(3.0, 2.0)).unwrap();
        assert_eq!(rec.features.pclass, PassengerClass::Third);
        assert_eq!(rec.features.embarked, Port::Southampton);
        assert!(rec.survived);
    }

    #[test]
    fn out_of_set_codes_are_rejected() {
        let err = PassengerRecord::try_from_raw(4, &raw(4.0, 0.0)).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRecord { row: 4, .. }));

        let err = PassengerRecord::try_from_raw(0, &raw(1.0, 3.0)).unwrap_err();
        assert!(err.to_string().contains("Embarked"));
    }

    #[test]
    fn fractional_counts_and_negative_fares_are_rejected() {
        let mut r = raw(1.0, 0.0);
        r.sibsp = 0.5;
        assert!(PassengerRecord::try_from_raw(0, &r).is_err());

        let mut r = raw(1.0, 0.0);
        r.fare = -1.0;
        assert!(PassengerRecord::try_from_raw(0, &r).is_err());

        let mut r = raw(1.0, 0.0);
        r.age = f64::NAN;
        assert!(PassengerRecord::try_from_raw(0, &r).is_err());
    }

    #[test]
    fn values_follow_column_order() {
        let rec = PassengerRecord::try_from_raw(0, &raw(2.0, 1.0)).unwrap();
        assert_eq!(rec.values(), [1.0, 2.0, 1.0, 29.5, 1.0, 0.0, 71.2833, 1.0]);
        let row = rec.features.feature_row();
        assert_eq!(row.get("Fare"), Some(71.2833));
        assert_eq!(row.len(), 7);
    }

    #[test]
    fn feature_count_follows_the_source_columns() {
        let rec = PassengerRecord::try_from_raw(0, &raw(2.0, 1.0)).unwrap();
        let ds = Dataset::new(vec![rec]);
        assert_eq!(ds.feature_count(), 7);

        let mut columns = vec!["PassengerId".to_string()];
        columns.extend(COLUMNS.iter().map(|c| c.to_string()));
        assert_eq!(ds.with_columns(columns).feature_count(), 8);
    }

    #[test]
    fn form_bounds_are_enforced() {
        let mut f = PassengerRecord::try_from_raw(0, &raw(1.0, 0.0)).unwrap().features;
        assert!(f.validate().is_ok());
        f.fare = 600.5;
        assert!(matches!(
            f.validate(),
            Err(DashboardError::InputOutOfRange { field: "Fare", .. })
        ));
    }
}
