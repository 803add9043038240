use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar month used to key base rates and trend tallies.
///
/// Ordering is chronological (year first, then month), which is what the
/// quarterly roll-up relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-indexed month (January = 1)
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month immediately after this one
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Calendar quarter, 1..=4
    pub fn quarter(self) -> u32 {
        self.month.div_ceil(3)
    }

    /// Quarter key in the `<year>-Q<n>` form used by the trend report
    pub fn quarter_key(self) -> String {
        format!("{}-Q{}", self.year, self.quarter())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

/// Final adjudication outcome of a synthetic claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    Paid,
    Denied,
    #[serde(rename = "No Response")]
    NoResponse,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Paid => "Paid",
            ClaimStatus::Denied => "Denied",
            ClaimStatus::NoResponse => "No Response",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientGender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// Sampled claim attributes, before a denial probability or status exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAttributes {
    pub submission_date: NaiveDate,
    pub payer: String,
    pub specialty: String,
    pub cpt_code: u32,
    pub icd10_code: String,
    /// Violated payer rule ids, in rule-catalog order
    pub payer_rules_violated: Vec<u32>,
    pub amount_billed: Decimal,
    pub patient_age: u8,
    pub patient_gender: PatientGender,
}

impl ClaimAttributes {
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.submission_date)
    }
}

/// Synthetic claim record.
///
/// `denial_probability` and `status` are produced together by a single
/// generation pass and are only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub claim_id: u64,
    #[serde(flatten)]
    pub attributes: ClaimAttributes,
    pub denial_probability: f64,
    pub status: ClaimStatus,
}

impl Claim {
    pub fn is_denied(&self) -> bool {
        self.status == ClaimStatus::Denied
    }

    pub fn month(&self) -> YearMonth {
        self.attributes.month()
    }

    pub fn violates(&self, rule_id: u32) -> bool {
        self.attributes.payer_rules_violated.contains(&rule_id)
    }
}
