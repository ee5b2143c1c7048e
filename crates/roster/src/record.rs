use framework::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies one trainer. Unique across a roster and stable for the
/// life of the record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainerId(pub i64);

impl Display for TrainerId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything known about a single trainer.
///
/// Fields missing from a fixture document deserialize to empty
/// values, so a partial record still renders.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerRecord {
    pub id: TrainerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// Free-text skill labels, in display order.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Link to the trainer's resume.
    #[serde(default)]
    pub resume: String,
    /// Link to the trainer's professional network profile.
    #[serde(default)]
    pub linkedin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_experience: Option<String>,
    #[serde(default)]
    pub certificates: Vec<String>,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub travel_preference: TravelPreference,
    #[serde(default)]
    pub admin_metadata: AdminMetadata,
}

impl TrainerRecord {
    /// `false` only when the travel preference is `Remote`.
    pub fn willing_to_travel(&self) -> bool {
        self.travel_preference.willing_to_travel()
    }
}

/// Hourly and daily rates in dollars.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub hourly: Rate,
    #[serde(default)]
    pub daily: Rate,
}

impl Pricing {
    /// Formats both rates the way the trainer table shows them,
    /// e.g. `$50/hr | $300/day`.
    pub fn summary(&self) -> String {
        format!("${}/hr | ${}/day", self.hourly, self.daily)
    }
}

/// A non-negative amount of money. Fractions are allowed.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rate(f64);

impl Rate {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            // -0.0 passes the check; store it as 0
            Ok(Self(value.abs()))
        } else {
            Err(Error::Validation(format!("rate {value} must be a non-negative amount")))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rate {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<u32> for Rate {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl From<Rate> for f64 {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

/// Whole amounts print without a fraction; others print up to cents
/// with trailing zeros dropped (`50`, `49.5`, `12.25`).
impl Display for Rate {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            return write!(f, "{}", self.0);
        }
        let cents = format!("{:.2}", self.0);
        f.write_str(cents.trim_end_matches('0').trim_end_matches('.'))
    }
}

/// Where a trainer is prepared to work. `Remote` means the trainer
/// won't travel; every other label is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TravelPreference {
    Remote,
    Location(String),
}

impl TravelPreference {
    pub fn willing_to_travel(&self) -> bool {
        !matches!(self, Self::Remote)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Remote => "Remote",
            Self::Location(label) => label,
        }
    }
}

impl Default for TravelPreference {
    fn default() -> Self {
        Self::Location(String::new())
    }
}

impl From<String> for TravelPreference {
    fn from(value: String) -> Self {
        if value == "Remote" {
            Self::Remote
        } else {
            Self::Location(value)
        }
    }
}

impl From<&str> for TravelPreference {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TravelPreference> for String {
    fn from(value: TravelPreference) -> Self {
        value.label().to_string()
    }
}

impl Display for TravelPreference {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A 0-100 rating.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or_else(|| Error::Validation(format!("score {value} is outside 0-{}", Self::MAX)))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        i64::from(score.0)
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// Fields only administrators should see.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMetadata {
    #[serde(default)]
    pub communication_score: Score,
    #[serde(default)]
    pub expertise_score: Score,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub priority: Score,
    #[serde(default)]
    pub comments: String,
}
