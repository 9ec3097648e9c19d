use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sampling cadence accepted by the `period_type` tool parameter.
///
/// Codes follow the upstream `FK_Periodicidad` convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl PeriodType {
    pub const ALL: [Self; 4] = [Self::Monthly, Self::Quarterly, Self::Semiannual, Self::Annual];

    /// Upstream periodicity code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Semiannual => 6,
            Self::Annual => 12,
        }
    }

    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Monthly),
            3 => Some(Self::Quarterly),
            6 => Some(Self::Semiannual),
            12 => Some(Self::Annual),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Semiannual => "semiannual",
            Self::Annual => "annual",
        }
    }

    /// Spellings accepted by [`FromStr`], in addition to the canonical name.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Monthly => &["m", "mensual"],
            Self::Quarterly => &["q", "t", "trimestral"],
            Self::Semiannual => &["s", "semestral"],
            Self::Annual => &["a", "anual"],
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTypeError(pub String);

impl fmt::Display for PeriodTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown period_type '{}' (expected monthly, quarterly, semiannual or annual)",
            self.0
        )
    }
}

impl std::error::Error for PeriodTypeError {}

impl FromStr for PeriodType {
    type Err = PeriodTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == key || period.aliases().contains(&key.as_str()))
            .ok_or_else(|| PeriodTypeError(value.to_string()))
    }
}
