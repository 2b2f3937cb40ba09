//! Task priority rank.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Integer-ranked priority. Ordering follows the rank.
///
/// Serialized as the upper-case name, which is what the remote API speaks.
/// Deserialization also accepts the bare rank (`1`..`4`) used by older
/// clients.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "PriorityRepr", into = "&'static str")]
pub enum Priority {
    /// Rank 1.
    Low = 1,
    /// Rank 2.
    #[default]
    Medium = 2,
    /// Rank 3.
    High = 3,
    /// Rank 4.
    Urgent = 4,
}

impl Priority {
    /// The integer rank.
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Looks a priority up by rank.
    #[must_use]
    pub fn from_rank(rank: i64) -> Option<Self> {
        match rank {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            4 => Some(Priority::Urgent),
            _ => None,
        }
    }

    /// Wire name (`LOW`, `MEDIUM`, `HIGH`, `URGENT`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// Returns `true` for `HIGH` and `URGENT`.
    #[must_use]
    pub fn is_high(self) -> bool {
        self >= Priority::High
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Accepts names in any case or the numeric rank.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(rank) = s.parse::<i64>() {
            return Priority::from_rank(rank)
                .ok_or_else(|| format!("unknown priority rank: {rank}"));
        }
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

impl From<Priority> for &'static str {
    fn from(priority: Priority) -> Self {
        priority.as_str()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Rank(i64),
    Name(String),
}

impl TryFrom<PriorityRepr> for Priority {
    type Error = String;

    fn try_from(repr: PriorityRepr) -> Result<Self, Self::Error> {
        match repr {
            PriorityRepr::Rank(rank) => {
                Priority::from_rank(rank).ok_or_else(|| format!("unknown priority rank: {rank}"))
            }
            PriorityRepr::Name(name) => name.parse(),
        }
    }
}
