//! Loan status values and the transition rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// The status carried by a record.
///
/// `Initiated` is reserved for the genesis record; every later record
/// carries one of the remaining five values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Initiated,
    Accepted,
    Paid,
    Unpaid,
    Completed,
    Closed,
}

impl LoanStatus {
    /// Every status, genesis first.
    pub const ALL: [LoanStatus; 6] = [
        LoanStatus::Initiated,
        LoanStatus::Accepted,
        LoanStatus::Paid,
        LoanStatus::Unpaid,
        LoanStatus::Completed,
        LoanStatus::Closed,
    ];

    /// Statuses accepted by a transition.
    pub const TRANSITIONS: [LoanStatus; 5] = [
        LoanStatus::Accepted,
        LoanStatus::Paid,
        LoanStatus::Unpaid,
        LoanStatus::Completed,
        LoanStatus::Closed,
    ];

    /// The wire form. Also the form mixed into link hashes.
    pub const fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Initiated => "initiated",
            LoanStatus::Accepted => "accepted",
            LoanStatus::Paid => "paid",
            LoanStatus::Unpaid => "unpaid",
            LoanStatus::Completed => "completed",
            LoanStatus::Closed => "closed",
        }
    }

    /// Whether this is the genesis status.
    pub const fn is_genesis(self) -> bool {
        matches!(self, LoanStatus::Initiated)
    }

    /// Parse a status supplied to a transition.
    ///
    /// Rejects unknown values and the genesis-only `initiated`.
    pub fn parse_transition(s: &str) -> Result<Self, ValidationError> {
        let status: LoanStatus = s.parse()?;
        if status.is_genesis() {
            return Err(ValidationError::ReservedStatus(status.as_str().into()));
        }
        Ok(status)
    }
}

impl FromStr for LoanStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoanStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_owned()))
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        for status in LoanStatus::ALL {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "cancelled".parse::<LoanStatus>().unwrap_err();
        assert_eq!(err, ValidationError::InvalidStatus("cancelled".into()));

        // Case sensitive, like the wire format.
        assert!("Accepted".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_transition_rejects_initiated() {
        assert!(matches!(
            LoanStatus::parse_transition("initiated"),
            Err(ValidationError::ReservedStatus(_))
        ));
        for status in LoanStatus::TRANSITIONS {
            assert_eq!(LoanStatus::parse_transition(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LoanStatus::Unpaid).unwrap();
        assert_eq!(json, "\"unpaid\"");
    }
}
