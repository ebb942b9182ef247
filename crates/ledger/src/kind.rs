use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Direction of a ledger row.
///
/// Both categories and one-off entries carry a kind, and reports split
/// totals by it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Expense,
    Income,
}

impl EntryKind {
    /// Returns the canonical kind string stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(LedgerError::Validation(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_strings() {
        assert_eq!(EntryKind::try_from("expense"), Ok(EntryKind::Expense));
        assert_eq!(EntryKind::try_from("income"), Ok(EntryKind::Income));
        assert_eq!(EntryKind::Expense.as_str(), "expense");
        assert_eq!(EntryKind::Income.as_str(), "income");
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(EntryKind::try_from("transfer").is_err());
    }
}
