use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionKind {
    Membership,
    Research,
    Nomination,
    Suggestion,
    BankOfIdeas,
}

impl SubmissionKind {
    pub const ALL: [SubmissionKind; 5] = [
        SubmissionKind::Membership,
        SubmissionKind::Research,
        SubmissionKind::Nomination,
        SubmissionKind::Suggestion,
        SubmissionKind::BankOfIdeas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Membership => "membership",
            SubmissionKind::Research => "research",
            SubmissionKind::Nomination => "nomination",
            SubmissionKind::Suggestion => "suggestion",
            SubmissionKind::BankOfIdeas => "bank-of-ideas",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown submission kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for SubmissionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase().replace('_', "-");
        match lower.as_str() {
            "membership" => Ok(SubmissionKind::Membership),
            "research" => Ok(SubmissionKind::Research),
            "nomination" => Ok(SubmissionKind::Nomination),
            "suggestion" | "general-suggestion" => Ok(SubmissionKind::Suggestion),
            "bank-of-ideas" | "ideas" => Ok(SubmissionKind::BankOfIdeas),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubmissionKind;
    use std::str::FromStr;

    #[test]
    fn kind_parses_labels_and_aliases() {
        for kind in SubmissionKind::ALL {
            assert_eq!(SubmissionKind::from_str(kind.as_str()), Ok(kind));
        }
        assert_eq!(
            SubmissionKind::from_str("Bank_Of_Ideas"),
            Ok(SubmissionKind::BankOfIdeas)
        );
        assert!(SubmissionKind::from_str("newsletter").is_err());
    }
}
