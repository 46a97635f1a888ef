// Verdict fusion — turns the two detector flags into a bot score.
//
// The rule is a fixed table, not a weighted sum: agreement between two
// detectors that look at the data in unrelated ways is the strongest signal
// available, and one detector alone is worth a closer look but no more.
//
//   isolation  clustering  score  classification
//   ---------  ----------  -----  ----------------
//   yes        yes         2      High Suspicion
//   yes        no          1      Medium Suspicion
//   no         yes         1      Medium Suspicion
//   no         no          0      Normal

use serde::{Deserialize, Serialize};

use crate::detect::AnomalyVerdict;

/// Suspicion level of a single comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Medium Suspicion")]
    MediumSuspicion,
    #[serde(rename = "High Suspicion")]
    HighSuspicion,
}

impl Classification {
    /// Number of detectors that flagged the comment.
    pub fn bot_score(&self) -> u8 {
        match self {
            Classification::Normal => 0,
            Classification::MediumSuspicion => 1,
            Classification::HighSuspicion => 2,
        }
    }

    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Classification::Normal,
            1 => Classification::MediumSuspicion,
            _ => Classification::HighSuspicion,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Normal => "Normal",
            Classification::MediumSuspicion => "Medium Suspicion",
            Classification::HighSuspicion => "High Suspicion",
        }
    }

    pub fn is_suspicious(&self) -> bool {
        *self != Classification::Normal
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fuse two detector flags.
pub fn classify(flagged_by_isolation: bool, flagged_by_clustering: bool) -> Classification {
    Classification::from_score(flagged_by_isolation as u8 + flagged_by_clustering as u8)
}

/// Fuse an ensemble verdict.
pub fn classify_verdict(verdict: &AnomalyVerdict) -> Classification {
    classify(verdict.flagged_by_isolation, verdict.flagged_by_clustering)
}
