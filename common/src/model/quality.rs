use serde::{Deserialize, Serialize};

/// Confidence bucket attached to a disclosed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityOptions {
    Audited,
    Reported,
    Estimated,
    Incomplete,
    NoDataFound,
}

impl QualityOptions {
    /// Position in the confidence ranking, highest first. `NoDataFound` has no rank.
    pub fn rank(self) -> Option<u8> {
        match self {
            QualityOptions::Audited => Some(4),
            QualityOptions::Reported => Some(3),
            QualityOptions::Estimated => Some(2),
            QualityOptions::Incomplete => Some(1),
            QualityOptions::NoDataFound => None,
        }
    }
}
