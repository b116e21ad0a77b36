//! Performance Level labels and the fixed CGPA bins they come from.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// PERFORMANCE LEVEL
// ============================================================================

/// Three-class academic performance target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Low,
    Medium,
    High,
}

impl PerformanceLevel {
    /// Fixed label set, in bin order
    pub const ALL: [PerformanceLevel; 3] = [
        PerformanceLevel::Low,
        PerformanceLevel::Medium,
        PerformanceLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Low => "Low",
            PerformanceLevel::Medium => "Medium",
            PerformanceLevel::High => "High",
        }
    }

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        match self {
            PerformanceLevel::Low => 0,
            PerformanceLevel::Medium => 1,
            PerformanceLevel::High => 2,
        }
    }
}

impl std::fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown performance level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for PerformanceLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(PerformanceLevel::Low),
            "Medium" => Ok(PerformanceLevel::Medium),
            "High" => Ok(PerformanceLevel::High),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

// ============================================================================
// CGPA BINS
// ============================================================================

/// Bump whenever `DEFAULT_EDGES` changes
pub const BINS_VERSION: u8 = 1;

/// (-1, 2.0] → Low, (2.0, 3.0] → Medium, (3.0, 4.1] → High
pub const DEFAULT_EDGES: [f64; 4] = [-1.0, 2.0, 3.0, 4.1];

/// Right-inclusive bins: each interval is `(edges[i], edges[i + 1]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CgpaBins {
    pub version: u8,
    pub edges: [f64; 4],
}

impl Default for CgpaBins {
    fn default() -> Self {
        Self {
            version: BINS_VERSION,
            edges: DEFAULT_EDGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BinError {
    #[error("CGPA {value} is outside the labelled range ({lower}, {upper}]")]
    OutOfRange { value: f64, lower: f64, upper: f64 },
    #[error("CGPA value is not a finite number")]
    NotFinite,
}

impl CgpaBins {
    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    pub fn upper(&self) -> f64 {
        self.edges[3]
    }

    /// Map a CGPA onto exactly one level, or fail if no bin covers it
    pub fn level_for(&self, cgpa: f64) -> Result<PerformanceLevel, BinError> {
        if !cgpa.is_finite() {
            return Err(BinError::NotFinite);
        }

        PerformanceLevel::ALL
            .iter()
            .zip(self.edges.windows(2))
            .find(|(_, w)| cgpa > w[0] && cgpa <= w[1])
            .map(|(level, _)| *level)
            .ok_or(BinError::OutOfRange {
                value: cgpa,
                lower: self.lower(),
                upper: self.upper(),
            })
    }
}
