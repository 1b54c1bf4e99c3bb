//! Letter-grade conversion for factor ratings.
//!
//! Grades map A+ down to F onto a 13..1 rank, normalized to [0, 1].
//! Missing or unrecognized grades are neutral (0.5).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Factor letter grade, A+ (best) through F (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Numeric rank: A+ = 13 down to F = 1.
    pub fn rank(&self) -> u8 {
        match self {
            LetterGrade::APlus => 13,
            LetterGrade::A => 12,
            LetterGrade::AMinus => 11,
            LetterGrade::BPlus => 10,
            LetterGrade::B => 9,
            LetterGrade::BMinus => 8,
            LetterGrade::CPlus => 7,
            LetterGrade::C => 6,
            LetterGrade::CMinus => 5,
            LetterGrade::DPlus => 4,
            LetterGrade::D => 3,
            LetterGrade::DMinus => 2,
            LetterGrade::F => 1,
        }
    }

    /// Normalized score: A+ = 1.0, F = 0.0.
    pub fn normalized(&self) -> f64 {
        (self.rank() as f64 - 1.0) / 12.0
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterGrade {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A+" => Ok(LetterGrade::APlus),
            "A" => Ok(LetterGrade::A),
            "A-" => Ok(LetterGrade::AMinus),
            "B+" => Ok(LetterGrade::BPlus),
            "B" => Ok(LetterGrade::B),
            "B-" => Ok(LetterGrade::BMinus),
            "C+" => Ok(LetterGrade::CPlus),
            "C" => Ok(LetterGrade::C),
            "C-" => Ok(LetterGrade::CMinus),
            "D+" => Ok(LetterGrade::DPlus),
            "D" => Ok(LetterGrade::D),
            "D-" => Ok(LetterGrade::DMinus),
            "F" => Ok(LetterGrade::F),
            _ => Err(()),
        }
    }
}

/// Normalized score for an optional grade. None is neutral (0.5).
pub fn grade_norm(grade: Option<LetterGrade>) -> f64 {
    grade.map(|g| g.normalized()).unwrap_or(0.5)
}

/// Numeric rank for an optional grade. None maps to 0.
pub fn grade_rank(grade: Option<LetterGrade>) -> u8 {
    grade.map(|g| g.rank()).unwrap_or(0)
}
