use thiserror::Error;

use super::types::SweepParam;
use super::valuation::Tier;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    FiniteNonNegative,
    Positive,
    AtMostOne,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::FiniteNonNegative => f.write_str("must be finite and >= 0"),
            Constraint::Positive => f.write_str("must be > 0"),
            Constraint::AtMostOne => f.write_str("must be <= 1"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("invalid scenario: {}", join_violations(.violations))]
    Invalid { violations: Vec<FieldViolation> },
}

impl ScenarioError {
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ScenarioError::Invalid { violations } => violations,
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SweepError {
    #[error("sweep over {param} has no values")]
    EmptyValues { param: SweepParam },

    #[error("invalid range for {param}: {reason}")]
    InvalidRange { param: SweepParam, reason: String },

    #[error("sweep aborted at {param} = {value}: {source}")]
    Scenario {
        param: SweepParam,
        value: f64,
        #[source]
        source: ScenarioError,
    },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValuationError {
    #[error("invalid tier '{given}', use one of: basic, mid, high")]
    InvalidTier { given: String },

    #[error("tier table has no entry for {0}")]
    MissingTier(Tier),

    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },
}
