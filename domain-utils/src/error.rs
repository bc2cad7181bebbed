use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Domain declares no issues")]
    EmptyDomain,
    #[error("Issue '{0}' declares no values")]
    EmptyIssue(String),
    #[error("Issue '{issue}' declares value '{value}' more than once")]
    DuplicateValue { issue: String, value: String },
    #[error("Bid assigns {got} values, but the domain declares {expected} issues")]
    IssueCountMismatch { expected: usize, got: usize },
    #[error("Value '{value}' does not belong to issue '{issue}'")]
    UnknownValue { issue: String, value: String },
    #[error("Issue weights sum to {0}, expected 1.0")]
    WeightsNotNormalized(f64),
    #[error("Negative weight {weight} for issue '{issue}'")]
    NegativeWeight { issue: String, weight: f64 },
    #[error("Evaluation score {score} for '{issue}/{value}' is outside [0, 1]")]
    ScoreOutOfRange {
        issue: String,
        value: String,
        score: f64,
    },
    #[error("Utility space shape doesn't match the domain: {0}")]
    ShapeMismatch(String),
}
