use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChanjoError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Baby not found: {0}")]
    BabyNotFound(String),

    #[error("Dose is not due yet: {0}")]
    DoseLocked(String),
}
