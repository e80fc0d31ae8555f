use thiserror::Error;

/// Rejections of values typed by the user. The state is never modified when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Please fill in both fields")]
    Missing,
    #[error("Please enter a valid number for {field}: {reason}")]
    InvalidNumber { field: &'static str, reason: String },
}

/// Parses a positive whole number of minutes.
pub fn parse_positive_minutes(field: &'static str, input: &str) -> Result<u32, InputError> {
    let input = input.trim();
    let invalid = |reason: &str| InputError::InvalidNumber {
        field,
        reason: reason.into(),
    };
    let value: i64 = input.parse().map_err(|_| invalid("not a whole number"))?;
    if value <= 0 {
        return Err(invalid("must be positive"));
    }
    u32::try_from(value).map_err(|_| invalid("too large"))
}
