//! Result type alias for portable case operations

use super::errors::PortableCaseError;

/// Result type alias using `PortableCaseError` as the error type
///
/// # Examples
///
/// ```
/// use portable_case::domain::result::Result;
/// use portable_case::domain::errors::PortableCaseError;
///
/// fn failing_function() -> Result<()> {
///     Err(PortableCaseError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PortableCaseError>;
