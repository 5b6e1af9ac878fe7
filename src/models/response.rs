use crate::models::address::Address;
use crate::outcome::Outcome;
use serde::Serialize;

/// Error details carried by a failed [`EmailValidationResponse`]
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmailValidationError {
    /// Error code: EMPTY, TOO_SHORT, INVALID_FORMAT or NOT_ALLOWED
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// # Email Validation Response
///
/// Serializable summary of a finished pipeline, built from its final
/// [`Outcome`].
///
/// ## Example JSON
/// ```json
/// {
///   "is_valid": false,
///   "status": null,
///   "error": {
///     "code": "INVALID_FORMAT",
///     "message": "Invalid email format"
///   },
///   "address": null
/// }
/// ```
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmailValidationResponse {
    pub is_valid: bool,
    /// "VALID" when the pipeline succeeded, otherwise null
    pub status: Option<String>,
    pub error: Option<EmailValidationError>,
    /// The enriched address when the pipeline succeeded
    pub address: Option<Address>,
}

impl From<Outcome<Address>> for EmailValidationResponse {
    fn from(outcome: Outcome<Address>) -> Self {
        match outcome {
            Outcome::Success(address) => EmailValidationResponse {
                is_valid: true,
                status: Some("VALID".to_string()),
                error: None,
                address: Some(address),
            },
            Outcome::Failure(failure) => EmailValidationResponse {
                is_valid: false,
                status: None,
                error: Some(EmailValidationError {
                    code: failure.kind.code().to_string(),
                    message: failure.message,
                }),
                address: None,
            },
        }
    }
}
