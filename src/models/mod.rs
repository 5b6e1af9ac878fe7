/// # Email Address Under Validation
///
/// The value threaded through every validation step. Steps consume an
/// address and produce a new one; nothing is mutated in place.
pub mod address;

/// # Email Validation Response
///
/// Serializable `{ is_valid, status, error }` summary of a finished pipeline.
///
/// ## Example JSON
/// ```json
/// {
///   "is_valid": true,
///   "status": "VALID",
///   "error": null,
///   "address": { "raw": "a@b.c", "normalized": "a@b.c" }
/// }
/// ```
pub mod response;
