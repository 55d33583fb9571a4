use crate::extractor::errors::ExtractionFailure;

/// Minimum body length, in characters. Anything shorter is a failed
/// extraction, never a thin success.
pub const MIN_CONTENT_LENGTH: usize = 100;

pub fn ensure_sufficient(body: &str) -> Result<(), ExtractionFailure> {
    let length = body.trim().chars().count();
    if length < MIN_CONTENT_LENGTH {
        return Err(ExtractionFailure::InsufficientContent { length });
    }
    Ok(())
}
