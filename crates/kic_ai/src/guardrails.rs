use kic_core::error::AppError;

use crate::citation::scan_markers;

/// True when the text carries at least one `[doc...]` marker, valid or not.
pub fn has_citation_markers(text: &str) -> bool {
    scan_markers(text).next().is_some()
}

/// Reject model output that cites nothing.
pub fn enforce_citation_markers(output: &str) -> Result<(), AppError> {
    if !has_citation_markers(output) {
        return Err(AppError::new(
            "CITE_REQUIRED",
            "Answer must reference at least one source as [docN]",
        ));
    }
    Ok(())
}
