//! Structural checks a script must pass before it is run.

use crate::loadtest::error::ValidationError;
use crate::loadtest::model::Script;

/// Validates that a script exists, has at least one step, and that every
/// step names a method and a URL.
///
/// `id` is used in the not-found error when `script` is `None`.
pub fn validate_script(id: &str, script: Option<&Script>) -> Result<(), ValidationError> {
    let script = script.ok_or_else(|| ValidationError::ScriptNotFound { id: id.to_owned() })?;

    if script.steps.is_empty() {
        return Err(ValidationError::NoSteps);
    }

    for (i, step) in script.steps.iter().enumerate() {
        if step.url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl { step: i + 1 });
        }
        if step.method.trim().is_empty() {
            return Err(ValidationError::EmptyMethod { step: i + 1 });
        }
    }

    Ok(())
}
