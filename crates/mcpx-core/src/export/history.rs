//! Migration history as a JSON array

use super::ExportError;
use crate::migration::MigrationTask;

/// Serialize finished tasks
///
/// # Errors
/// Returns an error if serialization fails
pub fn export_history(tasks: &[MigrationTask]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Decode an exported history
///
/// # Errors
/// Returns an error if the content is not a JSON array of tasks
pub fn parse_history(content: &str) -> Result<Vec<MigrationTask>, ExportError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_array() {
        return Err(ExportError::UnrecognizedShape("history must be a JSON array".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::TaskStatus;

    #[test]
    fn test_history_round_trip() {
        let mut task = MigrationTask::new("cursor", "codex", Vec::new());
        task.transition(TaskStatus::Cancelled).unwrap();
        let json = export_history(&[task.clone()]).unwrap();
        assert!(json.contains("\"CANCELLED\""));
        assert_eq!(parse_history(&json).unwrap(), vec![task]);
    }

    #[test]
    fn test_history_must_be_array() {
        assert_eq!(parse_history("{}").unwrap_err().code(), "UNRECOGNIZED_SHAPE");
    }
}
