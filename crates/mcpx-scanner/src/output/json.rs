//! JSON output formatter

use crate::error::Result;
use crate::scan::ScanResult;

/// Convert scan results to a pretty JSON string
///
/// # Errors
/// Returns an error if serialization fails
pub fn to_json(results: &[ScanResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanStatus;

    #[test]
    fn test_camel_case_keys() {
        let results = vec![ScanResult {
            tool_id: "cursor".to_string(),
            tool_name: "Cursor".to_string(),
            found_configs: Vec::new(),
            status: ScanStatus::Failed,
            error_message: Some("No readable configuration file found".to_string()),
        }];
        let json = to_json(&results).unwrap();
        assert!(json.contains("\"toolId\": \"cursor\""));
        assert!(json.contains("\"status\": \"failed\""));
        assert!(json.contains("errorMessage"));
    }
}
