//! Parse model output into records

use crate::LlmError;
use quarry_domain::Record;
use serde_json::Value;
use tracing::warn;

/// Parse a model's JSON answer into records.
///
/// Accepts a JSON array of objects (one record each), a single object
/// (one record), or `{"records": [...]}`. Non-object array elements are
/// skipped with a warning rather than failing the whole answer.
pub fn parse_records(response: &str) -> Result<Vec<Record>, LlmError> {
    // Models sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| LlmError::InvalidResponse(format!("JSON parse error: {}", e)))?;

    let items = match json {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("records") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(LlmError::InvalidResponse(
                    "'records' is not a JSON array".to_string(),
                ))
            }
            None => vec![Value::Object(obj)],
        },
        other => {
            return Err(LlmError::InvalidResponse(format!(
                "Expected JSON array or object, got {}",
                type_name(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if item.is_object() {
            records.push(Record::new(item));
        } else {
            warn!("Skipping record {}: expected object, got {}", idx, type_name(&item));
        }
    }

    Ok(records)
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, LlmError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(LlmError::InvalidResponse("Empty code block".to_string()));
        }

        // Skip the opening fence (```json or ```) and the closing one
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
