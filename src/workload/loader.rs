//! Workload Loading
//!
//! Reads a workload document from disk. The document must be a top-level
//! sequence; each element is deserialized into one work unit. JSON is a
//! subset of YAML, so both formats go through the same parser.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::execution::error::ExecutionError;

/// Loads a workload file into a vector of units.
///
/// # Errors
///
/// * [`ExecutionError::Io`] - the file could not be read
/// * [`ExecutionError::Parse`] - the document or one of its units is malformed
/// * [`ExecutionError::InvalidWorkload`] - the document is not a sequence
///
/// # Example
///
/// ```rust,no_run
/// use chunkrunner::workload::load_workload;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sequences: Vec<String> = load_workload("reads.yaml")?;
///     println!("Loaded {} units", sequences.len());
///     Ok(())
/// }
/// ```
pub fn load_workload<U, P>(path: P) -> Result<Vec<U>, ExecutionError>
where
    U: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let display = path.display().to_string();

    info!("Loading workload from: {}", display);

    let content = fs::read_to_string(path).map_err(|source| ExecutionError::Io {
        path: display.clone(),
        source,
    })?;

    debug!("Workload content loaded ({} bytes)", content.len());

    parse_workload(&content, &display)
}

/// Parses workload text. `origin` names the source in error messages.
pub fn parse_workload<U>(content: &str, origin: &str) -> Result<Vec<U>, ExecutionError>
where
    U: DeserializeOwned,
{
    let document: Value = serde_yaml::from_str(content).map_err(|e| ExecutionError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })?;

    let items = match document {
        Value::Sequence(items) => items,
        other => {
            return Err(ExecutionError::InvalidWorkload(format!(
                "'{}' must contain a sequence of units, found {}",
                origin,
                describe(&other)
            )))
        }
    };

    let units = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_yaml::from_value(item).map_err(|e| ExecutionError::Parse {
                path: origin.to_string(),
                message: format!("unit {}: {}", index, e),
            })
        })
        .collect::<Result<Vec<U>, _>>()?;

    info!("Loaded {} units from {}", units.len(), origin);
    Ok(units)
}

/// Human-readable name of a YAML node kind.
fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
