//! Reference data documents. Each document is either a bare JSON array or an object
//! wrapping the array under the data set name (`{ "items": [...] }`).

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const ITEMS_FILE: &str = "items.json";
pub const BOSSES_FILE: &str = "bosses.json";
pub const SPECIAL_ATTACKS_FILE: &str = "special_attacks.json";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{path}': expected a JSON array or {{ \"{key}\": [...] }}")]
    Shape { path: PathBuf, key: String },
}

/// Parse a data set document from raw JSON text.
pub fn parse_dataset<T: DeserializeOwned>(
    raw: &str,
    key: &str,
    path: &Path,
) -> Result<Vec<T>, LoadError> {
    let payload: Value = serde_json::from_str(raw).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = match payload {
        Value::Array(_) => payload,
        Value::Object(mut object) => object.remove(key).ok_or_else(|| LoadError::Shape {
            path: path.to_path_buf(),
            key: key.to_string(),
        })?,
        _ => {
            return Err(LoadError::Shape {
                path: path.to_path_buf(),
                key: key.to_string(),
            })
        }
    };
    serde_json::from_value(entries).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
