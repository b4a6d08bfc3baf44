use serde_json::Value;

use crate::error::JqError;

/// Split text into its whitespace-separated JSON documents.
///
/// Documents are parsed one at a time as the iterator is pulled. After a
/// malformed document the iterator yields its error and then ends, since
/// nothing after it can be located reliably.
pub fn documents(input: &str) -> impl Iterator<Item = Result<Value, JqError>> + '_ {
    serde_json::Deserializer::from_str(input)
        .into_iter::<Value>()
        .map(|item| item.map_err(|e| JqError::InvalidJson(e.to_string())))
}
