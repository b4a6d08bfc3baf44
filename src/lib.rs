//! jq-compatible JSON querying.
//!
//! ```
//! use serde_json::json;
//!
//! let input = json!({"items": [{"id": 1}, {"id": 2}]});
//! let ids = jqpath::evaluate(".items[].id", &input).unwrap();
//! assert_eq!(ids, vec![json!(1), json!(2)]);
//! ```

pub mod error;
pub mod output;
pub mod query;
pub mod stream;

pub use error::JqError;
pub use query::evaluate;
