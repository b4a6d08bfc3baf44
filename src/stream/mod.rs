pub mod json;

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::JqError;

/// One input source, fully read into memory before evaluation.
#[derive(Debug, Clone)]
pub struct Input {
    /// Name used in diagnostics: the file path, or `<stdin>`.
    pub name: String,
    pub text: String,
}

impl Input {
    pub fn from_path(path: &Path) -> Result<Self, JqError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Input {
            name: path.display().to_string(),
            text,
        })
    }

    pub fn from_reader(name: &str, mut reader: impl Read) -> Result<Self, JqError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Input {
            name: name.to_string(),
            text,
        })
    }

    pub fn documents(&self) -> impl Iterator<Item = Result<Value, JqError>> + '_ {
        json::documents(&self.text)
    }
}

/// Gather the documents of every input, in order, into one array.
pub fn slurp(inputs: &[Input]) -> Result<Value, JqError> {
    let mut all = Vec::new();
    for input in inputs {
        for doc in input.documents() {
            all.push(doc?);
        }
    }
    log::debug!("slurped {} document(s) from {} input(s)", all.len(), inputs.len());
    Ok(Value::Array(all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn reads_from_reader() {
        let input = Input::from_reader("<stdin>", "{\"a\":1}".as_bytes()).unwrap();
        assert_eq!(input.name, "<stdin>");
        let docs: Vec<Value> = input.documents().collect::<Result<_, _>>().unwrap();
        assert_eq!(docs, vec![json!({"a": 1})]);
    }

    #[test]
    fn reads_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1] [2]").unwrap();
        let input = Input::from_path(file.path()).unwrap();
        assert_eq!(input.documents().count(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Input::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, JqError::Io(_)));
    }

    #[test]
    fn slurp_spans_inputs() {
        let inputs = vec![
            Input::from_reader("a", "1 2".as_bytes()).unwrap(),
            Input::from_reader("b", "{\"x\":3}".as_bytes()).unwrap(),
        ];
        assert_eq!(slurp(&inputs).unwrap(), json!([1, 2, {"x": 3}]));
    }

    #[test]
    fn slurp_of_nothing_is_empty_array() {
        assert_eq!(slurp(&[]).unwrap(), json!([]));
    }

    #[test]
    fn slurp_fails_on_invalid_json() {
        let inputs = vec![Input::from_reader("a", "[1,".as_bytes()).unwrap()];
        assert!(matches!(slurp(&inputs), Err(JqError::InvalidJson(_))));
    }
}
