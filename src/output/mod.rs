pub mod color;
pub mod pretty;

/// Whitespace used for one level of pretty-printed nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(u8),
    Tab,
}

impl Indent {
    pub fn unit(self) -> String {
        match self {
            Indent::Spaces(n) => " ".repeat(n as usize),
            Indent::Tab => "\t".to_string(),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(2)
    }
}

/// Rendering settings, built once from the command line.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub compact: bool,
    /// Print top-level strings without quotes.
    pub raw: bool,
    /// No newline after each output.
    pub join: bool,
    pub indent: Indent,
    pub color: bool,
}

impl OutputOptions {
    /// Indentation unit, or `None` when output is single-line.
    pub fn indent_unit(&self) -> Option<String> {
        match self.indent {
            _ if self.compact => None,
            Indent::Spaces(0) => None,
            indent => Some(indent.unit()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_two_spaces() {
        let opts = OutputOptions::default();
        assert_eq!(opts.indent_unit().as_deref(), Some("  "));
    }

    #[test]
    fn compact_and_zero_indent_are_single_line() {
        let compact = OutputOptions {
            compact: true,
            ..Default::default()
        };
        assert_eq!(compact.indent_unit(), None);
        let zero = OutputOptions {
            indent: Indent::Spaces(0),
            ..Default::default()
        };
        assert_eq!(zero.indent_unit(), None);
    }

    #[test]
    fn tab_indent() {
        let opts = OutputOptions {
            indent: Indent::Tab,
            ..Default::default()
        };
        assert_eq!(opts.indent_unit().as_deref(), Some("\t"));
    }
}
