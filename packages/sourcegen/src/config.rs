use serde::{Deserialize, Serialize};

use crate::output::source_buffer::DEFAULT_INDENT;

pub const DEFAULT_ARGUMENT_SEPARATOR: &str = ", ";
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Formatting and safety options for one generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// One level of indentation.
    pub indent: String,
    /// Separator between invocation arguments, array items and map entries.
    pub argument_separator: String,
    /// Deepest nesting the traversal accepts before failing.
    pub max_depth: usize,
    /// Separate top-level definitions of a compilation unit by a blank line.
    pub blank_line_between_definitions: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            indent: DEFAULT_INDENT.to_string(),
            argument_separator: DEFAULT_ARGUMENT_SEPARATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            blank_line_between_definitions: true,
        }
    }
}

impl GenerateOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_argument_separator(mut self, separator: impl Into<String>) -> Self {
        self.argument_separator = separator.into();
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
