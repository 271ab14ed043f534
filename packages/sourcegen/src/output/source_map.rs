//! Source Map Module
//!
//! Version 3 source maps relating generated lines back to the positions of
//! the AST nodes that emitted them.

use std::collections::HashMap;

use serde::Serialize;

const VERSION: u32 = 3;
const B64_PREFIX: &str = "# sourceMappingURL=data:application/json;base64,";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceMapError {
    #[error("a line must be added before mappings can be added")]
    NoLine,
    #[error("unknown source file \"{0}\"")]
    UnknownSource(String),
    #[error("mapping at column {col0} is before column {last_col0}")]
    OutOfOrder { col0: usize, last_col0: usize },
    #[error("a source location must be given with a source url")]
    MissingLocation,
}

#[derive(Debug, Clone)]
struct Segment {
    col0: usize,
    source: Option<(String, usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMap {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(rename = "sourceRoot")]
    pub source_root: String,
    pub sources: Vec<String>,
    #[serde(rename = "sourcesContent")]
    pub sources_content: Vec<Option<String>>,
    pub mappings: String,
}

impl SourceMap {
    /// `//# sourceMappingURL=data:...` trailer, a line comment in the
    /// generated language.
    pub fn to_comment(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("//{}{}", B64_PREFIX, to_base64_string(&json))
    }
}

#[derive(Debug, Default)]
pub struct SourceMapGenerator {
    file: Option<String>,
    sources_content: HashMap<String, Option<String>>,
    lines: Vec<Vec<Segment>>,
    last_col0: usize,
    has_mappings: bool,
}

impl SourceMapGenerator {
    pub fn new(file: Option<String>) -> Self {
        SourceMapGenerator {
            file,
            ..Default::default()
        }
    }

    /// The content is `None` when the content is expected to be loaded using the URL
    pub fn add_source(&mut self, url: String, content: Option<String>) -> &mut Self {
        self.sources_content.entry(url).or_insert(content);
        self
    }

    pub fn add_line(&mut self) -> &mut Self {
        self.lines.push(Vec::new());
        self.last_col0 = 0;
        self
    }

    pub fn add_mapping(
        &mut self,
        col0: usize,
        source_url: Option<String>,
        source_line0: Option<usize>,
        source_col0: Option<usize>,
    ) -> Result<&mut Self, SourceMapError> {
        if self.lines.is_empty() {
            return Err(SourceMapError::NoLine);
        }
        if col0 < self.last_col0 {
            return Err(SourceMapError::OutOfOrder {
                col0,
                last_col0: self.last_col0,
            });
        }
        let source = match (source_url, source_line0, source_col0) {
            (None, _, _) => None,
            (Some(url), Some(line), Some(col)) => {
                if !self.sources_content.contains_key(&url) {
                    return Err(SourceMapError::UnknownSource(url));
                }
                Some((url, line, col))
            }
            (Some(_), _, _) => return Err(SourceMapError::MissingLocation),
        };

        self.has_mappings = true;
        self.last_col0 = col0;
        if let Some(line) = self.lines.last_mut() {
            line.push(Segment { col0, source });
        }
        Ok(self)
    }

    pub fn has_mappings(&self) -> bool {
        self.has_mappings
    }

    pub fn to_json(&self) -> Option<SourceMap> {
        if !self.has_mappings {
            return None;
        }

        let mut sources: Vec<String> = self.sources_content.keys().cloned().collect();
        sources.sort();
        let sources_index: HashMap<&str, usize> = sources
            .iter()
            .enumerate()
            .map(|(i, url)| (url.as_str(), i))
            .collect();
        let sources_content = sources
            .iter()
            .map(|url| self.sources_content.get(url).cloned().flatten())
            .collect();

        let mut last_source_index = 0i64;
        let mut last_source_line0 = 0i64;
        let mut last_source_col0 = 0i64;

        let mappings = self
            .lines
            .iter()
            .map(|segments| {
                let mut last_col0 = 0i64;
                segments
                    .iter()
                    .map(|segment| {
                        // zero-based starting column of the line in the generated code
                        let mut seg = to_base64_vlq(segment.col0 as i64 - last_col0);
                        last_col0 = segment.col0 as i64;

                        if let Some((url, line0, col0)) = &segment.source {
                            let index = sources_index.get(url.as_str()).copied().unwrap_or(0) as i64;
                            seg += &to_base64_vlq(index - last_source_index);
                            last_source_index = index;

                            seg += &to_base64_vlq(*line0 as i64 - last_source_line0);
                            last_source_line0 = *line0 as i64;

                            seg += &to_base64_vlq(*col0 as i64 - last_source_col0);
                            last_source_col0 = *col0 as i64;
                        }
                        seg
                    })
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join(";");

        Some(SourceMap {
            file: self.file.clone(),
            version: VERSION,
            source_root: String::new(),
            sources,
            sources_content,
            mappings,
        })
    }
}

pub fn to_base64_string(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut b64 = String::with_capacity((bytes.len() + 2) / 3 * 4);

    for chunk in bytes.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied();
        let b3 = chunk.get(2).copied();

        b64.push(to_base64_digit(b1 >> 2));
        b64.push(to_base64_digit(((b1 & 3) << 4) | (b2.unwrap_or(0) >> 4)));
        b64.push(match b2 {
            Some(b2) => to_base64_digit(((b2 & 15) << 2) | (b3.unwrap_or(0) >> 6)),
            None => '=',
        });
        b64.push(match (b2, b3) {
            (Some(_), Some(b3)) => to_base64_digit(b3 & 63),
            _ => '=',
        });
    }

    b64
}

fn to_base64_vlq(value: i64) -> String {
    let mut value = if value < 0 {
        ((-value) << 1) + 1
    } else {
        value << 1
    };

    let mut out = String::new();
    loop {
        let mut digit = (value & 31) as u8;
        value >>= 5;
        if value > 0 {
            digit |= 32;
        }
        out.push(to_base64_digit(digit));
        if value <= 0 {
            break;
        }
    }
    out
}

const B64_DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn to_base64_digit(value: u8) -> char {
    B64_DIGITS[(value & 63) as usize] as char
}
