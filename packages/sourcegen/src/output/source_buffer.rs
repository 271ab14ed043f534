//! Source Buffer Module
//!
//! Line-oriented text accumulator owned by one visitor frame. Every part
//! remembers the node that emitted it so that source maps can point back at
//! the node's original position.

use crate::ast::{Ast, NodeId};
use crate::output::source_map::{SourceMapError, SourceMapGenerator};

pub const DEFAULT_INDENT: &str = "    ";

#[derive(Debug, Clone)]
struct EmittedLine {
    parts_length: usize,
    parts: Vec<String>,
    origins: Vec<Option<NodeId>>,
    indent: usize,
}

impl EmittedLine {
    fn new(indent: usize) -> Self {
        EmittedLine {
            parts_length: 0,
            parts: Vec::new(),
            origins: Vec::new(),
            indent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceBuffer {
    lines: Vec<EmittedLine>,
    indent: usize,
    indent_unit: String,
    origin: Option<NodeId>,
}

impl Default for SourceBuffer {
    fn default() -> Self {
        SourceBuffer::new(DEFAULT_INDENT)
    }
}

impl SourceBuffer {
    pub fn new(indent_unit: impl Into<String>) -> Self {
        SourceBuffer::with_indent(0, indent_unit)
    }

    pub fn with_indent(indent: usize, indent_unit: impl Into<String>) -> Self {
        SourceBuffer {
            lines: vec![EmittedLine::new(indent)],
            indent,
            indent_unit: indent_unit.into(),
            origin: None,
        }
    }

    /// A buffer for the frame of `origin`, starting at `indent`.
    pub fn for_node(origin: NodeId, indent: usize, indent_unit: impl Into<String>) -> Self {
        let mut buf = SourceBuffer::with_indent(indent, indent_unit);
        buf.origin = Some(origin);
        buf
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    fn current_line(&self) -> Option<&EmittedLine> {
        self.lines.last()
    }

    fn current_line_mut(&mut self) -> &mut EmittedLine {
        if self.lines.is_empty() {
            self.lines.push(EmittedLine::new(self.indent));
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    pub fn print(&mut self, part: &str) {
        if !part.is_empty() {
            let origin = self.origin;
            let current = self.current_line_mut();
            current.parts.push(part.to_string());
            current.parts_length += part.len();
            current.origins.push(origin);
        }
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.lines.push(EmittedLine::new(self.indent));
    }

    pub fn line_is_empty(&self) -> bool {
        self.current_line().map_or(true, |l| l.parts.is_empty())
    }

    /// True when nothing has been printed at all.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.parts.is_empty())
    }

    pub fn line_length(&self) -> usize {
        self.current_line().map_or(0, |l| {
            l.indent * self.indent_unit.len() + l.parts_length
        })
    }

    pub fn remove_empty_last_line(&mut self) {
        if self.lines.len() > 1 && self.line_is_empty() {
            self.lines.pop();
        }
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        if self.line_is_empty() {
            let indent = self.indent;
            self.current_line_mut().indent = indent;
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        if self.line_is_empty() {
            let indent = self.indent;
            self.current_line_mut().indent = indent;
        }
    }

    /// Composes a finished child buffer into this one. The child's first line
    /// continues the current line; its remaining lines keep their own
    /// indentation. The child must have been created at this buffer's
    /// current indent.
    pub fn append_buffer(&mut self, child: SourceBuffer) {
        let mut lines = child.lines.into_iter();
        if let Some(first) = lines.next() {
            let current = self.current_line_mut();
            current.parts_length += first.parts_length;
            current.parts.extend(first.parts);
            current.origins.extend(first.origins);
        }
        self.lines.extend(lines);
    }

    pub fn to_source(&self) -> String {
        self.lines
            .iter()
            .map(|l| {
                if l.parts.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", self.indent_unit.repeat(l.indent), l.parts.concat())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Maps every emitted part back to the position of the node that
    /// printed it. Parts whose node has no position are left unmapped.
    pub fn to_source_map_generator(
        &self,
        ast: &Ast,
        gen_file_path: &str,
        starts_at_line: usize,
    ) -> Result<SourceMapGenerator, SourceMapError> {
        let mut map = SourceMapGenerator::new(Some(gen_file_path.to_string()));
        let file = ast.source_file();

        for _ in 0..starts_at_line {
            map.add_line();
        }

        let effective_len = match self.lines.last() {
            Some(last) if last.parts.is_empty() => self.lines.len() - 1,
            _ => self.lines.len(),
        };

        let mut last: Option<(usize, usize)> = None;
        for line in &self.lines[..effective_len] {
            map.add_line();
            let mut col0 = line.indent * self.indent_unit.len();

            for (part, &origin) in line.parts.iter().zip(&line.origins) {
                let position = origin
                    .and_then(|id| ast.node(id))
                    .and_then(|node| node.position);
                if let (Some(file), Some(pos)) = (file, position) {
                    // Coalesce identical spans
                    if last != Some((pos.line, pos.column)) {
                        map.add_source(file.url.clone(), file.content.clone());
                        map.add_mapping(col0, Some(file.url.clone()), Some(pos.line), Some(pos.column))?;
                        last = Some((pos.line, pos.column));
                    }
                }
                col0 += part.len();
            }
        }

        Ok(map)
    }
}
