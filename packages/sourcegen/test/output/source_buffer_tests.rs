use composer_sourcegen::output::source_buffer::SourceBuffer;
use composer_sourcegen::NodeId;

#[cfg(test)]
mod tests {
    use super::*;

    fn block(indent: usize, statements: &[&str]) -> SourceBuffer {
        let mut buf = SourceBuffer::with_indent(indent, "    ");
        buf.println("{");
        buf.inc_indent();
        for stmt in statements {
            buf.println(stmt);
        }
        buf.dec_indent();
        buf.print("}");
        buf
    }

    #[test]
    fn should_compose_nested_frames_in_order() {
        let mut outer = SourceBuffer::default();
        outer.print("while (a) ");
        outer.append_buffer(block(0, &["x = 1;", "y = 2;"]));
        assert_eq!(outer.to_source(), "while (a) {\n    x = 1;\n    y = 2;\n}");
    }

    #[test]
    fn should_keep_child_indentation() {
        let mut outer = SourceBuffer::default();
        outer.println("service<http> s {");
        outer.inc_indent();
        outer.print("resource r () ");
        let inner = block(outer.indent(), &["reply m;"]);
        outer.append_buffer(inner);
        outer.newline();
        outer.dec_indent();
        outer.print("}");

        assert_eq!(
            outer.to_source(),
            "service<http> s {\n    resource r () {\n        reply m;\n    }\n}"
        );
    }

    #[test]
    fn should_track_line_state() {
        let mut buf = SourceBuffer::new("  ");
        assert!(buf.is_empty());
        assert!(buf.line_is_empty());

        buf.inc_indent();
        buf.print("abc");
        assert_eq!(buf.line_length(), 5);
        assert!(!buf.line_is_empty());

        buf.newline();
        assert!(buf.line_is_empty());
        assert!(!buf.is_empty());
        buf.remove_empty_last_line();
        assert_eq!(buf.to_source(), "  abc");
    }

    #[test]
    fn should_ignore_empty_parts() {
        let mut buf = SourceBuffer::default();
        buf.print("");
        assert!(buf.is_empty());
        buf.print("a");
        buf.print("");
        buf.print("b");
        assert_eq!(buf.to_source(), "ab");
    }

    #[test]
    fn should_remember_origin() {
        let buf = SourceBuffer::for_node(NodeId(7), 2, "\t");
        assert_eq!(buf.origin(), Some(NodeId(7)));
        assert_eq!(buf.indent(), 2);
        assert_eq!(buf.indent_unit(), "\t");
        assert_eq!(SourceBuffer::default().origin(), None);
    }
}
