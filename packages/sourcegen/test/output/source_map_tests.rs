use composer_sourcegen::ast::{SourceFile, SourcePosition};
use composer_sourcegen::output::source_map::{to_base64_string, SourceMapError, SourceMapGenerator};
use composer_sourcegen::{Ast, SourceGenerator};

#[path = "../support.rs"]
mod support;

use support::{add, invocation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_a_valid_source_map() {
        let mut map = SourceMapGenerator::new(Some("out.bal".to_string()));
        map.add_source("a.bal".to_string(), None)
            .add_line()
            .add_mapping(0, Some("a.bal".to_string()), Some(0), Some(0))
            .unwrap()
            .add_mapping(4, Some("a.bal".to_string()), Some(0), Some(6))
            .unwrap()
            .add_line()
            .add_mapping(0, Some("a.bal".to_string()), Some(1), Some(0))
            .unwrap();

        let json = map.to_json().unwrap();
        assert_eq!(json.version, 3);
        assert_eq!(json.file, Some("out.bal".to_string()));
        assert_eq!(json.mappings, "AAAA,IAAM;AACN");
    }

    #[test]
    fn should_include_the_files_and_their_contents() {
        let mut map = SourceMapGenerator::new(Some("out.bal".to_string()));
        map.add_source("inline.bal".to_string(), Some("inline".to_string()))
            .add_source("inline.bal".to_string(), Some("inline".to_string()))
            .add_source("url.bal".to_string(), None)
            .add_line()
            .add_mapping(0, Some("inline.bal".to_string()), Some(0), Some(0))
            .unwrap();

        let json = map.to_json().unwrap();
        assert_eq!(json.sources, vec!["inline.bal", "url.bal"]);
        assert_eq!(json.sources_content, vec![Some("inline".to_string()), None]);
    }

    #[test]
    fn should_not_generate_source_maps_when_there_is_no_mapping() {
        let mut map = SourceMapGenerator::new(Some("out.bal".to_string()));
        map.add_source("inline.bal".to_string(), None).add_line();
        assert!(!map.has_mappings());
        assert!(map.to_json().is_none());
    }

    #[test]
    fn should_reject_invalid_mappings() {
        let mut map = SourceMapGenerator::new(None);
        assert_eq!(
            map.add_mapping(0, None, None, None).err(),
            Some(SourceMapError::NoLine)
        );

        map.add_source("in.bal".to_string(), None).add_line();
        assert_eq!(
            map.add_mapping(0, Some("other.bal".to_string()), Some(0), Some(0)).err(),
            Some(SourceMapError::UnknownSource("other.bal".to_string()))
        );
        assert_eq!(
            map.add_mapping(0, Some("in.bal".to_string()), Some(0), None).err(),
            Some(SourceMapError::MissingLocation)
        );

        map.add_mapping(10, Some("in.bal".to_string()), Some(0), Some(0))
            .unwrap();
        assert_eq!(
            map.add_mapping(2, Some("in.bal".to_string()), Some(0), Some(0)).err(),
            Some(SourceMapError::OutOfOrder {
                col0: 2,
                last_col0: 10
            })
        );
    }

    #[test]
    fn should_return_the_b64_encoded_value() {
        let cases = [
            ("", ""),
            ("a", "YQ=="),
            ("Foo", "Rm9v"),
            ("Foo1", "Rm9vMQ=="),
            ("Foo12", "Rm9vMTI="),
            ("Foo123", "Rm9vMTIz"),
        ];
        for (src, b64) in cases {
            assert_eq!(to_base64_string(src), b64);
        }
    }

    #[test]
    fn should_map_generated_parts_to_node_positions() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        let bar = add(&mut ast, root, invocation("bar"));
        ast.set_source_file(Some(SourceFile {
            url: "hello.bal".to_string(),
            content: Some("foo(bar())".to_string()),
        }));
        ast.set_position(root, SourcePosition::new(0, 0)).unwrap();
        ast.set_position(bar, SourcePosition::new(0, 4)).unwrap();

        let generated = SourceGenerator::default()
            .generate_with_source_map(&ast, "out.bal")
            .unwrap();
        assert_eq!(generated.source, "foo(bar())");

        let map = generated.source_map.unwrap();
        assert_eq!(map.file, Some("out.bal".to_string()));
        assert_eq!(map.sources, vec!["hello.bal"]);
        assert_eq!(map.sources_content, vec![Some("foo(bar())".to_string())]);
        // foo( -> 0:0, bar() -> 0:4, closing ) -> 0:0
        assert_eq!(map.mappings, "AAAA,IAAI,KAAJ");
        assert!(map
            .to_comment()
            .starts_with("//# sourceMappingURL=data:application/json;base64,"));
    }

    #[test]
    fn should_omit_map_without_positions() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        add(&mut ast, root, invocation("bar"));

        let generated = SourceGenerator::default()
            .generate_with_source_map(&ast, "out.bal")
            .unwrap();
        assert_eq!(generated.source, "foo(bar())");
        assert!(generated.source_map.is_none());
    }
}
