use expect_test::{expect, Expect};
use miette::SourceSpan;
use nabla_source::Limits;
use nabla_syntax::ast::{AliasName, Expr, Global, Single, StructOrList, UseBody};
use nabla_syntax::{parse, parse_with_limits, LexWarning, ParseDiagnostic, SyntaxError};

/// Prints the tree followed by one `! message` line per diagnostic.
fn check(src: &str, expect: Expect) {
    let parse = parse(src).unwrap();
    let mut out = format!("{}\n", parse.program);
    for diagnostic in &parse.diagnostics {
        out.push_str(&format!("! {diagnostic}\n"));
    }
    expect.assert_eq(&out);
}

fn assert_clean(src: &str) {
    let parse = parse(src).unwrap();
    assert!(parse.diagnostics.is_empty(), "{src}: {:?}", parse.diagnostics);
    assert!(parse.program.error_spans().is_empty(), "{src}");
}

#[test]
fn test_well_formed_document() {
    check(
        r#"
use net::http::{Client Server as S}
use util::*

// the schema
def Config = {
    input_file: String
    output_folder: String = "out/"
    version: 1 | 2 = 2
}
let answer: Number = 42
Config { input_file = "input.txt", output_folder = "build/" as "out" }
"#,
        expect![[r#"
            use net::http::{Client Server as S}
            use util::*
            def Config = {input_file: String, output_folder: String = "out/", version: 1 | 2 = 2}
            let answer: Number = 42
            Config {input_file = "input.txt", output_folder = "build/" as "out"}
        "#]],
    );
}

#[test]
fn test_well_formed_inputs_have_no_errors() {
    for src in [
        "",
        "// only a comment",
        r#"def Config = { input_file: String, output_folder: String = "out/", version: 1 | 2 = 2 }"#,
        r#"Config { input_file = "input.txt", output_folder = "build/" }"#,
        "use a\nuse b::{c d::e}\nuse f::g as h",
        "def Optional = Number | null\nlet none: Optional = null",
        "def Empty = []\nEmpty []",
        "[1, 2.5, 'c', \"d\", true, false, null]",
        "def define = user",
        "net::http::Config { port = 80 }",
        "{ nested = { deeper = [ { x = 1 } ] } }",
    ] {
        assert_clean(src);
    }
}

#[test]
fn test_recovers_inside_struct_field() {
    check(
        "def A = { x: = 1 }\ndef B = Number",
        expect![[r#"
            def A = {x: <error> = 1}
            def B = Number
            ! Expected a type expression after `:`, found `=`
        "#]],
    );
}

#[test]
fn test_skips_garbage_between_globals() {
    let src = "} ] def A = B";
    check(
        src,
        expect![[r#"
            <error>
            def A = B
            ! Unexpected `}`
        "#]],
    );
    let parse = parse(src).unwrap();
    assert_eq!(parse.program.error_spans(), vec![SourceSpan::new(0.into(), 3)]);
}

#[test]
fn test_missing_closing_curly_stops_at_next_global() {
    let src = "def A = { x: Number\ndef B = String";
    check(
        src,
        expect![[r#"
            def A = {x: Number}
            def B = String
            ! Missing closing `}`
        "#]],
    );
    let parse = parse(src).unwrap();
    assert_eq!(
        parse.syntax_errors().cloned().collect::<Vec<_>>(),
        vec![SyntaxError::MissingClosingCurly {
            open: SourceSpan::new(8.into(), 1),
            span: SourceSpan::new(20.into(), 0),
        }]
    );
    match &parse.program.globals[0] {
        Global::Def(def) => match &def.expr {
            Some(Expr::Single(Single::Struct(s))) => assert!(!s.closed),
            other => panic!("expected struct, got {other:?}"),
        },
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_missing_closing_bracket() {
    check(
        "let xs = [1 2\nlet y = 3",
        expect![[r#"
            let xs = [1, 2]
            let y = 3
            ! Missing closing `]`
        "#]],
    );
}

#[test]
fn test_trailing_pipe_keeps_union() {
    check(
        "def V = 1 | 2 |\ndef W = 3 |",
        expect![[r#"
            def V = 1 | 2
            def W = 3
            ! Expected another union alternative after `|`
            ! Expected another union alternative after `|`
        "#]],
    );
}

#[test]
fn test_use_recovery() {
    check(
        "use a::{b 5 c}\nuse d::\ndef X = 1",
        expect![[r#"
            use a::{b <error> c}
            use d::<error>
            def X = 1
            ! Unexpected number
            ! Expected `*`, an identifier or `{` after `::`, found `def`
        "#]],
    );
}

#[test]
fn test_missing_alias_name() {
    check(
        "use a::b as",
        expect![[r#"
            use a::b as ?
            ! Expected a name after `as`, found end of input
        "#]],
    );
}

#[test]
fn test_unknown_character_in_expression() {
    check(
        "def A = # 1",
        expect![[r#"
            def A = <error>
            ! Unknown character `#`
            ! Expected an expression, found unknown character
        "#]],
    );
}

#[test]
fn test_lex_warnings_are_not_errors() {
    let parse = parse("let s = \"open").unwrap();
    assert!(!parse.has_errors());
    assert_eq!(
        parse.diagnostics,
        vec![ParseDiagnostic::Lex(LexWarning::UnterminatedString {
            span: SourceSpan::new(8.into(), 5)
        })]
    );
}

#[test]
fn test_alias_attaches_to_innermost_item() {
    let parse = parse("use a::b as c\nuse d as e").unwrap();
    assert!(parse.diagnostics.is_empty());
    let uses: Vec<_> = parse.program.uses().collect();

    assert!(uses[0].alias.is_none());
    match &uses[0].body {
        Some(UseBody::Single(item)) => {
            assert_eq!(item.name.name, "b");
            let alias = item.alias.as_ref().and_then(|alias| alias.name.as_ref());
            assert!(matches!(alias, Some(AliasName::Ident(ident)) if ident.name == "c"));
        }
        other => panic!("expected single item, got {other:?}"),
    }

    assert!(uses[1].body.is_none());
    assert_eq!(
        uses[1].alias.as_ref().and_then(|a| a.name.as_ref()).map(AliasName::text),
        Some("e")
    );
}

#[test]
fn test_named_with_qualified_path_and_body() {
    let parse = parse("net::Config { port = 80 }").unwrap();
    let init = parse.program.inits().next().unwrap();
    match init {
        Expr::Single(Single::Named(named)) => {
            assert_eq!(named.name(), "net::Config");
            assert_eq!(named.path_span(), SourceSpan::new(0.into(), 11));
            assert!(matches!(named.body, Some(StructOrList::Struct(_))));
        }
        other => panic!("expected named, got {other:?}"),
    }
}

#[test]
fn test_field_alias_and_emit_name() {
    let parse = parse(r#"{ a = 1 as "A" b = 2 }"#).unwrap();
    match parse.program.inits().next() {
        Some(Expr::Single(Single::Struct(s))) => {
            let names: Vec<_> = s.fields().map(|f| f.emit_name()).collect();
            assert_eq!(names, vec!["A", "b"]);
        }
        other => panic!("expected struct, got {other:?}"),
    };
}

#[test]
fn test_adversarial_input_terminates() {
    const PIECES: [&str; 16] = [
        "{", "}", "[", "]", "::", ":", "*", "|", "=", "as", "use", "def", "x", "\"s", "#", "1.",
    ];
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    for round in 0..50 {
        let mut src = String::new();
        for _ in 0..(50 + round * 20) {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            src.push_str(PIECES[(state % PIECES.len() as u64) as usize]);
            src.push(' ');
        }
        match parse(&src) {
            Ok(parse) => {
                let len = src.len();
                for span in parse.program.error_spans() {
                    assert!(span.offset() + span.len() <= len);
                }
            }
            Err(SyntaxError::DepthLimitExceeded { .. }) => {}
            Err(other) => panic!("unexpected fatal error {other:?}"),
        }
    }
}

#[test]
fn test_depth_limit_is_fatal() {
    let src = "[".repeat(200);
    match parse(&src) {
        Err(SyntaxError::DepthLimitExceeded { limit, .. }) => assert_eq!(limit, 128),
        other => panic!("expected depth limit, got {other:?}"),
    }

    let limits = Limits {
        max_depth: 1000,
        ..Limits::default()
    };
    let shallow = "[".repeat(60);
    let parse = parse_with_limits(&shallow, limits).unwrap();
    assert_eq!(parse.syntax_errors().count(), 60);
}

#[test]
fn test_token_limit_is_fatal() {
    let limits = Limits {
        max_tokens: 2,
        ..Limits::default()
    };
    assert_eq!(
        parse_with_limits("a // comments are free\nb c", limits),
        Err(SyntaxError::TokenLimitExceeded { limit: 2, found: 3 })
    );
}
