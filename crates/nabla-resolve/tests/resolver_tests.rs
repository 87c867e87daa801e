use expect_test::{expect, Expect};
use miette::SourceSpan;
use nabla_resolve::{resolve, resolve_with_limits, ExternalSymbols, Resolution, ResolutionError, Value};
use nabla_source::Limits;
use nabla_syntax::parse;

fn resolve_source(source: &str) -> Resolution {
    let parse = parse(source).unwrap();
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics);
    resolve(&parse.program, &ExternalSymbols::empty()).unwrap()
}

/// One line per instantiation, then one `!` line per diagnostic.
fn render(resolution: &Resolution) -> String {
    let mut out = String::new();
    for inst in &resolution.instantiations {
        match &inst.value {
            Some(value) => out.push_str(&format!("{value}\n")),
            None => out.push_str("<none>\n"),
        }
    }
    for diagnostic in &resolution.diagnostics {
        out.push_str(&format!("! {diagnostic}\n"));
    }
    out
}

fn check(source: &str, expect: Expect) {
    expect.assert_eq(&render(&resolve_source(source)));
}

fn span_of(source: &str, needle: &str) -> SourceSpan {
    let offset = source.find(needle).unwrap();
    SourceSpan::new(offset.into(), needle.len())
}

const CONFIG: &str = r#"
def Config = {
    input_file: String
    output_folder: String = "build/"
    version: 1 | 2 = 2
}
"#;

#[test]
fn test_defaults_fill_missing_fields() {
    check(
        &format!("{CONFIG}Config {{ input_file = \"input.txt\" }}"),
        expect![[r#"
            {input_file: "input.txt", output_folder: "build/", version: 2}
        "#]],
    );
}

#[test]
fn test_union_literal_mismatch() {
    let source = format!("{CONFIG}Config {{ input_file = \"a\", version = 3 }}");
    let resolution = resolve_source(&source);
    expect![[r#"
        <none>
        ! Type mismatch: expected `1` | `2`, found `3`
    "#]]
    .assert_eq(&render(&resolution));
    match &resolution.diagnostics[0] {
        ResolutionError::TypeMismatch { span, .. } => assert_eq!(*span, span_of(&source, "3")),
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn test_missing_required_field() {
    let source = format!("{CONFIG}Config {{}}");
    let resolution = resolve_source(&source);
    expect![[r#"
        <none>
        ! Missing field `input_file` of `Config`
    "#]]
    .assert_eq(&render(&resolution));
    match &resolution.diagnostics[0] {
        ResolutionError::MissingField { span, .. } => assert_eq!(*span, span_of(&source, "Config {}")),
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn test_unknown_and_duplicate_fields_in_one_pass() {
    let source = "def Point = { x: Number, y: Number }\nPoint { x = 1, x = 2, y = 3, z = 4 }";
    let resolution = resolve_source(source);
    expect![[r#"
        <none>
        ! Duplicate field `x`
        ! Unknown field `z` for `Point`
    "#]]
    .assert_eq(&render(&resolution));
    match &resolution.diagnostics[..] {
        [ResolutionError::DuplicateField { span, previous_span, .. }, ResolutionError::UnknownField { span: unknown, .. }] => {
            assert_eq!(*previous_span, span_of(source, "x = 1").offset().into_span(1));
            assert_eq!(*span, span_of(source, "x = 2").offset().into_span(1));
            assert_eq!(*unknown, span_of(source, "z").offset().into_span(1));
        }
        other => panic!("unexpected diagnostics {other:?}"),
    }
}

trait IntoSpan {
    fn into_span(self, len: usize) -> SourceSpan;
}

impl IntoSpan for usize {
    fn into_span(self, len: usize) -> SourceSpan {
        SourceSpan::new(self.into(), len)
    }
}

#[test]
fn test_cycle_reported_once() {
    let source = "def A = B\ndef B = A";
    let resolution = resolve_source(source);
    expect![[r#"
        ! Cyclic type: `A` is defined in terms of itself (A -> B -> A)
    "#]]
    .assert_eq(&render(&resolution));
}

#[test]
fn test_def_reaching_back_into_its_cycle_is_cyclic() {
    let source = "def A = B\ndef B = C | D\ndef C = A\ndef D = C";
    let resolution = resolve_source(source);
    expect![[r#"
        ! Cyclic type: `A` is defined in terms of itself (A -> B -> C -> A)
        ! Cyclic type: `D` is defined in terms of itself (D -> C -> A -> B -> D)
    "#]]
    .assert_eq(&render(&resolution));
}

#[test]
fn test_using_cyclic_def() {
    check(
        "def A = B\ndef B = A\nA {}",
        expect![[r#"
            <none>
            ! Cyclic type: `A` is defined in terms of itself (A -> B -> A)
            ! Cyclic type: `A` is defined in terms of itself (A -> B -> A)
        "#]],
    );
}

#[test]
fn test_guarded_recursion() {
    check(
        "def Node = { value: Number, next: Node | null = null }\nNode { value = 1, next = Node { value = 2 } }",
        expect![[r#"
            {value: 1, next: {value: 2, next: null}}
        "#]],
    );
}

#[test]
fn test_default_recursion_hits_depth_limit() {
    let parse = parse("def Node = { next: Node = Node {} }\nNode {}").unwrap();
    let limits = Limits {
        max_depth: 16,
        ..Limits::default()
    };
    match resolve_with_limits(&parse.program, &ExternalSymbols::empty(), limits) {
        Err(ResolutionError::DepthLimitExceeded { limit, .. }) => assert_eq!(limit, 16),
        other => panic!("expected the depth limit, got {other:?}"),
    }
}

#[test]
fn test_refinement_overrides_defaults() {
    check(
        "def Base = { a: Number = 1, b: Number = 2 }\ndef Tuned = Base { b = 3 }\nTuned {}\nTuned { a = 5 }\nTuned",
        expect![[r#"
            {a: 1, b: 3}
            {a: 5, b: 3}
            {a: 1, b: 3}
        "#]],
    );
}

#[test]
fn test_named_instances_match_by_shape() {
    check(
        r#"def A = { x: Number = 1 }
def B = { x: Number = 1 }
def C = { y: Number = 1 }
def D = { x: String = "s" }
def Empty = {}
def Holder = { a: A }
Holder { a = B {} }
Holder { a = B { x = 3 } }
Holder { a = Empty {} }
Holder { a = { x = 2 } }
Holder { a = C {} }
Holder { a = D {} }"#,
        expect![[r#"
            {a: {x: 1}}
            {a: {x: 3}}
            {a: {x: 1}}
            {a: {x: 2}}
            <none>
            <none>
            ! Type mismatch: expected `A`, found `C` value
            ! Type mismatch: expected `A`, found `D` value
        "#]],
    );
}

#[test]
fn test_instance_of_same_shape_without_defaults() {
    check(
        "def A = { x: Number }\ndef B = { x: Number }\ndef Holder = { a: A }\nHolder { a = B { x = 1 } }\nHolder { a = B { x = true } }",
        expect![[r#"
            {a: {x: 1}}
            <none>
            ! Type mismatch: expected `Number`, found `true`
        "#]],
    );
}

#[test]
fn test_list_types() {
    check(
        r#"def L = { xs: [Number], mixed: [Number String], none: [] }
L { xs = [1, 2], mixed = [1, "a"], none = [] }
L { xs = ["a"], mixed = [true], none = [1] }"#,
        expect![[r#"
            {xs: [1, 2], mixed: [1, "a"], none: []}
            <none>
            ! Type mismatch: expected `Number`, found `"a"`
            ! Type mismatch: expected `Number` | `String`, found `true`
            ! Type mismatch: expected `[]`, found a list of 1 elements
        "#]],
    );
}

#[test]
fn test_field_alias_renames_output_key() {
    check(
        r#"def Pkg = { package_name: String as "package-name", version: String = "0.1.0" }
Pkg { package_name = "nabla" }"#,
        expect![[r#"
            {package-name: "nabla", version: "0.1.0"}
        "#]],
    );
}

#[test]
fn test_lets() {
    check(
        "let port = 8080\nlet name = 1\ndef S = { port: Number, name: String = \"x\" }\nS { port = port }\nS { port = port, name = name }",
        expect![[r#"
            {port: 8080, name: "x"}
            <none>
            ! Type mismatch: expected `String`, found let `name` = 1
        "#]],
    );
}

#[test]
fn test_let_cycle() {
    check(
        "let a = b\nlet b = a",
        expect![[r#"
            ! Cyclic type: `a` is defined in terms of itself (a -> b -> a)
        "#]],
    );
}

#[test]
fn test_values_that_are_not_values() {
    check(
        "def Port = Number\n1 | 2\nString\nPort",
        expect![[r#"
            <none>
            <none>
            <none>
            ! Unions cannot be used as values
            ! `String` is a type, not a value
            ! `Port` is a type, not a value
        "#]],
    );
}

#[test]
fn test_default_of_typed_def() {
    check(
        "def Port: Number = 8080\ndef S = { port: Number = Port, label: String = Port }\nPort\nS {}",
        expect![[r#"
            8080
            <none>
            ! Type mismatch: expected `String`, found `Port` value
        "#]],
    );
}

#[test]
fn test_duplicate_definition() {
    let source = "def A = Number\nlet A = 1\ndef A = String";
    let resolution = resolve_source(source);
    expect![[r#"
        ! Duplicate definition: `A` is defined multiple times
        ! Duplicate definition: `A` is defined multiple times
    "#]]
    .assert_eq(&render(&resolution));
    for diagnostic in &resolution.diagnostics {
        match diagnostic {
            ResolutionError::DuplicateDefinition { previous_span, .. } => {
                assert_eq!(*previous_span, Some(4usize.into_span(1)));
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
    }
}

#[test]
fn test_alias_and_value_misuse() {
    check(
        "def S = { a: Number as b }\nS { a }\nS { a = 1 }\nUndeclared {}",
        expect![[r#"
            <none>
            {a: 1}
            <none>
            ! Field aliases must be strings
            ! `a` has no value
            ! Unresolved name: could not find `Undeclared` in this scope
        "#]],
    );
}

#[test]
fn test_serialized_output_keeps_order_and_number_forms() {
    let source = r#"def Server = {
    port: Number = 8080
    ratio: Number = 1.
    scale: Number = 0.25
    host: String = "localhost"
    tags: [String] = ["a", "b"]
    initial: Char = 'x'
    parent: Server | null = null
}
Server { host = "example.org" }"#;
    let parse = parse(source).unwrap();
    let resolution = resolve(&parse.program, &ExternalSymbols::empty()).unwrap();
    assert!(resolution.diagnostics.is_empty(), "{:?}", resolution.diagnostics);
    let value: Vec<&Value> = resolution.values().collect();
    expect![[r#"{"port":8080,"ratio":1.0,"scale":0.25,"host":"example.org","tags":["a","b"],"initial":"x","parent":null}"#]]
        .assert_eq(&serde_json::to_string(value[0]).unwrap());
}
