use expect_test::{expect, Expect};
use nabla_resolve::{resolve, Document, ExternalSymbols, LocatedError, Resolution, ResolutionError};
use nabla_syntax::{ast::Program, parse};

const MODULE: &str = r#"
def Config = { name: String = "x" }
def Other = { flag: Bool = true }
"#;

fn program(source: &str) -> Program {
    let parse = parse(source).unwrap();
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics);
    parse.program
}

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
    for LocatedError { location, error } in &resolution.external_diagnostics {
        out.push_str(&format!("! {location}: {error}\n"));
    }
    out
}

/// Resolve `root` against a single module registered as `mod`.
fn check_with_module(root: &str, expect: Expect) {
    let module = program(MODULE);
    let documents = [Document {
        module: "mod",
        location: "mod.nabla",
        program: &module,
    }];
    let (externals, errors) = ExternalSymbols::build(&documents);
    assert!(errors.is_empty(), "{errors:?}");
    let root = program(root);
    let resolution = resolve(&root, &externals).unwrap();
    expect.assert_eq(&render(&resolution));
}

#[test]
fn test_wildcard_import() {
    check_with_module(
        "use mod::*\nConfig {}\nOther { flag = false }",
        expect![[r#"
            {name: "x"}
            {flag: false}
        "#]],
    );
}

#[test]
fn test_aliased_import_binds_only_the_alias() {
    check_with_module(
        "use mod::Config as Cfg\nCfg {}\nConfig {}",
        expect![[r#"
            {name: "x"}
            <none>
            ! Unresolved name: could not find `Config` in this scope
        "#]],
    );
}

#[test]
fn test_grouped_import() {
    check_with_module(
        "use mod::{Config, Other as O}\nConfig { name = \"y\" }\nO {}",
        expect![[r#"
            {name: "y"}
            {flag: true}
        "#]],
    );
}

#[test]
fn test_qualified_path_without_import() {
    check_with_module(
        "mod::Config {}",
        expect![[r#"
            {name: "x"}
        "#]],
    );
}

#[test]
fn test_import_errors() {
    check_with_module(
        "use nowhere::Thing\nuse mod::Missing\nuse mod::* as everything\nuse mod::Config as \"cfg\"",
        expect![[r#"
            ! Unresolved import: `nowhere::Thing` is neither a module nor a definition
            ! Unresolved import: `mod::Missing` is neither a module nor a definition
            ! An alias can only rename a single imported item
            ! Import aliases must be identifiers
        "#]],
    );
}

#[test]
fn test_import_clashes() {
    check_with_module(
        "use mod::Config\nuse mod::Other as Config\ndef Other = Number",
        expect![[r#"
            ! Duplicate definition: `Config` is defined multiple times
        "#]],
    );
}

#[test]
fn test_explicit_import_clashes_with_local_def() {
    check_with_module(
        "use mod::Config\ndef Config = { local: Bool = true }\nConfig {}",
        expect![[r#"
            {local: true}
            ! Duplicate definition: `Config` is defined multiple times
        "#]],
    );
}

#[test]
fn test_local_def_shadows_wildcard() {
    check_with_module(
        "use mod::*\ndef Config = { local: Bool = true }\nConfig {}\nOther {}",
        expect![[r#"
            {local: true}
            {flag: true}
        "#]],
    );
}

#[test]
fn test_module_alias() {
    let net = program("def Server = { port: Number = 80 }");
    let documents = [Document {
        module: "lib::net",
        location: "net.nabla",
        program: &net,
    }];
    let (externals, errors) = ExternalSymbols::build(&documents);
    assert!(errors.is_empty(), "{errors:?}");
    let root = program("use lib::net as n\nn::Server {}\nlib::net::Server { port = 8080 }");
    let resolution = resolve(&root, &externals).unwrap();
    expect![[r#"
        {port: 80}
        {port: 8080}
    "#]]
    .assert_eq(&render(&resolution));
}

#[test]
fn test_documents_sharing_a_module() {
    let first = program("def Shared = { a: Number = 1 }");
    let second = program("def Extra = { b: Shared = Shared {} }\ndef Shared = Bool");
    let documents = [
        Document {
            module: "m",
            location: "first.nabla",
            program: &first,
        },
        Document {
            module: "m",
            location: "second.nabla",
            program: &second,
        },
    ];
    let (externals, errors) = ExternalSymbols::build(&documents);
    match &errors[..] {
        [LocatedError {
            location,
            error: ResolutionError::DuplicateDefinition { name, previous_span, note, .. },
        }] => {
            assert_eq!(location, "second.nabla");
            assert_eq!(name, "Shared");
            assert_eq!(*previous_span, None);
            assert_eq!(note.as_deref(), Some("`Shared` is already defined in `first.nabla`"));
        }
        other => panic!("unexpected errors {other:?}"),
    }

    // Names from the other file resolve through the shared namespace.
    let root = program("use m::Extra\nExtra {}");
    let resolution = resolve(&root, &externals).unwrap();
    expect![[r#"
        {b: {a: 1}}
    "#]]
    .assert_eq(&render(&resolution));
}

#[test]
fn test_external_cycles_reported_at_build() {
    let module = program("def A = B\ndef B = A");
    let documents = [Document {
        module: "cyc",
        location: "cyc.nabla",
        program: &module,
    }];
    let (externals, errors) = ExternalSymbols::build(&documents);
    let rendered: Vec<String> = errors
        .iter()
        .map(|located| format!("{}: {}", located.location, located.error))
        .collect();
    expect![[r#"
        [
            "cyc.nabla: Cyclic type: `cyc::A` is defined in terms of itself (cyc::A -> cyc::B -> cyc::A)",
        ]
    "#]]
    .assert_debug_eq(&rendered);

    // Using the def still reports, but the cycle itself is not repeated.
    let root = program("use cyc::A\nA {}");
    let resolution = resolve(&root, &externals).unwrap();
    expect![[r#"
        <none>
        ! Cyclic type: `cyc::A` is defined in terms of itself (cyc::A -> cyc::B -> cyc::A)
    "#]]
    .assert_eq(&render(&resolution));
}

#[test]
fn test_external_default_errors_are_located() {
    let module = program("def Bad = { n: Number = \"x\" }");
    let documents = [Document {
        module: "mod",
        location: "mod.nabla",
        program: &module,
    }];
    let (externals, errors) = ExternalSymbols::build(&documents);
    assert!(errors.is_empty(), "{errors:?}");
    let root = program("use mod::Bad\nBad {}");
    let resolution = resolve(&root, &externals).unwrap();
    assert!(resolution.has_errors());
    expect![[r#"
        <none>
        ! mod.nabla: Type mismatch: expected `Number`, found `"x"`
    "#]]
    .assert_eq(&render(&resolution));
}
