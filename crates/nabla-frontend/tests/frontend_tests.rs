use expect_test::expect;
use miette::Diagnostic;
use nabla_frontend::{Compilation, Frontend, ModuleSource};
use nabla_source::{NablaConfig, SourceFile};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn compile(root: &str, modules: &[(&str, &str, &str)]) -> Compilation {
    init_logger();
    let modules: Vec<ModuleSource> = modules
        .iter()
        .map(|(module, location, text)| ModuleSource::new(*module, SourceFile::new(*location, *text)))
        .collect();
    Frontend::new(NablaConfig::default()).compile(&SourceFile::new("main.nabla", root), &modules)
}

/// One line per report: its code and message.
fn summarize(compilation: &Compilation) -> String {
    compilation
        .reports
        .iter()
        .map(|report| {
            let code = report.code().map(|code| code.to_string()).unwrap_or_default();
            format!("{code}: {report}\n")
        })
        .collect()
}

#[test]
fn test_compile_across_modules() {
    let compilation = compile(
        "use net::*\nuse shared::Tag\nServer { tags = [Tag { name = \"edge\" }] }",
        &[
            ("net", "net.nabla", "use shared::Tag\ndef Server = { port: Number = 80, tags: [Tag] = [] }"),
            ("shared", "tag.nabla", "def Tag = { name: String }"),
        ],
    );
    assert!(!compilation.has_errors(), "{}", summarize(&compilation));
    expect![[r#"
        [
            "{port: 80, tags: [{name: \"edge\"}]}",
        ]
    "#]]
    .assert_debug_eq(&compilation.values().iter().map(|value| value.to_string()).collect::<Vec<_>>());
}

#[test]
fn test_syntax_errors_keep_the_tree() {
    let compilation = compile("def A = { x: Number = 1 }\ndef = 2\nA {}", &[]);
    assert!(compilation.has_errors());
    let parse = compilation.parse.as_ref().unwrap();
    assert_eq!(parse.program.globals.len(), 3);
    expect![[r#"
        [
            "{x: 1}",
        ]
    "#]]
    .assert_debug_eq(&compilation.values().iter().map(|value| value.to_string()).collect::<Vec<_>>());
    expect![[r#"
        nabla_syntax::expected_ident: Expected an identifier, found `=`
    "#]]
    .assert_eq(&summarize(&compilation));
}

#[test]
fn test_warnings_do_not_count_as_errors() {
    let compilation = compile("def A = { x: Number = 1. }\nA {}", &[]);
    assert!(!compilation.has_errors());
    assert_eq!(compilation.reports.len(), 1);
    assert_eq!(compilation.values()[0].to_string(), "{x: 1.0}");
}

#[test]
fn test_reports_point_into_their_own_document() {
    let compilation = compile(
        "use lib::Bad\nBad {}\nMissing {}",
        &[("lib", "lib.nabla", "def Bad = { n: Number = \"x\" }")],
    );
    assert!(compilation.has_errors());
    let rendered: Vec<String> = compilation.reports.iter().map(|report| report.render()).collect();
    assert_eq!(rendered.len(), 2);
    assert!(rendered[0].contains("main.nabla"), "{}", rendered[0]);
    assert!(rendered[0].contains("Missing"), "{}", rendered[0]);
    assert!(rendered[1].contains("lib.nabla"), "{}", rendered[1]);
    assert!(rendered[1].contains("Type mismatch"), "{}", rendered[1]);
}

#[test]
fn test_module_errors_are_reported_once() {
    let compilation = compile(
        "use m::A\nA {}",
        &[
            ("m", "a.nabla", "def A = { x: Number = 1 }"),
            ("m", "b.nabla", "def A = Bool"),
        ],
    );
    expect![[r#"
        nabla_resolve::duplicate_definition: Duplicate definition: `A` is defined multiple times
    "#]]
    .assert_eq(&summarize(&compilation));
    assert!(compilation.reports[0].render().contains("b.nabla"));
    assert_eq!(compilation.values()[0].to_string(), "{x: 1}");
}

#[test]
fn test_fatal_limit_in_root() {
    init_logger();
    let config = NablaConfig::from_toml_str("[limits]\nmax_tokens = 3").unwrap();
    let frontend = Frontend::new(config);
    let root = SourceFile::new("main.nabla", "def A = { x: Number }");
    let compilation = frontend.compile(&root, &[]);
    assert!(compilation.parse.is_none());
    assert!(compilation.resolution.is_none());
    expect![[r#"
        nabla_syntax::token_limit: Document has 8 tokens, more than the configured limit of 3
    "#]]
    .assert_eq(&summarize(&compilation));
}

#[test]
fn test_fatal_limit_in_module_skips_it() {
    init_logger();
    let config = NablaConfig::from_toml_str("[limits]\nmax_tokens = 4").unwrap();
    let frontend = Frontend::new(config);
    let module = ModuleSource::new("big", SourceFile::new("big.nabla", "def A = { x: Number }"));
    let root = SourceFile::new("main.nabla", "use big::A");
    let compilation = frontend.compile(&root, &[module]);
    assert!(compilation.parse.is_some());
    expect![[r#"
        nabla_syntax::token_limit: Document has 8 tokens, more than the configured limit of 4
        nabla_resolve::unresolved_import: Unresolved import: `big::A` is neither a module nor a definition
    "#]]
    .assert_eq(&summarize(&compilation));
}

#[test]
fn test_module_files_from_manifest() {
    let config = NablaConfig::from_toml_str(
        r#"
[modules]
net = "net.nabla"
"shared::types" = { files = ["a.nabla", "b.nabla"] }
"#,
    )
    .unwrap();
    let frontend = Frontend::new(config);
    assert_eq!(
        frontend.module_files(),
        vec![
            ("net", "net.nabla"),
            ("shared::types", "a.nabla"),
            ("shared::types", "b.nabla"),
        ]
    );
}
