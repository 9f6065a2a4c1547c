//! End-to-end discovery and generation over temporary projects.

use std::path::{Path, PathBuf};

use proc_macro2::{Delimiter, TokenStream, TokenTree};
use wiregen::config::ProjectConfig;
use wiregen::context::GeneratorContext;
use wiregen::discovery::Discovery;
use wiregen::services::{GenerationOutput, Generator};
use wiregen::FromRef;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

fn library_project(root: &Path) {
    write(
        root,
        "src/lib.rs",
        r#"
pub mod greet;
pub mod http;

#[wiregen::module(depends_on(http::HttpModule(8080)), auto_equality)]
#[derive(Default)]
pub struct AppModule;
"#,
    );
    write(
        root,
        "src/greet.rs",
        r#"
pub trait Greeter {}
pub trait Farewell {}

#[wiregen::singleton(cross_wire)]
pub struct English;

impl Greeter for English {}
impl Farewell for English {}

#[wiregen::transient(realm = crate::http::HttpModule, key = "fr")]
pub struct French;

impl Greeter for French {}
"#,
    );
    write(
        root,
        "src/http.rs",
        r#"
#[wiregen::module(only_realm, use_method = "add_http", generate_attribute)]
pub struct HttpModule {
    pub port: u16,
    pub verbose: bool,
}

impl HttpModule {
    pub fn new(port: u16) -> Self {
        Self { port, verbose: false }
    }
}
"#,
    );
}

fn run(project: &Path) -> GenerationOutput {
    let context = GeneratorContext::load(project).unwrap();
    let discovery = Discovery::from_ref(&context).discover().unwrap();
    Generator::from_ref(&context).generate(&discovery).unwrap()
}

fn compact(output: &GenerationOutput, name: &str) -> String {
    output
        .file(name)
        .unwrap_or_else(|| panic!("missing {}", name))
        .contents
        .split_whitespace()
        .collect()
}

#[test]
fn test_generates_library_modules() {
    let dir = tempfile::tempdir().unwrap();
    library_project(dir.path());

    let output = run(dir.path());
    assert!(!output.has_errors(), "{:?}", output.diagnostics);

    let names: Vec<_> = output.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "crate.http.HttpModule.module.g.rs",
            "crate.http.HttpModule.registrations.g.rs",
            "crate.AppModule.module.g.rs",
            "crate.AppModule.registrations.g.rs",
        ]
    );

    let app = compact(&output, "crate.AppModule.module.g.rs");
    assert!(app.contains("ModuleRef::module(crate::http::HttpModule::new(8080))"));
    assert!(app.contains("::wiregen::runtime::value_eq(self,other)"));

    let app_registrations = compact(&output, "crate.AppModule.registrations.g.rs");
    assert!(app_registrations.contains("RegistrationOp::CrossWire{"));
    assert!(app_registrations.contains("TypeKey::named(\"crate::greet::Greeter\")"));
    assert!(app_registrations.contains("TypeKey::named(\"crate::greet::Farewell\")"));
    assert!(!app_registrations.contains("crate::greet::French"));

    let http = compact(&output, "crate.http.HttpModule.module.g.rs");
    assert!(http.contains("pubstructHttpModuleDependency"));
    assert!(http.contains("pubfnwith_verbose(mutself,value:bool)->Self"));
    assert!(http.contains("fnadd_http(&mutself,port:u16)"));

    let http_registrations = compact(&output, "crate.http.HttpModule.registrations.g.rs");
    assert!(http_registrations.contains("RegistrationOp::AddKeyed("));
    assert!(http_registrations.contains(".with_key(\"fr\")"));
    assert!(!http_registrations.contains("crate::greet::English"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    library_project(dir.path());

    let first = run(dir.path());
    let second = run(dir.path());
    assert_eq!(first, second);

    let out_a = dir.path().join("out-a");
    let out_b = dir.path().join("out-b");
    first.write_to(&out_a).unwrap();
    second.write_to(&out_b).unwrap();
    for file in &first.files {
        let a = std::fs::read(out_a.join(&file.name)).unwrap();
        let b = std::fs::read(out_b.join(&file.name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file.name);
    }
}

#[test]
fn test_program_module_from_entry_point() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "wiregen.toml", "auto_generate_module = true\n");
    write(
        dir.path(),
        "src/main.rs",
        r#"
mod app;

fn main() {
    let mut services = wiregen::runtime::ServiceCollection::new();
    services.add_module(app::AppModule::default()).unwrap();
}
"#,
    );
    write(
        dir.path(),
        "src/app.rs",
        "#[wiregen::module]\n#[derive(Default)]\npub struct AppModule;\n",
    );

    let output = run(dir.path());
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.modules, vec!["crate::app::AppModule", "crate::ProgramModule"]);

    let program = compact(&output, "crate.ProgramModule.module.g.rs");
    assert!(program.contains("pubstructProgramModule;"));
    assert!(program.contains("<crate::app::AppModuleas::std::default::Default>::default()"));
}

#[test]
fn test_malformed_module_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/lib.rs",
        r#"
#[wiregen::module(registration = "upsert")]
pub struct Broken;

#[wiregen::module]
pub struct Working;

#[wiregen::transient]
pub struct Clock;
"#,
    );

    let output = run(dir.path());
    assert!(output.has_errors());
    assert_eq!(output.modules, vec!["crate::Working"]);
    assert!(output.file("crate.Working.registrations.g.rs").is_some());
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.is_error() && d.line == 2));
}

/// Token texts of a unit, so formatting differences do not count.
fn token_texts(source: &str) -> Vec<String> {
    fn walk(stream: TokenStream, out: &mut Vec<String>) {
        for tree in stream {
            match tree {
                TokenTree::Group(group) => {
                    let (open, close) = match group.delimiter() {
                        Delimiter::Parenthesis => ("(", ")"),
                        Delimiter::Brace => ("{", "}"),
                        Delimiter::Bracket => ("[", "]"),
                        Delimiter::None => ("", ""),
                    };
                    if !open.is_empty() {
                        out.push(open.to_string());
                    }
                    walk(group.stream(), out);
                    if !close.is_empty() {
                        out.push(close.to_string());
                    }
                }
                other => out.push(other.to_string()),
            }
        }
    }

    let stream: TokenStream = source.parse().unwrap();
    let mut out = Vec::new();
    walk(stream, &mut out);
    out
}

/// The units `tests/app` includes must match a fresh generator run.
///
/// Set `WIREGEN_UPDATE_FIXTURES=1` to rewrite them.
#[test]
fn test_app_fixture_units_are_current() {
    let project = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/app");
    let config = ProjectConfig {
        project_dir: project.clone(),
        source_dir: PathBuf::from("."),
        ..ProjectConfig::default()
    };
    let context = GeneratorContext::new(config);
    let discovery = Discovery::from_ref(&context).discover().unwrap();
    let output = Generator::from_ref(&context).generate(&discovery).unwrap();
    assert!(!output.has_errors(), "{:?}", output.diagnostics);

    let generated = project.join("generated");
    if std::env::var_os("WIREGEN_UPDATE_FIXTURES").is_some() {
        output.write_to(&generated).unwrap();
    }

    let mut produced: Vec<String> = output.files.iter().map(|f| f.name.clone()).collect();
    produced.sort();
    let mut checked_in: Vec<String> = std::fs::read_dir(&generated)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    checked_in.sort();
    assert_eq!(produced, checked_in);

    for file in &output.files {
        let on_disk = std::fs::read_to_string(generated.join(&file.name)).unwrap();
        assert_eq!(
            token_texts(&on_disk),
            token_texts(&file.contents),
            "{} is stale; rerun with WIREGEN_UPDATE_FIXTURES=1",
            file.name
        );
    }
}
