use std::io::Write;

use scsc::config::{ENV_MAX_ERRORS, ENV_USING};
use scsc::{compile_file, Config, Error};
use tempfile::NamedTempFile;

fn source_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn compiles_program_from_disk() {
    let _ = env_logger::builder().is_test(true).try_init();
    let file = source_file(
        b"// running total\n\
          int total;\n\
          void add(int n) { total = total + n; }\n\
          { int i; i = 0; while (i < 5) { add(i); i = i + 1; } }\n",
    );
    let module = compile_file(file.path(), &Config::default()).unwrap();
    assert!(module.field("total").is_some());
    assert!(module.method("add").is_some());
    assert_eq!(module.methods.len(), 2);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = compile_file(dir.path().join("absent.sc"), &Config::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn invalid_utf8_is_lexical_error() {
    let file = source_file(&[b'{', 0xff, 0xfe, b'}']);
    match compile_file(file.path(), &Config::default()) {
        Err(Error::Lexical { message }) => assert!(message.contains("UTF-8"), "{}", message),
        other => panic!("expected lexical error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn failed_file_carries_diagnostics() {
    let file = source_file(b"{ int x; x = true; }");
    let err = compile_file(file.path(), &Config::default()).unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(err.diagnostics()[0].location.line, 1);
}

// Both variables are handled in one test so parallel tests never race on them
#[test]
fn config_from_environment() {
    std::env::set_var(ENV_USING, "System, System.Text,");
    std::env::set_var(ENV_MAX_ERRORS, "7");
    let config = Config::from_env().unwrap();
    assert_eq!(config.using_namespaces, ["System", "System.Text"]);
    assert_eq!(config.max_errors, 7);

    std::env::set_var(ENV_MAX_ERRORS, "many");
    assert!(matches!(Config::from_env(), Err(Error::Config { .. })));

    std::env::remove_var(ENV_USING);
    std::env::remove_var(ENV_MAX_ERRORS);
}
