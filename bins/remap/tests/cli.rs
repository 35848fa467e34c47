use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use remap::config::MapConfig;
use remap::run::remap_lines;

const CONFIG: &str = r#"
[first]
shape = "sequence"
element = "string"
fields = ["_skip", "id", "bid", "symbol"]

[second]
shape = "mapping"
value = "any"
fields = ["id", "bid", "symbol"]

[links]
id = "id"
bid = "bid"
symbol = "symbol"
"#;

fn write_config(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("remap-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, CONFIG).unwrap();
    path
}

fn run_binary(args: &[&str], stdin: &str) -> (bool, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_remap"))
        .args(args)
        .env("RUST_LOG", "error")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
    )
}

#[test]
fn forward_and_reverse_through_library() {
    let config = MapConfig::parse(CONFIG).unwrap();
    let mapper = config.build().unwrap();
    let (first, second) = mapper.descriptors();

    let mut out = Vec::new();
    let rows = remap_lines(
        &mapper,
        first.shape(),
        "[\"\", \"7\", \"1.5\", \" EURUSD \"]\n".as_bytes(),
        &mut out,
    )
    .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"bid\":\"1.5\",\"id\":\"7\",\"symbol\":\"EURUSD\"}\n"
    );

    let mut out = Vec::new();
    remap_lines(
        &mapper,
        second.shape(),
        "{\"id\": 7, \"bid\": 1.5}\n".as_bytes(),
        &mut out,
    )
    .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "[\"\",\"7\",\"1.5000\",\"\"]\n"
    );
}

#[test]
fn binary_maps_stdin() {
    let config = write_config("forward");
    let (ok, stdout) = run_binary(
        &["--config", config.to_str().unwrap()],
        "[\"\", \"1\", \"2\", \"X\"]\n[\"\", \"\", \"\", \"\"]\n",
    );
    std::fs::remove_file(&config).ok();

    assert!(ok);
    assert_eq!(
        stdout,
        "{\"bid\":\"2\",\"id\":\"1\",\"symbol\":\"X\"}\nnull\n"
    );
}

#[test]
fn binary_reverse() {
    let config = write_config("reverse");
    let (ok, stdout) = run_binary(
        &["--config", config.to_str().unwrap(), "--reverse"],
        "{\"id\": 1, \"symbol\": \"X\"}\n",
    );
    std::fs::remove_file(&config).ok();

    assert!(ok);
    assert_eq!(stdout, "[\"\",\"1\",\"\",\"X\"]\n");
}

#[test]
fn binary_fails_on_bad_row() {
    let config = write_config("bad-row");
    let (ok, _) = run_binary(&["--config", config.to_str().unwrap()], "{\"id\": 1}\n");
    std::fs::remove_file(&config).ok();
    assert!(!ok);
}

#[test]
fn binary_fails_without_config() {
    let (ok, stdout) = run_binary(&["--config", "/nonexistent/remap.toml"], "");
    assert!(!ok);
    assert!(stdout.is_empty());
}
