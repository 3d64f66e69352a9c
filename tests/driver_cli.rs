use std::path::Path;
use std::process::{Command, Output};

fn run_driver(args: &[&str]) -> Output {
    let bin_path = std::env::var("CARGO_BIN_EXE_markdown-debug-driver")
        .unwrap_or_else(|_| "target/debug/markdown-debug-driver".to_string());

    Command::new(bin_path)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run markdown-debug-driver")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

#[test]
fn driver_renders_and_writes_sentinels() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("a.md"), "# A").unwrap();
    std::fs::write(root.path().join("b.md"), "**b**").unwrap();
    let configuration = root.path().join("configuration.json");
    std::fs::write(
        &configuration,
        r#"{
    // saved next to the sources
    "testDataSet": [ "a.md", "b.md" ]
}"#,
    )
    .unwrap();

    let html_output = out.path().join("preview.html");
    let name_output = out.path().join("last-file-name.txt");
    let output = run_driver(&[
        "--configuration",
        path_arg(&configuration),
        "--root",
        path_arg(root.path()),
        "--html-output",
        path_arg(&html_output),
        "--name-output",
        path_arg(&name_output),
    ]);

    assert!(
        output.status.success(),
        "driver failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        std::fs::read_to_string(&html_output).unwrap(),
        "<p><strong>b</strong></p>\n"
    );
    assert_eq!(std::fs::read_to_string(&name_output).unwrap(), "b.md");
    assert!(
        std::fs::read_to_string(root.path().join("a.html"))
            .unwrap()
            .starts_with('\u{feff}')
    );
}

#[test]
fn driver_fails_on_malformed_configuration() {
    let root = tempfile::tempdir().unwrap();
    let html_output = root.path().join("preview.html");
    let name_output = root.path().join("last-file-name.txt");

    let output = run_driver(&[
        "--configuration-json",
        "{ not json",
        "--root",
        path_arg(root.path()),
        "--html-output",
        path_arg(&html_output),
        "--name-output",
        path_arg(&name_output),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("markdown-debug-driver:"));
    assert!(!html_output.exists());
    assert!(!name_output.exists());
}
