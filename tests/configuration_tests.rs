//! Integration tests for generating and reading the debug configuration
use markdown_debug::configuration::{ConfigurationStore, PluginEntry, SETTINGS_DIR};
use markdown_debug::error::DebugError;
use markdown_debug::workspace;
use tokio::fs;

const FILE_NAME: &str = "markdown-debug.settings.json";

async fn sample_workspace() -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("temp workspace");
    fs::write(root.path().join("a.md"), "# A").await.unwrap();
    fs::create_dir_all(root.path().join("docs")).await.unwrap();
    fs::write(root.path().join("docs/b.md"), "b").await.unwrap();
    fs::create_dir_all(root.path().join("plugins/foo")).await.unwrap();
    fs::write(root.path().join("plugins/foo/package.json"), "{}")
        .await
        .unwrap();
    root
}

#[tokio::test]
async fn test_generate_seeds_documents_and_plugins() {
    let root = sample_workspace().await;
    let store = ConfigurationStore::new(FILE_NAME);

    let scan = workspace::scan(root.path());
    let generated = store.generate(root.path(), &scan).await.expect("generate");

    assert_eq!(generated.path, root.path().join(SETTINGS_DIR).join(FILE_NAME));
    assert!(generated.warning().is_none());

    let configuration = store.read(root.path()).await.expect("read back");
    assert_eq!(configuration.test_data_set, vec!["a.md", "docs/b.md"]);
    assert_eq!(configuration.plugins, vec![PluginEntry::new("plugins/foo")]);
    assert!(configuration.markdown_options.html);
    assert!(configuration.markdown_options.typographer);
    assert!(configuration.session_options.save_html_files);
    assert_eq!(configuration.session_options.error_log_file, "errors.log");
}

#[tokio::test]
async fn test_generate_in_empty_workspace_warns() {
    let root = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FILE_NAME);

    let generated = store
        .generate(root.path(), &workspace::scan(root.path()))
        .await
        .unwrap();

    assert!(generated.path.is_file());
    assert!(generated.configuration.test_data_set.is_empty());
    let warning = generated.warning().expect("warning for an empty workspace");
    assert!(warning.contains("Markdown documents"));
}

#[tokio::test]
async fn test_generate_overwrites_previous_file() {
    let root = sample_workspace().await;
    let store = ConfigurationStore::new(FILE_NAME);
    let path = store.locate(root.path()).await.unwrap();
    fs::write(&path, r#"{ "testDataSet": ["old.md"] }"#).await.unwrap();

    store
        .generate(root.path(), &workspace::scan(root.path()))
        .await
        .unwrap();

    let configuration = store.read(root.path()).await.unwrap();
    assert!(!configuration.test_data_set.contains(&"old.md".to_string()));
}

#[tokio::test]
async fn test_write_then_read_preserves_unknown_options() {
    let root = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FILE_NAME);
    let path = store.locate(root.path()).await.unwrap();
    fs::write(
        &path,
        r#"{
    "markdownOptions": { "linkify": true, "langPrefix": "lang-" },
    "plugins": [ { "enabled": false, "path": "p", "options": { "level": 2 } } ],
    "testDataSet": [ "x.md" ]
}"#,
    )
    .await
    .unwrap();

    let configuration = store.read(root.path()).await.unwrap();
    store.write(root.path(), &configuration).await.unwrap();
    let again = store.read(root.path()).await.unwrap();

    assert_eq!(configuration, again);
    assert!(again.markdown_options.linkify);
    assert_eq!(again.markdown_options.extra["langPrefix"], "lang-");
    assert!(!again.plugins[0].enabled);
    assert_eq!(again.plugins[0].options["level"], 2);
    assert_eq!(again.enabled_plugins().count(), 0);
}

#[tokio::test]
async fn test_read_accepts_comments_and_bom() {
    let root = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FILE_NAME);
    let path = store.locate(root.path()).await.unwrap();
    fs::write(
        &path,
        "\u{feff}{\n  // documents\n  \"testDataSet\": [\"a.md\"], /* url: \"http://x\" */\n  \"plugins\": []\n}\n",
    )
    .await
    .unwrap();

    let configuration = store.read(root.path()).await.unwrap();
    assert_eq!(configuration.test_data_set, vec!["a.md"]);
}

#[tokio::test]
async fn test_read_reports_missing_and_malformed() {
    let root = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FILE_NAME);

    let err = store.read(root.path()).await.unwrap_err();
    assert!(matches!(err, DebugError::ConfigurationMissing { .. }));

    let path = store.locate(root.path()).await.unwrap();
    fs::write(&path, r#"{ "testDataSet": [ "a.md", }"#).await.unwrap();
    let err = store.read(root.path()).await.unwrap_err();
    match err {
        DebugError::ConfigurationMalformed { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_read_rejects_duplicate_plugins() {
    let root = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FILE_NAME);
    let path = store.locate(root.path()).await.unwrap();
    fs::write(
        &path,
        r#"{ "plugins": [ { "path": "plugins/foo" }, { "path": "plugins/foo/" } ] }"#,
    )
    .await
    .unwrap();

    let err = store.read(root.path()).await.unwrap_err();
    assert!(matches!(err, DebugError::ConfigurationMalformed { .. }));
}
