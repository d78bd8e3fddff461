use ctrlscan::handlers::*;
use ctrlscan::menu::MenuChoice;
use ctrlscan_core::catalog::{PersistMode, RedirectPolicy, ScanOptions};
use ctrlscan_core::config::Config;
use ctrlscan_core::data::Database;
use ctrlscan_core::model::SessionStatus;
use ctrlscan_core::{CatalogError, CatalogStore, MemoryStore};
use ctrlscan_scanner::CaseMode;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn controller_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let views = dir.path().join("Views").join("home");
    fs::create_dir_all(&views).unwrap();
    fs::write(
        views.join("homecontroller.js"),
        "$http.get('/api/home/summary');\n$state.go('home.dashboard');\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_expand_path_leaves_absolute_paths() {
    assert_eq!(expand_path("/tmp/ctrlscan"), PathBuf::from("/tmp/ctrlscan"));
}

#[test]
fn test_expand_path_expands_tilde() {
    if std::env::var("HOME").is_err() {
        return;
    }
    assert!(!expand_path("~/ctrlscan").starts_with("~"));
}

#[test]
fn test_build_scan_options_defaults() {
    let options = build_scan_options(&Config::default(), &ScanOverrides::default());
    let defaults = ScanOptions::default();

    assert_eq!(options.file_suffix, defaults.file_suffix);
    assert_eq!(options.directive_root, None);
    assert_eq!(options.directive_case, CaseMode::Preserve);
    assert_eq!(options.redirect_policy, RedirectPolicy::FirstInFile);
    assert_eq!(options.persist_mode, PersistMode::Incremental);
}

#[test]
fn test_build_scan_options_overrides_win() {
    let config = Config::parse(
        r#"
[scan]
file_suffix = "ctrl.js"
redirect_policy = "first"
"#,
    )
    .unwrap();
    let overrides = ScanOverrides {
        directive_root: Some(PathBuf::from("/srv/app")),
        file_suffix: Some("controller.ts".to_string()),
        batched: true,
        lowercase_directives: true,
        redirect_policy: Some(RedirectPolicy::NearestPreceding),
    };

    let options = build_scan_options(&config, &overrides);

    assert_eq!(options.directive_root, Some(PathBuf::from("/srv/app")));
    assert_eq!(options.file_suffix, "controller.ts");
    assert_eq!(options.persist_mode, PersistMode::Batched);
    assert_eq!(options.directive_case, CaseMode::Lowercase);
    assert_eq!(options.redirect_policy, RedirectPolicy::NearestPreceding);
}

#[test]
fn test_build_scan_options_keeps_config_values() {
    let config = Config::parse(
        r#"
[scan]
file_suffix = "ctrl.js"
lowercase_directives = true
batched = true
"#,
    )
    .unwrap();

    let options = build_scan_options(&config, &ScanOverrides::default());

    assert_eq!(options.file_suffix, "ctrl.js");
    assert_eq!(options.directive_case, CaseMode::Lowercase);
    assert_eq!(options.persist_mode, PersistMode::Batched);
}

#[test]
fn test_resolve_scan_root_prefers_argument() {
    let config = Config::parse("[scan]\nroot = \"/from/config\"\n").unwrap();

    let root = resolve_scan_root(Some("/from/args"), &config).unwrap();
    assert_eq!(root, PathBuf::from("/from/args"));

    let root = resolve_scan_root(None, &config).unwrap();
    assert_eq!(root, PathBuf::from("/from/config"));
}

#[test]
fn test_resolve_scan_root_requires_some_root() {
    assert!(resolve_scan_root(None, &Config::default()).is_err());
}

#[test]
fn test_scan_with_session_missing_root_writes_nothing() {
    let mut db = Database::in_memory().unwrap();
    let missing = Path::new("/definitely/not/here");

    let result = scan_with_session(&mut db, missing, ScanOptions::default(), false);

    match result {
        Err(CatalogError::RootNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected RootNotFound, got {:?}", other.map(|s| s.files_scanned)),
    }
    assert!(db.get_sessions().unwrap().is_empty());
    assert!(db.pages().unwrap().is_empty());
}

#[test]
fn test_scan_with_session_records_completed_session() {
    let tree = controller_tree();
    let mut db = Database::in_memory().unwrap();

    let summary = scan_with_session(&mut db, tree.path(), ScanOptions::default(), false).unwrap();
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.endpoints_added, 1);

    let sessions = db.get_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[0].files_scanned, 1);
    assert_eq!(sessions[0].endpoints_added, 1);
    assert!(sessions[0].end_time.is_some());
}

#[test]
fn test_run_scan_into_memory_store() {
    let tree = controller_tree();
    let mut store = MemoryStore::new();

    let summary = run_scan(&mut store, tree.path(), ScanOptions::default(), false).unwrap();

    assert_eq!(summary.pages_created, 1);
    assert_eq!(store.endpoints().len(), 1);
    assert_eq!(store.endpoints()[0].url, "/api/home/summary");
    assert_eq!(store.endpoints()[0].redirect, "home.dashboard");
}

#[test]
fn test_format_scan_summary() {
    colored::control::set_override(false);
    let tree = controller_tree();
    let mut store = MemoryStore::new();
    let summary = run_scan(&mut store, tree.path(), ScanOptions::default(), false).unwrap();

    let text = format_scan_summary(&summary);

    assert!(text.contains("Folder: home"));
    assert!(text.contains("Controller: homecontroller"));
    assert!(text.contains("+ /api/home/summary (Redirect: home.dashboard)"));
    assert!(text.contains("Endpoints added:    1"));
}

#[test]
fn test_format_scan_summary_hints_directive_root() {
    colored::control::set_override(false);
    let tree = controller_tree();
    let controller = tree.path().join("Views").join("home").join("homecontroller.js");
    fs::write(
        &controller,
        "$http.get('/api/home/summary');\nvar w = '/Sida/App/directives/widget.js';\n",
    )
    .unwrap();
    let mut store = MemoryStore::new();

    let summary = run_scan(&mut store, tree.path(), ScanOptions::default(), false).unwrap();
    let text = format_scan_summary(&summary);

    assert!(text.contains("Directives skipped: 1"));
    assert!(text.contains("--directive-root"));
}

#[test]
fn test_format_scan_summary_no_hint_without_directives() {
    colored::control::set_override(false);
    let tree = controller_tree();
    let mut store = MemoryStore::new();

    let summary = run_scan(&mut store, tree.path(), ScanOptions::default(), false).unwrap();

    assert!(!format_scan_summary(&summary).contains("--directive-root"));
}

#[test]
fn test_app_context_without_config_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let ctx = AppContext::load(dir.path().to_path_buf()).unwrap();

    assert_eq!(ctx.config, Config::default());
    assert_eq!(ctx.database_path(), dir.path().join("ctrlscan.db"));
    assert!(ctx.open_database().is_err());
}

#[test]
fn test_app_context_opens_existing_database() {
    let dir = TempDir::new().unwrap();
    Database::new(&dir.path().join("ctrlscan.db")).unwrap();

    let ctx = AppContext::load(dir.path().to_path_buf()).unwrap();

    assert!(ctx.open_database().is_ok());
}

#[test]
fn test_menu_choice_parse() {
    assert_eq!(MenuChoice::parse("1"), MenuChoice::Scan);
    assert_eq!(MenuChoice::parse(" 2 "), MenuChoice::Manual);
    assert_eq!(MenuChoice::parse("3"), MenuChoice::List);
    assert_eq!(MenuChoice::parse("4"), MenuChoice::Exit);
    assert_eq!(MenuChoice::parse("9"), MenuChoice::Invalid);
    assert_eq!(MenuChoice::parse(""), MenuChoice::Invalid);
}
