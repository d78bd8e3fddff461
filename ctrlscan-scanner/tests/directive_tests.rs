// Tests for directive resolution

use ctrlscan_scanner::{CaseMode, DirectiveResolver, ScanError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_directive(base: &Path, name: &str, content: &str) {
    let dir = base.join("Sida").join("App").join("directives");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

// ============================================================================
// Reference Tests
// ============================================================================

#[test]
fn test_references_are_distinct() {
    let resolver = DirectiveResolver::new("/base");
    let text = r#"
        templateUrl: '/Sida/App/directives/widget.js',
        other: "/Sida/App/directives/widget.js",
        more: '/Sida/App/directives/other_one.js'
    "#;
    let refs: Vec<String> = resolver
        .references(text)
        .into_iter()
        .map(|r| r.value)
        .collect();
    assert_eq!(
        refs,
        vec!["/Sida/App/directives/widget.js", "/Sida/App/directives/other_one.js"]
    );
}

#[test]
fn test_reference_must_end_at_js_extension() {
    let resolver = DirectiveResolver::new("/base");

    assert!(resolver.references("load('x/directives/w.json')").is_empty());

    let refs = resolver.references("load('x/directives/w.js')");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].value, "x/directives/w.js");
}

#[test]
fn test_no_references() {
    let resolver = DirectiveResolver::new("/base");
    assert!(resolver.references("$http.get('/api/x')").is_empty());
}

#[test]
fn test_resolve_path_uses_host_separators() {
    let resolver = DirectiveResolver::new("/base/wwwroot");
    let path = resolver.resolve_path("/Sida/App/directives/widget.js");
    assert_eq!(
        path,
        Path::new("/base/wwwroot")
            .join("Sida")
            .join("App")
            .join("directives")
            .join("widget.js")
    );
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_resolve_reads_endpoints_per_line() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(
        temp_dir.path(),
        "widget.js",
        "return $http.get('api/widgets/list')\n\
         $http.post(\"/api/Widgets/Save\", x);\n\
         templateUrl: 'api/views/widget.html',\n\
         var nothing = 1;\n",
    );

    let resolver = DirectiveResolver::new(temp_dir.path());
    let scan = resolver.resolve("var d = '/Sida/App/directives/widget.js';");

    let endpoints: Vec<String> = scan.endpoints.into_iter().map(|l| l.value).collect();
    assert_eq!(endpoints, vec!["api/widgets/list", "/api/Widgets/Save"]);
    assert!(scan.skipped.is_empty());
}

#[test]
fn test_resolve_lowercase_mode() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(temp_dir.path(), "widget.js", "$http.post('/api/Widgets/Save');\n");

    let resolver = DirectiveResolver::new(temp_dir.path()).with_case(CaseMode::Lowercase);
    let scan = resolver.resolve("'/Sida/App/directives/widget.js'");

    assert_eq!(scan.endpoints.len(), 1);
    assert_eq!(scan.endpoints[0].value, "/api/widgets/save");
}

#[test]
fn test_first_match_per_line_only() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(
        temp_dir.path(),
        "pair.js",
        "get('api/a'); get('api/b');\n",
    );

    let resolver = DirectiveResolver::new(temp_dir.path());
    let scan = resolver.resolve("'/Sida/App/directives/pair.js'");

    let endpoints: Vec<String> = scan.endpoints.into_iter().map(|l| l.value).collect();
    assert_eq!(endpoints, vec!["api/a"]);
}

#[test]
fn test_dedup_across_directive_files() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(temp_dir.path(), "one.js", "get('api/shared')\nget('api/one')\n");
    write_directive(temp_dir.path(), "two.js", "get('api/shared')\n");

    let resolver = DirectiveResolver::new(temp_dir.path());
    let text = "a('/Sida/App/directives/one.js'); b('/Sida/App/directives/two.js');";
    let scan = resolver.resolve(text);

    let endpoints: Vec<String> = scan.endpoints.into_iter().map(|l| l.value).collect();
    assert_eq!(endpoints, vec!["api/shared", "api/one"]);
}

#[test]
fn test_missing_directive_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(temp_dir.path(), "present.js", "get('api/present')\n");

    let resolver = DirectiveResolver::new(temp_dir.path());
    let text = "a('/Sida/App/directives/missing.js'); b('/Sida/App/directives/present.js');";
    let scan = resolver.resolve(text);

    assert_eq!(scan.endpoints.len(), 1);
    assert_eq!(scan.endpoints[0].value, "api/present");
    assert_eq!(scan.skipped.len(), 1);
    assert_eq!(scan.skipped[0].reference, "/Sida/App/directives/missing.js");
}

#[test]
fn test_read_endpoints_missing_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let resolver = DirectiveResolver::new(temp_dir.path());
    let result = resolver.read_endpoints(&temp_dir.path().join("nope.js"));
    assert!(matches!(result, Err(ScanError::DirectiveUnreadable { .. })));
}

#[test]
fn test_directive_endpoint_offset_is_reference_offset() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(temp_dir.path(), "w.js", "get('api/w')\n");

    let resolver = DirectiveResolver::new(temp_dir.path());
    let text = "prefix; load('/Sida/App/directives/w.js');";
    let scan = resolver.resolve(text);

    assert_eq!(scan.endpoints[0].offset, text.find("/Sida").unwrap());
}

#[test]
fn test_missing_directive_spelled_two_ways_skipped_once() {
    let temp_dir = TempDir::new().unwrap();
    let resolver = DirectiveResolver::new(temp_dir.path());

    let text = "a('/Sida/App/directives/w.js'); b('Sida/App/directives/w.js');";
    let scan = resolver.resolve(text);

    assert_eq!(scan.skipped.len(), 1);
    assert_eq!(scan.skipped[0].reference, "/Sida/App/directives/w.js");
    assert_eq!(scan.resolved, 0);
}

#[test]
fn test_directive_spelled_two_ways_read_once() {
    let temp_dir = TempDir::new().unwrap();
    write_directive(temp_dir.path(), "w.js", "get('api/w')\n");

    let resolver = DirectiveResolver::new(temp_dir.path());
    let text = "a('/Sida/App/directives/w.js'); b('Sida/App/directives/w.js');";
    let scan = resolver.resolve(text);

    assert_eq!(scan.resolved, 1);
    assert_eq!(scan.endpoints.len(), 1);
    assert!(scan.skipped.is_empty());
}
