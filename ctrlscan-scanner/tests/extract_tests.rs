// Tests for endpoint and redirect extraction

use ctrlscan_scanner::{
    Capture, Pattern, PatternSet, extract_endpoints, extract_endpoints_located,
    extract_redirects,
};

// ============================================================================
// Endpoint Extraction Tests
// ============================================================================

#[test]
fn test_quoted_api_path_found_once() {
    let endpoints = extract_endpoints(r#"var x = "/api/foo/bar";"#);
    assert_eq!(endpoints, vec!["/api/foo/bar"]);
}

#[test]
fn test_query_string_endpoint() {
    let endpoints = extract_endpoints(r#"$http.get("/api/users?id=5").then(done);"#);
    assert_eq!(endpoints, vec!["/api/users?id=5"]);
}

#[test]
fn test_template_literal_endpoint() {
    let endpoints = extract_endpoints("$http.get(`/api/items/${id}`);");
    assert_eq!(endpoints, vec!["/api/items/${id}"]);
}

#[test]
fn test_scope_api_assignment() {
    let endpoints = extract_endpoints("$scope.saveAPI = 'Users/Save';");
    assert_eq!(endpoints, vec!["Users/Save"]);
}

#[test]
fn test_scope_api_assignment_is_trimmed() {
    let endpoints = extract_endpoints("$scope.listAPI = ' api/x ';");
    assert_eq!(endpoints, vec!["api/x"]);
}

#[test]
fn test_relative_api_path() {
    let endpoints = extract_endpoints("$http.post('api/orders/create', data);");
    assert_eq!(endpoints, vec!["api/orders/create"]);
}

#[test]
fn test_url_property_deduplicated() {
    let endpoints = extract_endpoints("$http({ url: 'api/reports', method: 'GET' });");
    assert_eq!(endpoints, vec!["api/reports"]);
}

#[test]
fn test_catch_all_unquoted_path() {
    let endpoints = extract_endpoints("// see api/legacy/thing for details");
    assert_eq!(endpoints, vec!["api/legacy/thing"]);
}

#[test]
fn test_catch_all_does_not_duplicate_quoted_match() {
    let endpoints = extract_endpoints("load('/api/a/b');");
    assert!(!endpoints.contains(&"api/a/b".to_string()));
    assert_eq!(endpoints, vec!["/api/a/b"]);
}

#[test]
fn test_case_insensitive_match_preserves_case() {
    let endpoints = extract_endpoints(r#"get("/API/Foo")"#);
    assert_eq!(endpoints, vec!["/API/Foo"]);
}

#[test]
fn test_multiple_endpoints_pattern_order() {
    let text = r#"a = '/api/a'; b = 'api/b'; c = "/api/c";"#;
    let endpoints = extract_endpoints(text);
    assert_eq!(endpoints, vec!["/api/a", "/api/c", "api/b"]);
}

#[test]
fn test_no_endpoints() {
    assert!(extract_endpoints("").is_empty());
    assert!(extract_endpoints("var x = 'hello world';").is_empty());
}

#[test]
fn test_located_keeps_earliest_offset() {
    let text = "x('/api/one'); y('/api/one');";
    let located = extract_endpoints_located(text);
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].offset, text.find("/api/one").unwrap());
}

// ============================================================================
// Pattern Set Tests
// ============================================================================

#[test]
fn test_builtin_pattern_sets() {
    assert_eq!(PatternSet::endpoints().len(), 7);
    assert_eq!(PatternSet::redirects().len(), 5);
    assert_eq!(
        PatternSet::endpoints().iter().filter(|p| p.is_fallback()).count(),
        1
    );
}

#[test]
fn test_candidates_are_raw_and_repeated() {
    // Two non-fallback patterns match the same literal
    let candidates = PatternSet::endpoints().candidates(r#"var x = "/api/foo/bar";"#);
    let values: Vec<&str> = candidates.iter().map(|m| m.value).collect();
    assert_eq!(values, vec!["/api/foo/bar", "/api/foo/bar"]);
}

#[test]
fn test_custom_pattern_whole_capture() {
    let pattern = Pattern::new("ws", r"ws://\S+", Capture::Whole).unwrap();
    let set = PatternSet::new(vec![pattern]);
    let candidates = set.candidates("connect ws://host/feed now");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].value, "ws://host/feed");
}

#[test]
fn test_invalid_pattern_is_error() {
    assert!(Pattern::new("broken", r"(unclosed", Capture::Whole).is_err());
}

// ============================================================================
// Redirect Extraction Tests
// ============================================================================

#[test]
fn test_redirect_quoted() {
    assert_eq!(
        extract_redirects("$state.go('home.dashboard')"),
        vec!["home.dashboard"]
    );
}

#[test]
fn test_redirect_with_options() {
    assert_eq!(extract_redirects(r#"$state.go("edit", { id: 1 })"#), vec!["edit"]);
}

#[test]
fn test_redirect_backtick() {
    assert_eq!(
        extract_redirects("$state.go(`reports.view`)"),
        vec!["reports.view"]
    );
}

#[test]
fn test_redirect_bare_identifier() {
    assert_eq!(extract_redirects("$state.go(nextState)"), vec!["nextState"]);
}

#[test]
fn test_redirect_pattern_order() {
    let redirects = extract_redirects("$state.go(target); $state.go('home')");
    assert_eq!(redirects, vec!["home", "target"]);
}

#[test]
fn test_redirect_case_insensitive_call() {
    assert_eq!(extract_redirects("$STATE.GO('x')"), vec!["x"]);
}

#[test]
fn test_no_redirects() {
    assert!(extract_redirects("$location.path('/home')").is_empty());
}
