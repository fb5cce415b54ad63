use ast_metrics::{AnalysisReport, AnalyzerConfig, Error, analyze_str};

const ANALYSIS_FIXTURES: &str = include_str!("../fixtures/analysis.json");
const ERROR_FIXTURES: &str = include_str!("../fixtures/errors.json");

fn fixture_config(fixture: &serde_json::Value) -> AnalyzerConfig {
    match fixture.get("config") {
        Some(config) => AnalyzerConfig::from_json_str(&config.to_string()).unwrap(),
        None => AnalyzerConfig::default(),
    }
}

#[test]
fn test_fixture_analysis() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(ANALYSIS_FIXTURES).unwrap();
    assert!(!fixtures.is_empty());
    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let config = fixture_config(fixture);
        // round-trip through text so the crate's own parser is exercised
        let source = serde_json::to_string_pretty(&fixture["document"]).unwrap();
        let report = analyze_str(&source, &config).unwrap_or_else(|err| panic!("{name}: {err}"));
        let expected: AnalysisReport = serde_json::from_value(fixture["expected"].clone()).unwrap();
        assert_eq!(report, expected, "fixture: {name}");

        let inside: usize = report.functions.iter().map(|f| f.conditional_count).sum();
        assert!(inside <= report.total_conditionals, "fixture: {name}");
    }
}

#[test]
fn test_fixture_errors() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(ERROR_FIXTURES).unwrap();
    assert!(!fixtures.is_empty());
    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let source = fixture["source"].as_str().unwrap();
        let err = match analyze_str(source, &fixture_config(fixture)) {
            Ok(report) => panic!("{name}: expected an error, got {report:?}"),
            Err(err) => err,
        };
        match (fixture["error"].as_str().unwrap(), &err) {
            ("parse", Error::Parse(_)) | ("projection", Error::Projection(_)) => {}
            (expected, err) => panic!("{name}: expected a {expected} error, got {err}"),
        }
    }
}

#[test]
fn test_pretty_and_compact_sources_agree() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(ANALYSIS_FIXTURES).unwrap();
    for fixture in &fixtures {
        let config = fixture_config(fixture);
        let compact = serde_json::to_string(&fixture["document"]).unwrap();
        let pretty = serde_json::to_string_pretty(&fixture["document"]).unwrap();
        assert_eq!(
            analyze_str(&compact, &config).unwrap(),
            analyze_str(&pretty, &config).unwrap(),
            "fixture: {}",
            fixture["name"]
        );
    }
}
