use std::io::Write;

use pretty_assertions::assert_eq;

use super::*;

const FULL: &str = r#"
prefer = ["anthropic", "openai"]
required_sources = ["bundled"]

[providers]
known = ["my-gateway"]

[filter.allow]
anthropic = "all"
openai = ["gpt-4o*", "o1", { regex = "^o[0-9]+-mini$" }]

[filter.deny]
openai = ["*-preview"]
"#;

fn patterns(set: &PatternSet) -> Vec<String> {
	match set {
		PatternSet::All => vec!["<all>".to_string()],
		PatternSet::List(list) => list.iter().map(ToString::to_string).collect(),
	}
}

#[test]
fn test_full_config_parses() {
	let config = CatalogConfig::from_toml_str(FULL).unwrap();
	assert_eq!(config.prefer, ["anthropic", "openai"]);
	assert_eq!(config.required_sources, ["bundled"]);
	assert_eq!(config.providers.known, ["my-gateway"]);

	let filter = config.filter_spec().unwrap();
	let AllowSpec::Providers(allow) = &filter.allow else {
		panic!("expected per-provider allow map");
	};
	assert_eq!(allow.keys().collect::<Vec<_>>(), ["anthropic", "openai"]);
	assert_eq!(patterns(&allow["anthropic"]), ["<all>"]);
	assert_eq!(patterns(&allow["openai"]), ["gpt-4o*", "o1", "/^o[0-9]+-mini$/"]);
	assert_eq!(patterns(&filter.deny["openai"]), ["*-preview"]);
	assert!(matches!(allow["openai"], PatternSet::List(ref list) if matches!(list[0], Pattern::Glob(_))));
}

/// An empty file admits everything with the built-in registry.
#[test]
fn test_empty_config_is_permissive() {
	let config = CatalogConfig::from_toml_str("").unwrap();
	let options = config.to_pipeline_options().unwrap();
	assert!(options.filter.allow.is_all());
	assert!(options.filter.deny.is_empty());
	assert!(options.prefer.is_empty());
	assert!(options.registry.contains("openai"));
}

/// The top-level `allow` shorthand applies only without `filter.allow`.
#[test]
fn test_top_level_allow_shorthand() {
	let config = CatalogConfig::from_toml_str("allow = \"all\"").unwrap();
	assert!(config.filter_spec().unwrap().allow.is_all());

	let both = CatalogConfig::from_toml_str(
		r#"
allow = "all"
[filter.allow]
openai = ["gpt-4"]
"#,
	)
	.unwrap();
	assert!(!both.filter_spec().unwrap().allow.is_all());
}

/// Only the literal `"all"` is accepted where a keyword is expected.
#[test]
fn test_all_keyword_is_strict() {
	let err = CatalogConfig::from_toml_str("[filter.allow]\nopenai = \"everything\"").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)));
	assert!(CatalogConfig::from_toml_str("[filter.allow]\nopenai = \"ALL\"").is_ok());
}

#[test]
fn test_unknown_keys_are_rejected() {
	let err = CatalogConfig::from_toml_str("prefered = [\"openai\"]").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_bad_regex_names_provider() {
	let config = CatalogConfig::from_toml_str("[filter.deny]\nopenai = [{ regex = \"gpt-(\" }]").unwrap();
	match config.filter_spec().unwrap_err() {
		ConfigError::Regex { provider, pattern, .. } => {
			assert_eq!(provider, "openai");
			assert_eq!(pattern, "gpt-(");
		}
		other => panic!("unexpected error: {other}"),
	}
}

/// Pipeline options carry the extended registry and required sources.
#[test]
fn test_pipeline_options_from_config() {
	let options = CatalogConfig::from_toml_str(FULL).unwrap().to_pipeline_options().unwrap();
	assert!(options.registry.contains("my-gateway"));
	assert!(options.registry.contains("anthropic"));
	assert_eq!(options.prefer, ["anthropic", "openai"]);
	assert_eq!(options.required_sources, ["bundled"]);
}

#[test]
fn test_load_from_file() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(FULL.as_bytes()).unwrap();
	let config = CatalogConfig::load(file.path()).unwrap();
	assert_eq!(config.prefer, ["anthropic", "openai"]);
}

#[test]
fn test_missing_file_reports_path() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("absent.toml");
	match CatalogConfig::load(&path).unwrap_err() {
		ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
		other => panic!("unexpected error: {other}"),
	}
}
