use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use campus_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn render(value: &Value) -> String {
	toml::to_string(value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("campus_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_from(value: &Value) -> campus_config::Result<Config> {
	let path = write_temp_config(render(value));
	let result = campus_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

fn table_mut<'a>(value: &'a mut Value, path: &[&str]) -> &'a mut toml::Table {
	let mut current = value.as_table_mut().expect("Template config must be a table.");

	for key in path {
		current = current
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	current
}

#[test]
fn sample_config_loads_with_spec_defaults() {
	let cfg = load_from(&sample_value()).expect("Failed to load sample config.");

	assert_eq!(cfg.providers.embedding.dimensions, 1_536);
	assert_eq!(cfg.providers.embedding.api_key.as_deref(), Some("sk-test"));
	assert_eq!(cfg.search.max_results, 20);
	assert!((cfg.search.semantic_weight - 0.6).abs() < f32::EPSILON);
	assert!((cfg.search.keyword_weight - 0.4).abs() < f32::EPSILON);
}

#[test]
fn omitted_search_section_falls_back_to_defaults() {
	let mut value = sample_value();

	value.as_table_mut().expect("Template config must be a table.").remove("search");

	let embedding = table_mut(&mut value, &["providers", "embedding"]);

	for key in ["max_attempts", "retry_base_delay_ms", "batch_size", "batch_delay_ms"] {
		embedding.remove(key);
	}

	let cfg = load_from(&value).expect("Failed to load config without [search].");

	assert_eq!(cfg.search.semantic_candidate_cap, 100);
	assert_eq!(cfg.search.keyword_candidate_cap, 50);
	assert!((cfg.search.relevance_floor - 0.1).abs() < f32::EPSILON);
	assert_eq!(cfg.providers.embedding.max_attempts, 3);
	assert_eq!(cfg.providers.embedding.retry_base_delay_ms, 1_000);
	assert_eq!(cfg.providers.embedding.batch_size, 100);
	assert_eq!(cfg.providers.embedding.batch_delay_ms, 500);
}

#[test]
fn blank_api_key_normalizes_to_none() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "embedding"])
		.insert("api_key".to_string(), Value::String("   ".to_string()));

	let cfg = load_from(&value).expect("Failed to load config with blank api_key.");

	assert!(cfg.providers.embedding.api_key.is_none());
}

#[test]
fn weights_must_not_exceed_one_combined() {
	let mut value = sample_value();

	table_mut(&mut value, &["search"]).insert("semantic_weight".to_string(), Value::Float(0.9));

	let err = load_from(&value).expect_err("Expected weight sum validation error.");

	assert!(
		err.to_string().contains("search.semantic_weight plus search.keyword_weight"),
		"Unexpected error: {err}"
	);
}

#[test]
fn relevance_floor_must_be_below_one() {
	let mut cfg = base_config();

	cfg.search.relevance_floor = 1.0;

	let err = campus_config::validate(&cfg).expect_err("Expected relevance floor error.");

	assert!(err.to_string().contains("search.relevance_floor"), "Unexpected error: {err}");
}

#[test]
fn non_finite_weight_is_rejected() {
	let mut cfg = base_config();

	cfg.search.keyword_weight = f32::NAN;

	let err = campus_config::validate(&cfg).expect_err("Expected finite weight error.");

	assert!(
		err.to_string().contains("search.keyword_weight must be a finite number."),
		"Unexpected error: {err}"
	);
}

#[test]
fn zero_caps_are_rejected() {
	let mut cfg = base_config();

	cfg.search.keyword_candidate_cap = 0;

	let err = campus_config::validate(&cfg).expect_err("Expected candidate cap error.");

	assert!(
		err.to_string().contains("search.keyword_candidate_cap must be greater than zero."),
		"Unexpected error: {err}"
	);

	let mut cfg = base_config();

	cfg.providers.embedding.batch_size = 0;

	let err = campus_config::validate(&cfg).expect_err("Expected batch size error.");

	assert!(
		err.to_string().contains("providers.embedding.batch_size must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_headers_must_be_strings() {
	let mut value = sample_value();
	let mut headers = toml::Table::new();

	headers.insert("x-trace".to_string(), Value::Integer(1));
	table_mut(&mut value, &["providers", "embedding"])
		.insert("default_headers".to_string(), Value::Table(headers));

	let err = load_from(&value).expect_err("Expected header validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error: {err}");
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("campus_config_missing_file.toml");
	let err = campus_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}
