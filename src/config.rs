// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::api::{BASE_URL_VAR, DEFAULT_BASE_URL};
use kdl::{KdlDocument, KdlNode, KdlValue};
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::time::Duration;
use tokio::fs::read_to_string;

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum ConfigError {
	#[error("couldn't read config file {path}")]
	#[diagnostic(code(moroccoin::config::read))]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	#[diagnostic(transparent)]
	Syntax(#[from] kdl::KdlError),
	#[error("invalid value for `{setting}`")]
	#[diagnostic(code(moroccoin::config::invalid_value), help("expected {expected}"))]
	InvalidValue {
		setting: String,
		expected: &'static str,
		#[source_code]
		source_code: NamedSource<String>,
		#[label("this value")]
		span: SourceSpan,
	},
}

/// Where the dashboard gets its records
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DataSourceKind {
	/// The bundled sample records
	#[default]
	Fixtures,
	/// The platform API
	Api,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WebConfig {
	pub bind_addr: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
	pub base_url: String,
	pub timeout: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListConfig {
	pub search_debounce: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MutationConfig {
	/// How long a change takes to land
	pub latency: Duration,
	/// Recorded as the processor of refunds decided from the dashboard
	pub admin_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigData {
	pub web: WebConfig,
	pub api: ApiConfig,
	pub data_source: DataSourceKind,
	pub list: ListConfig,
	pub mutation: MutationConfig,
}

impl Default for ConfigData {
	fn default() -> Self {
		Self {
			web: WebConfig {
				bind_addr: String::from("127.0.0.1:3000"),
			},
			api: ApiConfig {
				base_url: String::from(DEFAULT_BASE_URL),
				timeout: Duration::from_secs(30),
			},
			data_source: DataSourceKind::Fixtures,
			list: ListConfig {
				search_debounce: Duration::from_millis(500),
			},
			mutation: MutationConfig {
				latency: Duration::from_millis(1000),
				admin_name: String::from("Current Admin"),
			},
		}
	}
}

pub async fn parse_config(config_path: &str) -> Result<ConfigData, ConfigError> {
	let config_file_contents = read_to_string(config_path).await.map_err(|source| ConfigError::Read {
		path: config_path.to_string(),
		source,
	})?;
	let mut config = ConfigData::parse(config_path, &config_file_contents)?;
	config.override_base_url(std::env::var(BASE_URL_VAR).ok());
	Ok(config)
}

/// Reads the settings in a KDL document, keeping track of the source for error reporting
struct SettingsReader<'a> {
	file_name: &'a str,
	contents: &'a str,
}

impl SettingsReader<'_> {
	fn invalid(&self, setting: &str, expected: &'static str, node: &KdlNode) -> ConfigError {
		ConfigError::InvalidValue {
			setting: setting.to_string(),
			expected,
			source_code: NamedSource::new(self.file_name, self.contents.to_string()),
			span: node.span(),
		}
	}

	fn argument<'n>(node: &'n KdlNode) -> Option<&'n KdlValue> {
		node.entries()
			.iter()
			.find(|entry| entry.name().is_none())
			.map(|entry| entry.value())
	}

	fn string(&self, document: &KdlDocument, setting: &str) -> Result<Option<String>, ConfigError> {
		let Some(node) = document.get(setting) else {
			return Ok(None);
		};
		match Self::argument(node).and_then(KdlValue::as_string) {
			Some(value) => Ok(Some(value.to_string())),
			None => Err(self.invalid(setting, "a string", node)),
		}
	}

	fn whole_number(&self, document: &KdlDocument, setting: &str) -> Result<Option<u64>, ConfigError> {
		let Some(node) = document.get(setting) else {
			return Ok(None);
		};
		match Self::argument(node)
			.and_then(KdlValue::as_integer)
			.and_then(|value| u64::try_from(value).ok())
		{
			Some(value) => Ok(Some(value)),
			None => Err(self.invalid(setting, "a whole number", node)),
		}
	}

	fn millis(&self, document: &KdlDocument, setting: &str) -> Result<Option<Duration>, ConfigError> {
		Ok(self.whole_number(document, setting)?.map(Duration::from_millis))
	}

	fn seconds(&self, document: &KdlDocument, setting: &str) -> Result<Option<Duration>, ConfigError> {
		Ok(self.whole_number(document, setting)?.map(Duration::from_secs))
	}
}

/// The child block of a section node, such as the `{ ... }` of `web { ... }`
fn section<'d>(document: &'d KdlDocument, name: &str) -> Option<&'d KdlDocument> {
	document.get(name).and_then(KdlNode::children)
}

impl ConfigData {
	/// Reads a config document. Settings that are left out keep their defaults.
	pub fn parse(file_name: &str, contents: &str) -> Result<Self, ConfigError> {
		let document: KdlDocument = contents.parse()?;
		let reader = SettingsReader { file_name, contents };
		let mut config = Self::default();

		if let Some(web) = section(&document, "web") {
			if let Some(bind_addr) = reader.string(web, "bind_addr")? {
				config.web.bind_addr = bind_addr;
			}
		}

		if let Some(api) = section(&document, "api") {
			if let Some(base_url) = reader.string(api, "base_url")? {
				config.api.base_url = base_url;
			}
			if let Some(timeout) = reader.seconds(api, "timeout_seconds")? {
				config.api.timeout = timeout;
			}
		}

		if let Some(node) = document.get("data_source") {
			config.data_source = match SettingsReader::argument(node).and_then(KdlValue::as_string) {
				Some("fixtures") => DataSourceKind::Fixtures,
				Some("api") => DataSourceKind::Api,
				_ => return Err(reader.invalid("data_source", "\"fixtures\" or \"api\"", node)),
			};
		}

		if let Some(list) = section(&document, "list") {
			if let Some(search_debounce) = reader.millis(list, "search_debounce_ms")? {
				config.list.search_debounce = search_debounce;
			}
		}

		if let Some(mutation) = section(&document, "mutation") {
			if let Some(latency) = reader.millis(mutation, "latency_ms")? {
				config.mutation.latency = latency;
			}
			if let Some(admin_name) = reader.string(mutation, "admin_name")? {
				config.mutation.admin_name = admin_name;
			}
		}

		Ok(config)
	}

	/// Applies the base URL set in the environment, if any
	pub fn override_base_url(&mut self, base_url: Option<String>) {
		if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
			self.api.base_url = base_url;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_document() {
		let config = ConfigData::parse(
			"config.kdl",
			r#"
			web {
				bind_addr "0.0.0.0:8080"
			}
			api {
				base_url "https://api.moroccoin.example/api"
				timeout_seconds 10
			}
			data_source "api"
			list {
				search_debounce_ms 300
			}
			mutation {
				latency_ms 250
				admin_name "Nadia"
			}
			"#,
		)
		.unwrap();

		assert_eq!(config.web.bind_addr, "0.0.0.0:8080");
		assert_eq!(config.api.timeout, Duration::from_secs(10));
		assert_eq!(config.api.base_url, "https://api.moroccoin.example/api");
		assert_eq!(config.data_source, DataSourceKind::Api);
		assert_eq!(config.list.search_debounce, Duration::from_millis(300));
		assert_eq!(config.mutation.latency, Duration::from_millis(250));
		assert_eq!(config.mutation.admin_name, "Nadia");
	}

	#[test]
	fn missing_settings_keep_defaults() {
		let config = ConfigData::parse("config.kdl", "web { bind_addr \"127.0.0.1:4000\" }").unwrap();
		assert_eq!(config.web.bind_addr, "127.0.0.1:4000");
		assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.data_source, DataSourceKind::Fixtures);
		assert_eq!(config.list.search_debounce, Duration::from_millis(500));
	}

	#[test]
	fn wrong_value_type_is_reported() {
		let result = ConfigData::parse("config.kdl", "mutation { latency_ms \"slow\" }");
		assert!(matches!(result, Err(ConfigError::InvalidValue { setting, .. }) if setting == "latency_ms"));
		let result = ConfigData::parse("config.kdl", "data_source \"database\"");
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
	}

	#[test]
	fn syntax_errors_are_reported() {
		assert!(matches!(
			ConfigData::parse("config.kdl", "web { bind_addr"),
			Err(ConfigError::Syntax(_))
		));
	}

	#[test]
	fn environment_overrides_base_url() {
		let mut config = ConfigData::default();
		config.override_base_url(Some(String::from("http://staging:8000/api")));
		assert_eq!(config.api.base_url, "http://staging:8000/api");
		config.override_base_url(Some(String::new()));
		assert_eq!(config.api.base_url, "http://staging:8000/api");
	}
}
