use contracts::shared::lang::Lang;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Backend port on the page's host
    pub port: u16,
    /// Path prefix of every endpoint, e.g. "/api"
    pub prefix: String,
    /// Hard per-request timeout
    pub request_timeout_ms: u32,
    /// Where a 401 sends the browser
    pub login_path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct UiConfig {
    pub log_level: String,
    pub default_lang: Lang,
}

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
[api]
port = 3000
prefix = "/api"
request_timeout_ms = 10000
login_path = "/login"

[ui]
log_level = "debug"
default_lang = "en"
"#;

/// Name of the `<meta>` tag whose `content` may override the defaults
pub const CONFIG_META_NAME: &str = "qa-config";

impl ClientConfig {
    pub fn log_level(&self) -> log::Level {
        match self.ui.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "info" => log::Level::Info,
            "trace" => log::Level::Trace,
            _ => log::Level::Debug,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        // The embedded default is covered by tests
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config is valid")
    }
}

/// Parses the defaults with an optional TOML override merged on top.
/// Keys missing from the override keep their default values.
pub fn parse_config(override_toml: Option<&str>) -> anyhow::Result<ClientConfig> {
    let mut base: toml::Value = toml::from_str(DEFAULT_CONFIG)?;
    if let Some(text) = override_toml.filter(|t| !t.trim().is_empty()) {
        let patch: toml::Value = toml::from_str(text)?;
        merge(&mut base, patch);
    }
    let config: ClientConfig = base.try_into()?;
    if config.api.request_timeout_ms == 0 {
        anyhow::bail!("api.request_timeout_ms must be greater than zero");
    }
    Ok(config)
}

fn merge(base: &mut toml::Value, patch: toml::Value) {
    match (base, patch) {
        (toml::Value::Table(base), toml::Value::Table(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Load configuration for the running page
///
/// Search order:
/// 1. `<meta name="qa-config" content="...">` in the host page
/// 2. Falls back to the embedded default config
pub fn load_config() -> anyhow::Result<ClientConfig> {
    let override_toml = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| {
            d.query_selector(&format!("meta[name=\"{}\"]", CONFIG_META_NAME))
                .ok()
                .flatten()
        })
        .and_then(|meta| meta.get_attribute("content"));
    parse_config(override_toml.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(None).unwrap();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.request_timeout_ms, 10_000);
        assert_eq!(config.api.login_path, "/login");
        assert_eq!(config.ui.default_lang, Lang::En);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_override_merges_over_defaults() {
        let config = parse_config(Some("[api]\nport = 8080\n[ui]\ndefault_lang = \"ar\"\n")).unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.prefix, "/api");
        assert_eq!(config.ui.default_lang, Lang::Ar);
        assert_eq!(config.ui.log_level, "debug");
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        assert!(parse_config(Some("[api]\nport = \"not a number\"\n")).is_err());
        assert!(parse_config(Some("[api]\nrequest_timeout_ms = 0\n")).is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        let mut config = ClientConfig::default();
        config.ui.log_level = "WARN".to_string();
        assert_eq!(config.log_level(), log::Level::Warn);
    }
}
