use crate::application::object_store::{DEFAULT_MAX_PAGES, DEFAULT_PER_PAGE};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub api_key: String,
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

/// Loads `config/kibana.{toml,yaml,json}` when present, overridden by
/// `KIBANA_HOST`, `KIBANA_API_KEY`, `KIBANA_SPACE`, `KIBANA_PER_PAGE` and
/// `KIBANA_MAX_PAGES`.
pub fn load_client_config() -> anyhow::Result<ClientConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/kibana").required(false))
        .add_source(config::Environment::with_prefix("KIBANA").try_parsing(true));

    client_config_from(builder)
}

pub fn client_config_from(builder: config::ConfigBuilder<config::builder::DefaultState>) -> anyhow::Result<ClientConfig> {
    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn test_defaults_applied() {
        let builder = config::Config::builder().add_source(File::from_str(
            "host = \"http://localhost:5601\"\napi_key = \"secret\"\n",
            FileFormat::Toml,
        ));
        let config = client_config_from(builder).unwrap();

        assert_eq!(config.host, "http://localhost:5601");
        assert_eq!(config.space, None);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.max_pages, 100);
    }

    #[test]
    fn test_overrides_win() {
        let builder = config::Config::builder()
            .add_source(File::from_str(
                "host = \"http://localhost:5601\"\napi_key = \"secret\"\nper_page = 20\n",
                FileFormat::Toml,
            ))
            .set_override("space", "ops")
            .unwrap()
            .set_override("per_page", 50)
            .unwrap();
        let config = client_config_from(builder).unwrap();

        assert_eq!(config.space.as_deref(), Some("ops"));
        assert_eq!(config.per_page, 50);
    }

    #[test]
    fn test_missing_credentials_fail() {
        let builder = config::Config::builder().add_source(File::from_str("host = \"x\"", FileFormat::Toml));
        assert!(client_config_from(builder).is_err());
    }
}
