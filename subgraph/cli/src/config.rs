use {
    config::{Environment, File},
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
    subgraph_httpd::context::QueryLimits,
};

/// Prefix of environment variables overriding the config file, e.g.
/// `ROBOSHARE_HTTPD__PORT=9000`.
const ENV_PREFIX: &str = "ROBOSHARE";

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub schema: SchemaConfig,
    pub httpd: HttpdConfig,
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            schema: SchemaConfig::default(),
            httpd: HttpdConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

/// Where entity definitions and indexed data come from. Unset paths fall back
/// to the bundled Roboshare schema and demo fixture.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchemaConfig {
    pub sdl: Option<PathBuf>,
    pub fixture: Option<PathBuf>,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct HttpdConfig {
    pub ip: String,
    pub port: u16,
    pub cors_allowed_origin: Option<String>,
    pub limits: QueryLimits,
}

impl Default for HttpdConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 8000,
            cors_allowed_origin: None,
            limits: QueryLimits::default(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/graphql".to_string(),
        }
    }
}

/// Read the config file, if it exists, and apply environment overrides.
pub fn parse_config<P>(path: P) -> anyhow::Result<Config>
where
    P: AsRef<Path>,
{
    let env_override = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__");

    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()).required(false))
        .add_source(env_override)
        .build()?;

    Ok(config.try_deserialize()?)
}
