use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// HS256 secret for identity tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Directory for uploaded avatars, served under /uploads.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_database_url() -> String {
    "notedrop.db".into()
}

fn default_jwt_secret() -> String {
    "notedrop-dev-secret".into()
}

fn default_uploads_dir() -> String {
    "uploads".into()
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Self>().unwrap();

        config
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| Config::from_env())
}

#[cfg(test)]
pub fn config_override<F>(override_config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| override_config(Config::from_env()))
}
