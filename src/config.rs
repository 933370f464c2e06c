//! Application configuration, extracted from the environment.

use serde::Deserialize;

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_sis_login_url() -> String {
    "https://cas-auth-ent.rpi.edu/cas/login?service=https://bannerapp04-bnrprd.server.rpi.edu:443/ssomanager/c/SSB".to_owned()
}

fn default_sis_base_url() -> String {
    "https://sis.rpi.edu/rss".to_owned()
}

fn default_schedule_base_url() -> String {
    "https://sis.rpi.edu/reg/zs".to_owned()
}

/// Runtime configuration. Every field maps to an environment variable of the
/// same (uppercased) name; URL fields default to the production endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// SIS login id (an RIN) for the scrape session.
    pub sis_rin: String,
    /// SIS login PIN paired with `sis_rin`.
    pub sis_pin: String,
    #[serde(default = "default_sis_login_url")]
    pub sis_login_url: String,
    #[serde(default = "default_sis_base_url")]
    pub sis_base_url: String,
    #[serde(default = "default_schedule_base_url")]
    pub schedule_base_url: String,
    /// Shared secret for the admin import endpoint.
    pub api_key: String,
}
