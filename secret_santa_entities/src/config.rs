use tracing_subscriber::{prelude::*, EnvFilter};
use url::Url;

use crate::validation::{DnsMailDomainResolver, EntryValidator, MailDomainResolver, SkipMailDomainCheck};

#[derive(Debug, serde::Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub db_url: String,
    pub logging_config: String,
    /// Prefix of the links sent to participants. Should end with a slash.
    pub base_url: String,
    pub check_mail_domains: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_url: "sqlite://./secret_santa.sqlite3?mode=rwc".into(),
            logging_config: "info,sqlx::query=error".into(),
            base_url: "http://localhost:8000/".into(),
            check_mail_domains: true,
        }
    }
}

impl Config {
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    pub fn make_validator(&self) -> Result<EntryValidator<Box<dyn MailDomainResolver>>, anyhow::Error> {
        let resolver : Box<dyn MailDomainResolver> = if self.check_mail_domains {
            Box::new(DnsMailDomainResolver::from_system_conf()?)
        }
        else {
            Box::new(SkipMailDomainCheck)
        };
        Ok(EntryValidator::new(resolver))
    }
}

pub fn parse_config(config: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str::<Config>(config)
}

pub(crate) fn read_config_inner() -> Result<Config, anyhow::Error> {
    let config_path = std::env::var("SECRET_SANTA_CONFIG")?;
    let config = std::fs::read_to_string(config_path)?;
    Ok(parse_config(&config)?)
}

pub fn read_config() -> Config {
    match read_config_inner() {
        Ok(config) => config,
        Err(e) => {
            //Print to stderr, since logging is set up in the config
            eprintln!("Warning: Failed to read config: {}", e);
            Config::default()
        }
    }
}

pub fn init_logging(config: &Config) -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.logging_config)?)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}
