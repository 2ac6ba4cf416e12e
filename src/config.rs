use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub instructor_rps: u32,
    pub public_rps: u32,
    pub default_session_minutes: i64,
    pub session_code_length: usize,
}

/// The marking endpoint rejects codes shorter than this, so issuing them
/// would make sessions unmarkable.
pub const MIN_SESSION_CODE_LENGTH: usize = 8;

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let session_code_length: usize = get_env_or_parse("SESSION_CODE_LENGTH", 24)?;
        if session_code_length < MIN_SESSION_CODE_LENGTH {
            return Err(Error::Config(format!(
                "SESSION_CODE_LENGTH must be at least {}",
                MIN_SESSION_CODE_LENGTH
            )));
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            instructor_rps: get_env_parse("INSTRUCTOR_RPS")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            default_session_minutes: get_env_or_parse("DEFAULT_SESSION_MINUTES", 10)?,
            session_code_length,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_or_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
