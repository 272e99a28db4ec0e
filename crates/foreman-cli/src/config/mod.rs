//! Connection settings resolution.
//!
//! Each setting comes from the explicit flag first, then the environment.
//! Host, user, and password have no fallback; TLS verification defaults to
//! off.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use foreman_client::ClientConfig;

pub const ENV_HOST: &str = "FOREMAN_HOST";
pub const ENV_USER: &str = "FOREMAN_USER";
pub const ENV_PASSWORD: &str = "FOREMAN_PASSWORD";
pub const ENV_VERIFY_TLS: &str = "FOREMAN_VERIFY_TLS";

/// Connection flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub verify_tls: bool,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub verify_tls: bool,
    pub timeout: Option<Duration>,
    pub base_url: Option<String>,
}

impl Settings {
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.host, &self.user, &self.password)
            .with_verify_tls(self.verify_tls);
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        Ok(config)
    }
}

/// Resolve settings against the process environment.
pub fn resolve_settings(args: &ConnectionArgs) -> Result<Settings> {
    resolve_settings_with(args, |key| std::env::var(key).ok())
}

/// Resolve settings against an arbitrary variable lookup.
pub fn resolve_settings_with<F>(args: &ConnectionArgs, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |explicit: &Option<String>, key: &str| {
        explicit
            .clone()
            .or_else(|| env(key))
            .filter(|v| !v.is_empty())
    };

    let host = pick(&args.host, ENV_HOST)
        .with_context(|| format!("no Foreman host given (use --host or {ENV_HOST})"))?;
    let user = pick(&args.user, ENV_USER)
        .with_context(|| format!("no user given (use --user or {ENV_USER})"))?;
    let password = pick(&args.password, ENV_PASSWORD)
        .with_context(|| format!("no password given (use --password or {ENV_PASSWORD})"))?;

    let verify_tls = if args.verify_tls {
        true
    } else {
        match env(ENV_VERIFY_TLS) {
            Some(v) => parse_bool(&v)
                .with_context(|| format!("{ENV_VERIFY_TLS} must be true or false, got '{v}'"))?,
            None => false,
        }
    };

    Ok(Settings {
        host,
        user,
        password,
        verify_tls,
        timeout: args.timeout_secs.map(Duration::from_secs),
        base_url: args.base_url.clone(),
    })
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_flags_win_over_environment() {
        let args = ConnectionArgs {
            host: Some("flag-host".into()),
            user: Some("flag-user".into()),
            password: Some("flag-pass".into()),
            ..Default::default()
        };
        let env = env_of(&[
            (ENV_HOST, "env-host"),
            (ENV_USER, "env-user"),
            (ENV_PASSWORD, "env-pass"),
        ]);
        let settings = resolve_settings_with(&args, env).unwrap();
        assert_eq!(settings.host, "flag-host");
        assert_eq!(settings.user, "flag-user");
        assert_eq!(settings.password, "flag-pass");
        assert!(!settings.verify_tls);
    }

    #[test]
    fn test_environment_fallback() {
        let env = env_of(&[
            (ENV_HOST, "foreman.example.com"),
            (ENV_USER, "admin"),
            (ENV_PASSWORD, "secret"),
            (ENV_VERIFY_TLS, "yes"),
        ]);
        let settings = resolve_settings_with(&ConnectionArgs::default(), env).unwrap();
        assert_eq!(settings.host, "foreman.example.com");
        assert!(settings.verify_tls);

        let config = settings.to_client_config().unwrap();
        assert_eq!(config.base_url(), "https://foreman.example.com/api/");
        assert!(config.verify_tls());
    }

    #[test]
    fn test_missing_host_is_an_error() {
        let env = env_of(&[(ENV_USER, "admin"), (ENV_PASSWORD, "secret")]);
        let err = resolve_settings_with(&ConnectionArgs::default(), env).unwrap_err();
        assert!(err.to_string().contains(ENV_HOST));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let env = env_of(&[(ENV_HOST, ""), (ENV_USER, "admin"), (ENV_PASSWORD, "secret")]);
        assert!(resolve_settings_with(&ConnectionArgs::default(), env).is_err());
    }

    #[test]
    fn test_bad_verify_tls_value() {
        let env = env_of(&[
            (ENV_HOST, "h"),
            (ENV_USER, "u"),
            (ENV_PASSWORD, "p"),
            (ENV_VERIFY_TLS, "maybe"),
        ]);
        assert!(resolve_settings_with(&ConnectionArgs::default(), env).is_err());
    }

    #[test]
    fn test_overrides_reach_client_config() {
        let args = ConnectionArgs {
            host: Some("h".into()),
            user: Some("u".into()),
            password: Some("p".into()),
            verify_tls: true,
            timeout_secs: Some(7),
            base_url: Some("http://localhost:3000/api".into()),
        };
        let config = resolve_settings_with(&args, |_| None)
            .unwrap()
            .to_client_config()
            .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(7));
        assert_eq!(config.base_url(), "http://localhost:3000/api/");
        assert!(config.verify_tls());
    }
}
