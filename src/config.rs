use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Default cap on a single uploaded file: 50 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub max_upload_bytes: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Minimal file upload and download service")]
pub struct Args {
    /// Host to bind to (overrides FILESYNC_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FILESYNC_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploads are stored (overrides FILESYNC_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Largest accepted upload in bytes (overrides FILESYNC_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<u64>,
}

impl AppConfig {
    /// Parse CLI args and the process environment into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::resolve(args, |key| env::var(key))
    }

    /// Merge CLI args over environment values over defaults.
    ///
    /// `lookup` reads an environment variable; it is a parameter so the
    /// merge can be exercised without touching the process environment.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup("FILESYNC_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var(&lookup, "FILESYNC_PORT", 3000u16)?;
        let env_storage = lookup("FILESYNC_STORAGE_DIR").unwrap_or_else(|_| "uploads".into());
        let env_max = parse_var(&lookup, "FILESYNC_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_args() {
        let cfg = AppConfig::resolve(Args::default(), lookup_in(&[])).unwrap();

        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.storage_dir, "uploads");
        assert_eq!(cfg.max_upload_bytes, 52_428_800);
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn env_overrides_defaults() {
        let vars = [
            ("FILESYNC_HOST", "127.0.0.1"),
            ("FILESYNC_PORT", "8080"),
            ("FILESYNC_STORAGE_DIR", "/srv/uploads"),
            ("FILESYNC_MAX_UPLOAD_BYTES", "1024"),
        ];
        let cfg = AppConfig::resolve(Args::default(), lookup_in(&vars)).unwrap();

        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.storage_dir, "/srv/uploads");
        assert_eq!(cfg.max_upload_bytes, 1024);
    }

    #[test]
    fn args_override_env() {
        let args = Args::try_parse_from([
            "filesync",
            "--port",
            "9000",
            "--storage-dir",
            "cli-dir",
            "--max-upload-bytes",
            "10",
        ])
        .unwrap();
        let vars = [("FILESYNC_PORT", "8080"), ("FILESYNC_STORAGE_DIR", "env-dir")];
        let cfg = AppConfig::resolve(args, lookup_in(&vars)).unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.storage_dir, "cli-dir");
        assert_eq!(cfg.max_upload_bytes, 10);
    }

    #[test]
    fn malformed_numeric_env_is_an_error() {
        let err = AppConfig::resolve(Args::default(), lookup_in(&[("FILESYNC_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("FILESYNC_PORT"));
    }
}
