use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;
pub mod models;
pub use models::*;


/// Marker value replaced by an environment variable at load time.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the configuration from `CONFIG_DIR` (default `./config`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    load_config_from(&config_dir)
}

/// Layers `default`, `{RUN_ENV}` and `GACTIVITY__*` environment variables.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "GACTIVITY".to_string());
    load_config_with_prefix(config_dir, &prefix)
}

/// Same as [`load_config_from`] with an explicit environment prefix.
///
/// Values stay in `config`'s own representation until the final typed
/// deserialization, so `GACTIVITY__SERVER__PORT=9000` still reaches a `u16`.
pub fn load_config_with_prefix(config_dir: &Path, prefix: &str) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());

    let layered = Config::builder()
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix(prefix).separator("__"))
        .build()?;

    let raw: Value = layered.clone().try_deserialize()?;
    let mut builder = Config::builder().add_source(layered);
    for (key, secret) in env_secret_overrides(&raw) {
        builder = builder.set_override(key, secret)?;
    }

    builder.build()?.try_deserialize()
}

/// Every `"secret_from_env"` value as a `(config key, env value)` override.
///
/// The env var is the upper-cased key path joined by `_`, e.g.
/// `google_oauth.client_secret` reads `GOOGLE_OAUTH_CLIENT_SECRET`. Unset
/// variables yield an empty string.
fn env_secret_overrides(value: &Value) -> Vec<(String, String)> {
    fn walk(path: &mut Vec<String>, obj: &Value, out: &mut Vec<(String, String)>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map {
                    path.push(k.to_string());
                    walk(path, v, out);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                let secret = env::var(&env_key).unwrap_or_else(|_| {
                    warn!("env var {} not found for {}", env_key, SECRET_FROM_ENV);
                    String::new()
                });
                out.push((path.join("."), secret));
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(&mut Vec::new(), value, &mut out);
    out
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns the path that was tried.
///
/// `DOTENV_OVERRIDE` wins over a first CLI argument starting with `.env`,
/// which wins over the plain `.env` file.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
