use anyhow::{bail, Context, Result};
use devportal_auth::{
    config::{MAX_PROVIDER_TOKEN_TTL, MAX_SESSION_TTL},
    AuthConfig, ProviderSettings,
};
use devportal_cache::{CacheConfig, MAX_ENTRY_TTL};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt, fs,
    net::SocketAddr,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use zeroize::Zeroizing;

/// Providers whose credentials may be supplied through the environment alone
const ENV_PROVIDERS: &[&str] = &["github", "atlassian"];

const SECONDS_PER_DAY: u64 = 86_400;

/// Upper bound for timeouts and maintenance intervals
const MAX_INTERVAL_SECONDS: u64 = 7 * SECONDS_PER_DAY;

/// Server configuration
///
/// Resolved from built-in defaults, then the YAML file named by
/// `DEVPORTAL_CONFIG`, then environment variables. Secrets have no defaults.
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// Path to RocksDB database
    pub database_path: PathBuf,

    /// Origin of the portal frontend, used for CORS and `postMessage`
    pub frontend_origin: String,

    /// Auth service settings
    pub auth: AuthConfig,

    /// Base64 of the 32-byte provider token encryption key
    pub token_encryption_key: Zeroizing<String>,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Cadence of the expired provider token cleanup
    pub token_cleanup_interval: Duration,

    /// Users registered in the directory at startup
    pub users: Vec<SeedUser>,
}

/// Directory entry seeded from the config file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind_address: Option<String>,
    database_path: Option<PathBuf>,
    frontend_origin: Option<String>,
    jwt_secret: Option<String>,
    jwt_ttl_seconds: Option<u64>,
    jwt_issuer: Option<String>,
    redirect_url: Option<String>,
    access_token_ttl_days: Option<u64>,
    token_encryption_key: Option<String>,
    callback_timeout_seconds: Option<u64>,
    http_timeout_seconds: Option<u64>,
    token_cleanup_interval_seconds: Option<u64>,
    #[serde(default)]
    providers: BTreeMap<String, FileProvider>,
    #[serde(default)]
    cache: FileCache,
    #[serde(default)]
    users: Vec<SeedUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileProvider {
    client_id: Option<String>,
    client_secret: Option<String>,
    base_url: Option<String>,
    scopes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileCache {
    enabled: Option<bool>,
    default_ttl_seconds: Option<u64>,
    sweep_interval_seconds: Option<u64>,
}

impl Config {
    /// Load configuration from `DEVPORTAL_CONFIG` and the process environment
    pub fn from_env() -> Result<Self> {
        let contents = match std::env::var("DEVPORTAL_CONFIG") {
            Ok(path) => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("read DEVPORTAL_CONFIG: {path}"))?,
            ),
            Err(_) => None,
        };

        Self::from_sources(contents.as_deref(), |name| std::env::var(name).ok())
    }

    /// Resolve configuration from optional YAML text and an environment lookup
    pub fn from_sources<E>(yaml: Option<&str>, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match yaml {
            Some(contents) => {
                serde_yaml::from_str(contents).with_context(|| "parse devportal config yaml")?
            }
            None => FileConfig::default(),
        };

        let bind_address = env("BIND_ADDRESS")
            .or(file.bind_address)
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .with_context(|| "parse BIND_ADDRESS")?;

        let database_path = env("DATABASE_PATH")
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from("./data/devportal.db"));

        let frontend_origin = env("FRONTEND_ORIGIN")
            .or(file.frontend_origin)
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let Some(jwt_secret) = env("JWT_SECRET").or(file.jwt_secret) else {
            bail!("JWT_SECRET is required");
        };
        let Some(token_encryption_key) = env("TOKEN_ENCRYPTION_KEY").or(file.token_encryption_key)
        else {
            bail!("TOKEN_ENCRYPTION_KEY is required");
        };

        let jwt_ttl = number(&env, "JWT_TTL_SECONDS", file.jwt_ttl_seconds)?.unwrap_or(3600);
        let access_token_ttl_days =
            number(&env, "ACCESS_TOKEN_TTL_DAYS", file.access_token_ttl_days)?.unwrap_or(30);
        let callback_timeout =
            number(&env, "CALLBACK_TIMEOUT_SECONDS", file.callback_timeout_seconds)?.unwrap_or(30);
        let http_timeout =
            number(&env, "HTTP_TIMEOUT_SECONDS", file.http_timeout_seconds)?.unwrap_or(15);
        let token_cleanup_interval = number(
            &env,
            "TOKEN_CLEANUP_INTERVAL_SECONDS",
            file.token_cleanup_interval_seconds,
        )?
        .unwrap_or(3600);

        let access_token_ttl = access_token_ttl_days
            .checked_mul(SECONDS_PER_DAY)
            .filter(|secs| (1..=MAX_PROVIDER_TOKEN_TTL.as_secs()).contains(secs))
            .with_context(|| {
                format!(
                    "ACCESS_TOKEN_TTL_DAYS must be between 1 and {}, got {access_token_ttl_days}",
                    MAX_PROVIDER_TOKEN_TTL.as_secs() / SECONDS_PER_DAY
                )
            })?;
        ensure_range("JWT_TTL_SECONDS", jwt_ttl, 1, MAX_SESSION_TTL.as_secs())?;
        ensure_range(
            "CALLBACK_TIMEOUT_SECONDS",
            callback_timeout,
            1,
            MAX_INTERVAL_SECONDS,
        )?;
        ensure_range("HTTP_TIMEOUT_SECONDS", http_timeout, 1, MAX_INTERVAL_SECONDS)?;
        ensure_range(
            "TOKEN_CLEANUP_INTERVAL_SECONDS",
            token_cleanup_interval,
            1,
            MAX_INTERVAL_SECONDS,
        )?;

        let auth = AuthConfig {
            jwt_secret: Zeroizing::new(jwt_secret),
            jwt_ttl: Duration::from_secs(jwt_ttl),
            jwt_issuer: env("JWT_ISSUER")
                .or(file.jwt_issuer)
                .unwrap_or_else(|| "devportal".to_string()),
            redirect_url: env("OAUTH_REDIRECT_URL")
                .or(file.redirect_url)
                .unwrap_or_else(|| "http://localhost:8080/v1/auth".to_string()),
            access_token_ttl: Duration::from_secs(access_token_ttl),
            callback_timeout: Duration::from_secs(callback_timeout),
            http_timeout: Duration::from_secs(http_timeout),
            providers: resolve_providers(file.providers, &env)?,
        };

        let defaults = CacheConfig::default();
        let cache = CacheConfig {
            enabled: flag(&env, "CACHE_ENABLED")?
                .or(file.cache.enabled)
                .unwrap_or(defaults.enabled),
            default_ttl: number(
                &env,
                "CACHE_DEFAULT_TTL_SECONDS",
                file.cache.default_ttl_seconds,
            )?
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_ttl),
            sweep_interval: number(
                &env,
                "CACHE_SWEEP_INTERVAL_SECONDS",
                file.cache.sweep_interval_seconds,
            )?
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval),
        };
        ensure_range(
            "CACHE_DEFAULT_TTL_SECONDS",
            cache.default_ttl.as_secs(),
            1,
            MAX_ENTRY_TTL.as_secs(),
        )?;
        ensure_range(
            "CACHE_SWEEP_INTERVAL_SECONDS",
            cache.sweep_interval.as_secs(),
            1,
            MAX_INTERVAL_SECONDS,
        )?;

        Ok(Config {
            bind_address,
            database_path,
            frontend_origin,
            auth,
            token_encryption_key: Zeroizing::new(token_encryption_key),
            cache,
            token_cleanup_interval: Duration::from_secs(token_cleanup_interval),
            users: file.users,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_path", &self.database_path)
            .field("frontend_origin", &self.frontend_origin)
            .field("auth", &self.auth)
            .field("token_encryption_key", &"<redacted>")
            .field("cache", &self.cache)
            .field("token_cleanup_interval", &self.token_cleanup_interval)
            .field("users", &self.users.len())
            .finish()
    }
}

/// Environment value parsed as `T`, falling back to the file value
fn number<E, T>(env: &E, name: &str, file_value: Option<T>) -> Result<Option<T>>
where
    E: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env(name) {
        Some(raw) => Ok(Some(
            raw.trim()
                .parse()
                .with_context(|| format!("parse {name}"))?,
        )),
        None => Ok(file_value),
    }
}

fn ensure_range(name: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        bail!("{name} must be between {min} and {max}, got {value}");
    }
    Ok(())
}

fn flag<E>(env: &E, name: &str) -> Result<Option<bool>>
where
    E: Fn(&str) -> Option<String>,
{
    match env(name).as_deref().map(str::trim) {
        None => Ok(None),
        Some("1") | Some("true") | Some("yes") => Ok(Some(true)),
        Some("0") | Some("false") | Some("no") => Ok(Some(false)),
        Some(other) => bail!("parse {name}: unexpected value {other:?}"),
    }
}

/// Merge file providers with `<PROVIDER>_CLIENT_ID`, `_CLIENT_SECRET` and
/// `_BASE_URL` overrides
fn resolve_providers<E>(
    mut file: BTreeMap<String, FileProvider>,
    env: &E,
) -> Result<BTreeMap<String, ProviderSettings>>
where
    E: Fn(&str) -> Option<String>,
{
    let names: BTreeSet<String> = file
        .keys()
        .cloned()
        .chain(ENV_PROVIDERS.iter().map(|name| name.to_string()))
        .collect();

    let mut providers = BTreeMap::new();
    for name in names {
        let declared = file.remove(&name);
        let from_file = declared.is_some();
        let entry = declared.unwrap_or_default();
        let prefix = name.to_uppercase().replace('-', "_");

        let Some(client_id) = env(&format!("{prefix}_CLIENT_ID")).or(entry.client_id) else {
            if from_file {
                bail!("provider {name} has no client_id");
            }
            continue;
        };
        let Some(client_secret) = env(&format!("{prefix}_CLIENT_SECRET")).or(entry.client_secret)
        else {
            bail!("provider {name} has no client_secret ({prefix}_CLIENT_SECRET)");
        };

        providers.insert(
            name,
            ProviderSettings {
                client_id,
                client_secret: Zeroizing::new(client_secret),
                enterprise_base_url: env(&format!("{prefix}_BASE_URL")).or(entry.base_url),
                scopes: entry.scopes,
            },
        );
    }

    Ok(providers)
}
