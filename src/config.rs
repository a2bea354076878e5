use std::path::PathBuf;

use serde::Deserialize;

use crate::middleware::auth::Credentials;

const DEFAULTS: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServeConfig {
    pub root: PathBuf,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub enabled: bool,
    pub realm: String,
    #[serde(default)]
    pub credentials: Option<String>,
}

// Never print the configured secret.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("realm", &self.realm)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// When the shortcut index is (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Built once at startup; a restart picks up changes to the tree.
    #[default]
    Startup,
    /// Rebuilt before every lookup, so additions and removals are visible immediately.
    #[value(name = "per_request")]
    PerRequest,
}

impl RefreshPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RefreshPolicy::Startup => "startup",
            RefreshPolicy::PerRequest => "per_request",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub refresh: RefreshPolicy,
    pub include_hidden: bool,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub serve: ServeConfig,
    pub auth: AuthConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
    pub security: Option<SecurityConfig>,
}

impl AppConfig {
    /// Credentials for the auth gate, or `None` in no-auth mode.
    ///
    /// Auth is mandatory unless explicitly disabled, so an enabled gate without a
    /// credential pair is a startup error.
    pub fn credentials(&self) -> anyhow::Result<Option<Credentials>> {
        if !self.auth.enabled {
            return Ok(None);
        }
        match self.auth.credentials.as_deref() {
            Some(raw) if !raw.is_empty() => Ok(Some(Credentials::parse(raw)?)),
            _ => Err(anyhow::anyhow!(
                "DROP_AUTH environment variable is not set.\n\
                 Please set a username and password to secure the server. Format: user:pass\n\n\
                 Example:\n  \
                 Linux/macOS:        export DROP_AUTH=\"admin:mypassword\"\n  \
                 Windows CMD:        set DROP_AUTH=admin:mypassword\n  \
                 Windows PowerShell: $env:DROP_AUTH=\"admin:mypassword\"\n\n\
                 If you want to run the server without authentication, use the --no-auth flag."
            )),
        }
    }
}

/// Values from the command line. They take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub refresh: Option<RefreshPolicy>,
}

pub fn load(overrides: &Overrides) -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: dropper.toml (in CWD)
        .add_source(::config::File::with_name("dropper").required(false));

    if let Ok(custom_path) = std::env::var("DROPPER_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    builder = builder.add_source(::config::Environment::with_prefix("DROPPER").separator("__"));

    // DROP_AUTH="user:pass" carries the credential pair
    builder = builder.set_override_option("auth.credentials", std::env::var("DROP_AUTH").ok())?;

    if let Some(root) = &overrides.root {
        builder = builder.set_override("serve.root", root.to_string_lossy().into_owned())?;
    }
    if let Some(host) = &overrides.host {
        builder = builder.set_override("server.host", host.clone())?;
    }
    if let Some(port) = overrides.port {
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if overrides.no_auth {
        builder = builder.set_override("auth.enabled", false)?;
    }
    if let Some(refresh) = overrides.refresh {
        builder = builder.set_override("index.refresh", refresh.as_str())?;
    }

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

/// Layers `toml` over the embedded defaults without touching files or the environment.
pub fn from_toml_str(toml: &str) -> anyhow::Result<AppConfig> {
    let cfg = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
        .build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    if cfg.server.host.trim().is_empty() {
        return Err(anyhow::anyhow!("server.host must not be empty"));
    }
    if cfg.auth.realm.contains('"') {
        return Err(anyhow::anyhow!("auth.realm must not contain double quotes"));
    }
    if cfg.search.max_results == 0 {
        return Err(anyhow::anyhow!("search.max_results must be > 0"));
    }
    for pattern in &cfg.index.excludes {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid index.excludes pattern {:?}: {}", pattern, e))?;
    }
    if cfg.logging.file_name.trim().is_empty() {
        return Err(anyhow::anyhow!("logging.file_name must not be empty"));
    }
    // Surface malformed credentials at startup rather than on the first request
    cfg.credentials()?;
    Ok(())
}
