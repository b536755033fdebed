use serde::{Deserialize, Serialize};

/// Environment-derived settings. Loaded once at startup; the reload
/// interval and file paths are fixed for the process lifetime — only the
/// *contents* of the four config files are hot-reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSettings {
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    #[serde(default = "default_tokens_file")]
    pub tokens_file: String,

    #[serde(default = "default_users_file")]
    pub users_file: String,

    #[serde(default = "default_routes_file")]
    pub routes_file: String,

    #[serde(default = "default_roles_file")]
    pub roles_file: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    #[serde(default = "default_reload_interval_ms")]
    pub reload_interval_ms: u64,

    #[serde(default = "default_auth_headers")]
    pub auth_headers: String,
}

impl EnvSettings {
    /// Load from environment variables using their documented, unprefixed
    /// names (e.g. `HTTP_PORT`, `CONFIG_DIR`, `AUTH_HEADERS`).
    pub fn load() -> anyhow::Result<Self> {
        use figment::providers::Env;
        use figment::Figment;

        let settings: Self = Figment::from(figment::providers::Serialized::defaults(Self::default()))
            .merge(Env::raw())
            .extract()?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.reload_interval_ms != 0 && self.reload_interval_ms < 1000 {
            self.reload_interval_ms = 1000;
        }
        self
    }

    pub fn tokens_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.config_dir).join(&self.tokens_file)
    }

    pub fn users_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.config_dir).join(&self.users_file)
    }

    pub fn routes_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.config_dir).join(&self.routes_file)
    }

    pub fn roles_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.config_dir).join(&self.roles_file)
    }

    /// Auth headers in priority order, lowercased, as configured via
    /// `AUTH_HEADERS` (comma-separated).
    pub fn auth_headers(&self) -> Vec<String> {
        self.auth_headers
            .split(',')
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect()
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            tokens_file: default_tokens_file(),
            users_file: default_users_file(),
            routes_file: default_routes_file(),
            roles_file: default_roles_file(),
            http_port: default_http_port(),
            metrics_port: default_metrics_port(),
            reload_interval_ms: default_reload_interval_ms(),
            auth_headers: default_auth_headers(),
        }
        .normalized()
    }
}

fn default_config_dir() -> String {
    "local/config".to_string()
}
fn default_tokens_file() -> String {
    "tokens.yaml".to_string()
}
fn default_users_file() -> String {
    "users.yaml".to_string()
}
fn default_routes_file() -> String {
    "routes.yaml".to_string()
}
fn default_roles_file() -> String {
    "roles.yaml".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    8181
}
fn default_reload_interval_ms() -> u64 {
    15000
}
fn default_auth_headers() -> String {
    "x-authorization".to_string()
}
