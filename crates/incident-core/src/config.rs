//! Environment-sourced settings
//!
//! Every setting has a default except identity and AI endpoint
//! identifiers, which stay empty until configured. Loading goes through a
//! lookup function so tests never touch the process environment.

use crate::error::ConfigError;
use crate::field::{FieldList, FieldName};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// All settings for one process
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// HTTP server
    pub server: ServerConfig,
    /// Incident table access
    pub database: DatabaseConfig,
    /// Identity gate
    pub identity: IdentityConfig,
    /// AI processing endpoint
    pub ai: AiConfig,
}

impl Settings {
    /// Load from the process environment
    ///
    /// # Errors
    /// `ConfigError::Invalid` if a set variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup; blank values count as unset
    ///
    /// # Errors
    /// `ConfigError::Invalid` if a set variable cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        Ok(Self {
            server: ServerConfig::load(&env)?,
            database: DatabaseConfig::load(&env)?,
            identity: IdentityConfig::load(&env)?,
            ai: AiConfig::load(&env)?,
        })
    }
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::invalid(key, raw, e.to_string())),
            None => Ok(None),
        }
    }

    fn flag(&self, key: &'static str) -> Result<bool, ConfigError> {
        match self.get(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("0" | "false" | "no" | "off") => Ok(false),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some(other) => Err(ConfigError::invalid(key, other, "expected a boolean")),
        }
    }
}

/// HTTP server and API location
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the API server binds to
    pub bind_addr: SocketAddr,
    /// Base URL the console uses to reach the API
    pub api_base_url: String,
}

impl ServerConfig {
    fn load(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: env.parse("BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            api_base_url: env.get("INCIDENT_API_URL").unwrap_or(defaults.api_base_url),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            api_base_url: "http://127.0.0.1:3001".to_string(),
        }
    }
}

/// Incident table location and shape
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// Maximum pooled connections
    pub pool_max: usize,
    /// Incident table
    pub table: FieldName,
    /// Column holding the incident number
    pub key_column: FieldName,
    /// Retrievable and updatable fields; empty means all columns
    pub fields: FieldList,
}

impl DatabaseConfig {
    fn load(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let pool_max = env.parse::<usize>("DB_POOL_MAX")?.unwrap_or(defaults.pool_max);
        if pool_max == 0 {
            return Err(ConfigError::invalid("DB_POOL_MAX", "0", "must be at least 1"));
        }

        Ok(Self {
            path: env.get("DB_DATABASE").map_or(defaults.path, PathBuf::from),
            pool_max,
            table: env.parse("DB_TABLE_NAME")?.unwrap_or(defaults.table),
            key_column: env.parse("DB_KEY_COLUMN")?.unwrap_or(defaults.key_column),
            fields: env.parse("INCIDENT_FIELDS")?.unwrap_or_default(),
        })
    }

    /// Config for a database file with default table layout
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// With configured fields
    #[inline]
    #[must_use]
    pub fn with_fields(mut self, fields: FieldList) -> Self {
        self.fields = fields;
        self
    }

    /// With table name
    #[inline]
    #[must_use]
    pub fn with_table(mut self, table: FieldName) -> Self {
        self.table = table;
        self
    }

    /// With pool size
    #[inline]
    #[must_use]
    pub fn with_pool_max(mut self, pool_max: usize) -> Self {
        self.pool_max = pool_max.max(1);
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("incidents.db"),
            pool_max: 10,
            table: FieldName::trusted("Incidents"),
            key_column: FieldName::trusted("IncidentNumber"),
            fields: FieldList::new(),
        }
    }
}

/// Which claim decides authorization
#[derive(Debug, Clone, Default)]
pub struct AccessPolicyConfig {
    /// Group identifier required in the `groups` claim
    pub required_group_id: String,
    /// App role required in the `roles` claim when app roles are enabled
    pub required_app_role: String,
    /// Use the app-role check instead of group membership
    pub use_app_roles: bool,
}

/// Identity provider registration and access policy
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Application (client) id; expected token audience
    pub client_id: String,
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Authorization policy
    pub policy: AccessPolicyConfig,
    /// Application origin used as post-logout redirect
    pub app_origin: String,
    /// Where the token cache lives
    pub token_cache: Option<PathBuf>,
}

impl IdentityConfig {
    fn load(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            client_id: env.get("AZURE_CLIENT_ID").unwrap_or_default(),
            tenant_id: env.get("AZURE_TENANT_ID").unwrap_or_default(),
            policy: AccessPolicyConfig {
                required_group_id: env.get("REQUIRED_GROUP_ID").unwrap_or_default(),
                required_app_role: env.get("REQUIRED_APP_ROLE").unwrap_or_default(),
                use_app_roles: env.flag("IDENTITY_USE_APP_ROLES")?,
            },
            app_origin: env.get("APP_ORIGIN").unwrap_or(defaults.app_origin),
            token_cache: env.get("IDENTITY_TOKEN_CACHE").map(PathBuf::from),
        })
    }

    /// Login authority for the tenant
    #[must_use]
    pub fn authority(&self) -> String {
        format!("https://login.microsoftonline.com/{}", self.tenant_id)
    }

    /// With required group
    #[inline]
    #[must_use]
    pub fn with_required_group(mut self, group: impl Into<String>) -> Self {
        self.policy.required_group_id = group.into();
        self
    }

    /// With client id
    #[inline]
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            tenant_id: String::new(),
            policy: AccessPolicyConfig::default(),
            app_origin: "http://localhost:3000".to_string(),
            token_cache: None,
        }
    }
}

/// External AI text-processing endpoint
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Endpoint URL
    pub endpoint: Option<String>,
    /// API key, sent only when set
    pub api_key: Option<String>,
    /// Header carrying the API key
    pub header_name: String,
    /// Instruction prepended to the user text
    pub preconfigured_statement: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling mass
    pub top_p: f64,
    /// Completion token limit
    pub max_tokens: u32,
}

impl AiConfig {
    fn load(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            endpoint: env.get("API_ENDPOINT"),
            api_key: env.get("API_KEY"),
            header_name: env.get("API_HEADER_NAME").unwrap_or(defaults.header_name),
            preconfigured_statement: env
                .get("API_PRECONFIGURED_STATEMENT")
                .unwrap_or_default(),
            temperature: env.parse("API_TEMPERATURE")?.unwrap_or(defaults.temperature),
            top_p: env.parse("API_TOP_P")?.unwrap_or(defaults.top_p),
            max_tokens: env.parse("API_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
        })
    }

    /// Config pointing at an endpoint with default parameters
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With preconfigured statement
    #[inline]
    #[must_use]
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.preconfigured_statement = statement.into();
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            header_name: "api-key".to_string(),
            preconfigured_statement: String::new(),
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 800,
        }
    }
}
