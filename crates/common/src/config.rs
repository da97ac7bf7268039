use reqwest::Url;

/// Default base URL for the GitHub-hosted agent avatar set.
pub const DEFAULT_GITHUB_AVATAR_BASE: &str =
    "https://raw.githubusercontent.com/Project-Land-It/landit-public/main/agent-profiles";

/// Discord's per-field character limit for embed field values.
pub const DEFAULT_MAX_FIELD_LENGTH: usize = 1024;

/// Where agent avatars are sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSource {
    /// Fixed URLs computed from the GitHub avatar base.
    Github,
    /// Live lookup against the Taiga user directory.
    Taiga,
}

impl std::str::FromStr for AvatarSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" | "static" => Ok(AvatarSource::Github),
            "taiga" | "directory" => Ok(AvatarSource::Taiga),
            other => Err(anyhow::anyhow!(
                "AVATAR_SOURCE must be `github` or `taiga`, got `{other}`"
            )),
        }
    }
}

/// HTTP transport used for webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Full-featured reqwest client (TLS, redirects, proxies).
    Reqwest,
    /// Minimal HTTP/1.1 over a plain TCP socket.
    Raw,
}

impl std::str::FromStr for TransportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reqwest" => Ok(TransportKind::Reqwest),
            "raw" => Ok(TransportKind::Raw),
            other => Err(anyhow::anyhow!(
                "HERALD_TRANSPORT must be `reqwest` or `raw`, got `{other}`"
            )),
        }
    }
}

/// Taiga directory service settings.
#[derive(Debug, Clone)]
pub struct TaigaConfig {
    /// API root, e.g. `http://192.168.1.13:8080/api/v1`
    pub api_url: String,

    /// Publicly reachable base URL used when rewriting photo URLs
    pub external_url: String,

    /// `host[:port]` string that marks a photo URL as internal
    pub internal_host: String,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Project whose members are listed (default: 1)
    pub project_id: u64,
}

impl TaigaConfig {
    /// Both credentials are present and non-empty.
    pub fn has_credentials(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.username) && present(&self.password)
    }
}

/// PostgreSQL settings for the optional agent state mirror.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the individual parts
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Option<String>,
}

impl DatabaseConfig {
    /// The mirror only runs when a connection string or a password is configured.
    pub fn is_configured(&self) -> bool {
        self.url.is_some() || self.password.is_some()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            name: "landit_sit_db".to_string(),
            user: "landit".to_string(),
            password: None,
        }
    }
}

/// Notifier configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct HeraldConfig {
    /// Discord webhook receiving agent messages (required)
    pub webhook_url: String,

    /// Transport used for the webhook POST (default: reqwest)
    pub transport: TransportKind,

    /// Avatar strategy (default: taiga when `TAIGA_API_URL` is set, else github)
    pub avatar_source: AvatarSource,

    /// Base URL of the GitHub-hosted avatar images
    pub github_avatar_base: String,

    /// Taiga settings, present when `TAIGA_API_URL` is set
    pub taiga: Option<TaigaConfig>,

    /// State mirror datastore settings
    pub database: DatabaseConfig,

    /// Maximum characters per embed field (default: 1024)
    pub max_field_length: usize,
}

impl HeraldConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook_url = var("DISCORD_AGENT_WEBHOOK_URL").ok_or_else(|| {
            anyhow::anyhow!("DISCORD_AGENT_WEBHOOK_URL environment variable is required")
        })?;

        let transport = var("HERALD_TRANSPORT")
            .map(|s| s.parse::<TransportKind>())
            .transpose()?
            .unwrap_or(TransportKind::Reqwest);

        let taiga = match var("TAIGA_API_URL") {
            Some(api_url) => Some(Self::taiga_from_vars(api_url, &var)?),
            None => None,
        };

        let requested_source: Option<AvatarSource> =
            var("AVATAR_SOURCE").map(|s| s.parse::<AvatarSource>()).transpose()?;
        let avatar_source = match (requested_source, taiga.is_some()) {
            (Some(AvatarSource::Taiga), false) => {
                tracing::warn!("AVATAR_SOURCE=taiga but TAIGA_API_URL is not set, using github");
                AvatarSource::Github
            }
            (Some(source), _) => source,
            (None, true) => AvatarSource::Taiga,
            (None, false) => AvatarSource::Github,
        };

        let database = DatabaseConfig {
            url: var("DATABASE_URL"),
            host: var("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: var("DB_PORT")
                .unwrap_or_else(|| "5432".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_PORT must be a valid u16"))?,
            name: var("DB_NAME").unwrap_or_else(|| "landit_sit_db".to_string()),
            user: var("DB_USER").unwrap_or_else(|| "landit".to_string()),
            password: var("DB_PASSWORD"),
        };

        let max_field_length: usize = var("MAX_FIELD_LENGTH")
            .unwrap_or_else(|| DEFAULT_MAX_FIELD_LENGTH.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("MAX_FIELD_LENGTH must be a valid usize"))?;
        if max_field_length == 0 {
            anyhow::bail!("MAX_FIELD_LENGTH must be greater than zero");
        }

        Ok(Self {
            webhook_url,
            transport,
            avatar_source,
            github_avatar_base: var("GITHUB_AVATAR_BASE")
                .unwrap_or_else(|| DEFAULT_GITHUB_AVATAR_BASE.to_string()),
            taiga,
            database,
            max_field_length,
        })
    }

    fn taiga_from_vars<V>(api_url: String, var: &V) -> anyhow::Result<TaigaConfig>
    where
        V: Fn(&str) -> Option<String>,
    {
        let parsed = Url::parse(&api_url)
            .map_err(|e| anyhow::anyhow!("TAIGA_API_URL is not a valid URL: {e}"))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("TAIGA_API_URL must include a host"))?;
        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        // No public URL: photo links stay as-is unless TAIGA_INTERNAL_HOST is set
        let (external_url, default_internal_host) = match var("TAIGA_EXTERNAL_URL") {
            Some(external_url) => (external_url, authority),
            None => (format!("{}://{}", parsed.scheme(), authority), String::new()),
        };

        Ok(TaigaConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            external_url: external_url.trim_end_matches('/').to_string(),
            internal_host: var("TAIGA_INTERNAL_HOST").unwrap_or(default_internal_host),
            username: var("TAIGA_USERNAME"),
            password: var("TAIGA_PASSWORD"),
            project_id: var("TAIGA_PROJECT_ID")
                .unwrap_or_else(|| "1".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("TAIGA_PROJECT_ID must be a valid u64"))?,
        })
    }
}
