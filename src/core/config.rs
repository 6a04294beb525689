use std::env;
use std::time::Duration;

use crate::features::concerns::models::ConcernStatuses;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub concerns: ConcernsConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// Key of the custom claim object carrying roles and permissions
    pub claims_namespace: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
    /// Where browsers are sent when they lack the capability for a page
    pub login_url: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// A default notification recipient, e.g. `John Doe <jdoe@example.com>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverContact {
    pub name: String,
    pub address: String,
}

/// Settings of the concern workflow.
///
/// Built once at start-up and handed to the services; nothing reads the
/// environment after this point.
#[derive(Debug, Clone)]
pub struct ConcernsConfig {
    /// Identifying name of the site, used in the notification subject and links
    pub site_name: String,
    pub statuses: ConcernStatuses,
    pub resolvers: Vec<ResolverContact>,
    /// Subject template, `{site}` is replaced with `site_name`
    pub email_subject: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_email: String,
    /// Transactional mail API endpoint. Messages are only logged when unset.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            concerns: ConcernsConfig::from_env()?,
            mail: MailConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute
    const DEFAULT_CLAIMS_NAMESPACE: &'static str = "https://concerns.local/claims";
    const DEFAULT_LOGIN_URL: &'static str = "/accounts/login/";

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?;

        let audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE environment variable is required".to_string())?;

        let claims_namespace = env::var("AUTH_CLAIMS_NAMESPACE")
            .unwrap_or_else(|_| Self::DEFAULT_CLAIMS_NAMESPACE.to_string());

        let jwks_cache_ttl_secs = env::var("JWKS_CACHE_TTL")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWKS_CACHE_TTL must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        let login_url = env::var("LOGIN_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_LOGIN_URL.to_string());

        Ok(Self {
            issuer,
            audience,
            claims_namespace,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
            login_url,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Concerns API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Privacy concern reporting and resolution".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl ConcernsConfig {
    const DEFAULT_SITE_NAME: &'static str = "example.com";
    const DEFAULT_EMAIL_SUBJECT: &'static str = "Concern Reported for {site}";

    pub fn from_env() -> Result<Self, String> {
        let site_name = env::var("SITE_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_SITE_NAME.to_string());

        let statuses = parse_statuses(env::var("CONCERN_STATUSES").ok().as_deref())?;

        let resolvers = parse_resolvers(&env::var("CONCERN_RESOLVERS").unwrap_or_default())?;

        let email_subject = env::var("CONCERN_EMAIL_SUBJECT")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_EMAIL_SUBJECT.to_string());

        Ok(Self {
            site_name,
            statuses,
            resolvers,
            email_subject,
        })
    }

    /// Subject line for notifications about this site
    pub fn subject(&self) -> String {
        self.email_subject.replace("{site}", &self.site_name)
    }
}

impl MailConfig {
    const DEFAULT_FROM_EMAIL: &'static str = "webmaster@localhost";

    pub fn from_env() -> Result<Self, String> {
        let from_email = env::var("DEFAULT_FROM_EMAIL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_FROM_EMAIL.to_string());

        let api_url = env::var("MAIL_API_URL").ok().filter(|s| !s.is_empty());
        let api_key = env::var("MAIL_API_KEY").ok().filter(|s| !s.is_empty());

        if api_url.is_some() && api_key.is_none() {
            return Err("MAIL_API_KEY must be set when MAIL_API_URL is set".to_string());
        }

        Ok(Self {
            from_email,
            api_url,
            api_key,
        })
    }
}

/// Parse the comma-separated status list. An unset or blank value falls back
/// to the built-in list.
pub fn parse_statuses(raw: Option<&str>) -> Result<ConcernStatuses, String> {
    let values: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();

    if values.iter().all(|s| s.is_empty()) {
        return Ok(ConcernStatuses::default());
    }

    ConcernStatuses::new(values).map_err(|e| format!("Invalid CONCERN_STATUSES: {}", e))
}

/// Parse `Name <address>` entries separated by commas. A bare address is
/// accepted and gets an empty display name.
pub fn parse_resolvers(raw: &str) -> Result<Vec<ResolverContact>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_resolver)
        .collect()
}

fn parse_resolver(entry: &str) -> Result<ResolverContact, String> {
    let (name, address) = match (entry.find('<'), entry.rfind('>')) {
        (Some(open), Some(close)) if open < close => {
            (entry[..open].trim(), entry[open + 1..close].trim())
        }
        (None, None) => ("", entry),
        _ => return Err(format!("Invalid CONCERN_RESOLVERS entry: '{}'", entry)),
    };

    if !address.contains('@') {
        return Err(format!(
            "Invalid CONCERN_RESOLVERS address in entry: '{}'",
            entry
        ));
    }

    Ok(ResolverContact {
        name: name.trim_matches('"').to_string(),
        address: address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statuses_defaults_when_unset_or_blank() {
        let defaults = ConcernStatuses::default();
        assert_eq!(parse_statuses(None).unwrap(), defaults);
        assert_eq!(parse_statuses(Some("  ")).unwrap(), defaults);
        assert_eq!(defaults.default_status().as_str(), "New");
    }

    #[test]
    fn test_parse_statuses_keeps_order() {
        let statuses = parse_statuses(Some("Open, Triaged ,Done")).unwrap();
        let names: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["Open", "Triaged", "Done"]);
        assert_eq!(statuses.default_status().as_str(), "Open");
    }

    #[test]
    fn test_parse_statuses_rejects_duplicates_and_gaps() {
        assert!(parse_statuses(Some("New,New")).is_err());
        assert!(parse_statuses(Some("New,,Closed")).is_err());
    }

    #[test]
    fn test_parse_resolvers() {
        let resolvers =
            parse_resolvers("John Doe <jdoe@example.com>, privacy@example.com").unwrap();
        assert_eq!(
            resolvers,
            vec![
                ResolverContact {
                    name: "John Doe".to_string(),
                    address: "jdoe@example.com".to_string(),
                },
                ResolverContact {
                    name: String::new(),
                    address: "privacy@example.com".to_string(),
                },
            ]
        );
        assert!(parse_resolvers("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_resolvers_rejects_malformed_entries() {
        assert!(parse_resolvers("John <jdoe@example.com").is_err());
        assert!(parse_resolvers("not-an-address").is_err());
    }
}
