use std::{collections::HashMap, env};

use crate::models::{Role, SubjectId};

/// Secret used to verify tokens when running locally without `JWT_SECRET`.
pub const LOCAL_JWT_SECRET: &str = "12345678901234567890123456789012";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and shared
/// immutably through `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and secret requirements.
    pub env: Env,
    // HS256 secret used to verify incoming bearer tokens.
    pub jwt_secret: String,
    // Postgres connection string. `None` selects the in-memory store.
    pub db_url: Option<String>,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Role grants seeded into the in-memory role store.
    pub role_grants: HashMap<SubjectId, Vec<Role>>,
}

/// Env
///
/// Defines the runtime context.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test setup: local mode, in-memory store and the local
    /// secret, with subject 1 holding `USER`.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            db_url: None,
            bind_addr: "127.0.0.1:0".to_string(),
            role_grants: HashMap::from([(SubjectId(1), vec![Role::new("USER")])]),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is missing in production, or if `ROLE_GRANTS` cannot be parsed.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let role_grants = match env::var("ROLE_GRANTS") {
            Ok(raw) => parse_role_grants(&raw)
                .unwrap_or_else(|e| panic!("FATAL: ROLE_GRANTS is malformed: {e}")),
            // Locally, subject 1 can create products out of the box.
            Err(_) if env == Env::Local => {
                HashMap::from([(SubjectId(1), vec![Role::new("USER")])])
            }
            Err(_) => HashMap::new(),
        };

        Self {
            env,
            jwt_secret,
            db_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            role_grants,
        }
    }
}

/// parse_role_grants
///
/// Parses `subject=ROLE|ROLE;subject=ROLE` into a grant table. Blank entries are skipped, and a
/// subject listed twice accumulates its roles.
pub fn parse_role_grants(raw: &str) -> Result<HashMap<SubjectId, Vec<Role>>, String> {
    let mut grants: HashMap<SubjectId, Vec<Role>> = HashMap::new();

    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (subject, roles) = entry
            .split_once('=')
            .ok_or_else(|| format!("entry `{entry}` is missing `=`"))?;

        let subject = subject
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("`{}` is not a numeric subject id", subject.trim()))?;

        let roles = roles
            .split('|')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Role::new);

        grants.entry(SubjectId(subject)).or_default().extend(roles);
    }

    Ok(grants)
}
