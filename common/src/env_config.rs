use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds the store connection settings (a raw Postgres URL, a PostgREST
/// endpoint, or neither), session token validation, server binding,
/// logging preferences and the quota parameters used by the usage services.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// Postgres connection string. Takes precedence over the REST endpoint.
    pub database_url: Option<String>,
    /// Whether embedded migrations are applied on startup.
    pub run_migrations: bool,
    /// Base URL of the hosted backend (`https://<project>.supabase.co`).
    pub supabase_url: Option<String>,
    /// Service key sent as `apikey` and bearer token to the REST endpoint.
    pub supabase_service_key: Option<String>,
    /// Upper bound for a single store round trip, in seconds.
    pub store_timeout_secs: u64,
    /// Configuration for session token validation.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger mirrors its output to.
    pub log_file: String,
    /// Maximum level emitted by the logger (`error` .. `trace`).
    pub log_level: String,
    /// Plan assigned to accounts created by the bootstrapper.
    pub free_plan_id: String,
    /// IANA zone used for the daily and monthly quota windows. Server local time when unset.
    pub quota_timezone: Option<String>,
}

#[derive(Clone, Debug)]
/// Configuration for validating the session tokens issued by the backend's auth service.
pub struct JwtConfig {
    /// The secret key used to verify session tokens (HS256).
    pub secret: String,
    /// Expected `aud` claim.
    pub audience: String,
}

impl JwtConfig {
    /// Creates a new `JwtConfig` instance from environment variables.
    ///
    /// - `JWT_SECRET`: Required. The backend's JWT secret.
    /// - `JWT_AUDIENCE`: Optional. Defaults to `authenticated`.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        JwtConfig {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string()),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `JWT_SECRET`: Secret used to verify session tokens (via `JwtConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `DATABASE_URL`: Postgres connection string (default: unset)
    /// - `RUN_MIGRATIONS`: Apply embedded migrations on startup (default: false)
    /// - `SUPABASE_URL` / `SUPABASE_SERVICE_KEY`: REST endpoint and key (default: unset)
    /// - `STORE_TIMEOUT_SECS`: Per round trip timeout (default: 10)
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:8081")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "consultas.log")
    /// - `LOG_LEVEL`: Log level (default: "info")
    /// - `FREE_PLAN_ID`: Plan assigned on bootstrap (default: "free")
    /// - `QUOTA_TIMEZONE`: IANA zone for quota windows (default: server local time)
    ///
    /// When neither `DATABASE_URL` nor the Supabase pair is set the store is
    /// left unconfigured and every usage operation becomes a no-op.
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: non_empty_var("DATABASE_URL"),
            run_migrations: env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                == "true",
            supabase_url: non_empty_var("SUPABASE_URL"),
            supabase_service_key: non_empty_var("SUPABASE_SERVICE_KEY"),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "consultas.log".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            free_plan_id: env::var("FREE_PLAN_ID").unwrap_or_else(|_| "free".to_string()),
            quota_timezone: non_empty_var("QUOTA_TIMEZONE"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
