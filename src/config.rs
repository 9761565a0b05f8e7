use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub struct Config {
    pub host: [u8; 4],
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_host(value: &str) -> Option<[u8; 4]> {
    let ip: std::net::Ipv4Addr = value.parse().ok()?;
    Some(ip.octets())
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|v| parse_host(&v))
                .unwrap_or([127, 0, 0, 1]),
            port: parsed("PORT", 3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            // Set JWT_SECRET in any real deployment.
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
            jwt_ttl_secs: parsed("JWT_TTL_SECS", 3600),
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", 30),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
