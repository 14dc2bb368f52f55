use std::env;

/// Port the admin backend listens on unless the base URL is overridden.
pub const DEFAULT_API_PORT: u16 = 4000;

/// Overrides the whole base URL, at build time or at run time.
pub const API_URL_VAR: &str = "LUMINA_API_URL";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// `<protocol>//<hostname>:4000`, where `protocol` is the page's
    /// `location.protocol` (`"https:"`).
    pub fn for_page(protocol: &str, hostname: &str) -> Self {
        let protocol = protocol.trim().trim_end_matches("//");
        let protocol = if protocol.is_empty() {
            "http:".to_string()
        } else if protocol.ends_with(':') {
            protocol.to_string()
        } else {
            format!("{protocol}:")
        };
        let hostname = if hostname.trim().is_empty() {
            "localhost"
        } else {
            hostname.trim()
        };
        Self::new(format!("{protocol}//{hostname}:{DEFAULT_API_PORT}"))
    }

    pub fn resolve(protocol: &str, hostname: &str, override_url: Option<&str>) -> Self {
        match override_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Self::new(url),
            None => Self::for_page(protocol, hostname),
        }
    }

    pub fn build_time_override() -> Option<&'static str> {
        option_env!("LUMINA_API_URL")
    }

    /// Runtime variable first, then the value baked in at build time, then
    /// the page convention for a local host.
    pub fn from_env() -> Self {
        let runtime = env::var(API_URL_VAR).ok();
        let chosen = runtime.as_deref().or(Self::build_time_override());
        Self::resolve("http:", "localhost", chosen)
    }

    pub fn api_url(&self, resource: &str) -> String {
        format!(
            "{}/api/{}",
            self.base_url,
            resource.trim_start_matches('/').trim_start_matches("api/")
        )
    }

    pub fn realtime_url(&self) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{base}/ws")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_page("http:", "localhost")
    }
}

/// Settings for the mock backend binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// When set, `/api/auth/login` only accepts this password.
    pub admin_password: Option<String>,
}

impl ServerConfig {
    pub fn local(secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: secret.into(),
            token_ttl_hours: 1,
            admin_password: None,
        }
    }

    pub fn from_env() -> Self {
        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| format!("0.0.0.0:{DEFAULT_API_PORT}"));
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            "lumina-dev-secret".into()
        });
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());
        Self {
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            admin_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_convention_uses_fixed_port() {
        let config = ApiConfig::for_page("https:", "admin.lumina.shop");
        assert_eq!(config.base_url, "https://admin.lumina.shop:4000");
        assert_eq!(
            config.api_url("payment/methods"),
            "https://admin.lumina.shop:4000/api/payment/methods"
        );
        assert_eq!(config.realtime_url(), "wss://admin.lumina.shop:4000/ws");
    }

    #[test]
    fn protocol_without_colon_is_normalized() {
        let config = ApiConfig::for_page("http", "");
        assert_eq!(config.base_url, "http://localhost:4000");
    }

    #[test]
    fn override_replaces_the_convention() {
        let config = ApiConfig::resolve("http:", "localhost", Some("https://api.lumina.shop/"));
        assert_eq!(config.base_url, "https://api.lumina.shop");
        assert_eq!(config.api_url("/api/videos"), "https://api.lumina.shop/api/videos");

        let blank = ApiConfig::resolve("http:", "shop.local", Some("   "));
        assert_eq!(blank.base_url, "http://shop.local:4000");
    }
}
