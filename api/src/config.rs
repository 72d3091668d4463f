//! Backend selection.
//!
//! `GAITVISION_API_URL` points the client at a running backend. On native
//! builds it is read at startup; the browser has no process environment, so
//! web builds bake the value in at compile time. The special value `local`
//! skips the network and runs the formatter/normaliser in-process.

pub const API_URL_ENV: &str = "GAITVISION_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";
const LOCAL_MARKER: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Remote(String),
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub backend: Backend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Remote(DEFAULT_BASE_URL.to_string()),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        #[cfg(target_arch = "wasm32")]
        let raw = option_env!("GAITVISION_API_URL").map(str::to_string);

        #[cfg(not(target_arch = "wasm32"))]
        let raw = std::env::var(API_URL_ENV).ok();

        Self::parse(raw.as_deref())
    }

    pub fn parse(raw: Option<&str>) -> Self {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Self::default();
        }
        if value.eq_ignore_ascii_case(LOCAL_MARKER) {
            return Self {
                backend: Backend::Local,
            };
        }
        Self {
            backend: Backend::Remote(value.trim_end_matches('/').to_string()),
        }
    }

    pub fn local() -> Self {
        Self {
            backend: Backend::Local,
        }
    }

    /// Full endpoint URL for a remote backend, `None` when running locally.
    pub fn endpoint(&self, path: &str) -> Option<String> {
        match &self.backend {
            Backend::Remote(base) => Some(format!("{base}/{}", path.trim_start_matches('/'))),
            Backend::Local => None,
        }
    }
}
