//! CORS policy
//!
//! Decides per request whether cross-origin headers are attached.
//! Runs before routing so preflight requests get an answer for any path.

use std::collections::HashSet;

use http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Cross-origin policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// `Access-Control-Allow-Origin: *` on every response
    AllowAny,
    /// Echo the origin back only when it is in the set
    AllowList(HashSet<String>),
}

impl CorsPolicy {
    pub fn allow_list<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowList(origins.into_iter().map(Into::into).collect())
    }

    /// Build from configured origins; `*` anywhere means allow any origin.
    ///
    /// An empty list allows no origin at all.
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.iter().any(|o| o == "*") {
            Self::AllowAny
        } else {
            Self::allow_list(origins.iter().cloned())
        }
    }

    /// Add CORS headers to `headers` if the policy allows `origin`.
    ///
    /// Returns whether headers were added. A rejected origin is not an error.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) -> bool {
        let allow_origin = match self {
            CorsPolicy::AllowAny => HeaderValue::from_static("*"),
            CorsPolicy::AllowList(allowed) => {
                // The answer depends on the request origin
                headers.insert(VARY, HeaderValue::from_static("Origin"));
                let Some(origin) = origin else {
                    return false;
                };
                match origin.to_str() {
                    Ok(value) if allowed.contains(value) => origin.clone(),
                    _ => {
                        tracing::debug!("Origin {:?} not in allow-list; omitting CORS headers", origin);
                        return false;
                    }
                }
            }
        };

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        true
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::AllowAny
    }
}
