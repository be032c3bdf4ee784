//! URL helpers for frontend-backend communication

use crate::shared::config::ApiConfig;

/// Get the base URL for API requests
///
/// Built from the current window location and the configured backend port
/// and prefix, e.g. "http://localhost:3000/api". Without a window the host
/// part is empty and only the prefix remains.
pub fn api_base(config: &ApiConfig) -> String {
    let host = match web_sys::window() {
        Some(window) => {
            let location = window.location();
            let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
            let hostname = location
                .hostname()
                .unwrap_or_else(|_| "127.0.0.1".to_string());
            format!("{}//{}:{}", protocol, hostname, config.port)
        }
        None => String::new(),
    };
    format!("{}{}", host, config.prefix.trim_end_matches('/'))
}

/// Build a full API URL from an endpoint path such as "/qualitative/domains"
pub fn api_url(config: &ApiConfig, path: &str) -> String {
    join_url(&api_base(config), path)
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Appends url-encoded query parameters to a path
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(
            join_url("http://h:3000/api/", "/results/domain-weights"),
            "http://h:3000/api/results/domain-weights"
        );
        assert_eq!(join_url("/api", "programs"), "/api/programs");
    }

    #[test]
    fn test_with_query_encodes_values() {
        assert_eq!(
            with_query("/qualitative/responses", &[("program_id", "12".to_string())]),
            "/qualitative/responses?program_id=12"
        );
        assert_eq!(
            with_query("/x", &[("a", "b c".to_string()), ("d", "&".to_string())]),
            "/x?a=b%20c&d=%26"
        );
        assert_eq!(with_query("/x", &[]), "/x");
    }
}
