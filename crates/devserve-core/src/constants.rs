//! Server-wide constants

/// Default bind address when neither config nor CLI provide one
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// Default static root served when no `root` is configured
pub const DEFAULT_ROOT: &str = "./public";

/// Default index document for SPA-style navigation fallback
pub const DEFAULT_INDEX: &str = "index.html";

/// Default configuration file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "devserve.yaml";

/// Value of the `Server` response header on locally served responses
pub const SERVER_NAME: &str = "devserve";

/// Hop-by-hop headers, never forwarded in either direction (RFC 9110 §7.6.1)
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// True when `name` names a hop-by-hop header (case-insensitive)
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_by_hop_matching_is_case_insensitive() {
        assert!(is_hop_by_hop("Connection"));
        assert!(is_hop_by_hop("TRANSFER-ENCODING"));
        assert!(!is_hop_by_hop("content-type"));
        assert!(!is_hop_by_hop("host"));
    }
}
