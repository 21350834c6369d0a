//! URL safety gate for SSRF protection.
//!
//! Every outbound fetch in the pipeline passes through [`UrlPolicy`] first.
//! A rejection short-circuits the caller; the network call is never made.

use std::collections::HashSet;
use std::net::IpAddr;

use url::Url;

use crate::error::{SecurityError, SecurityResult};

/// URL validator applied before any outbound request.
///
/// Blocks:
/// - Non-HTTP(S) schemes (file://, ftp://)
/// - Internal services (localhost, 127.0.0.1, ::1)
/// - Private IP ranges (10.x, 172.16.x, 192.168.x)
/// - Link-local / cloud metadata (169.254.x, metadata hostnames)
///
/// The image-migration variant ([`UrlPolicy::check_image_url`]) additionally
/// excludes our own storage host and any hostname containing `:`.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    /// Allowed URL schemes
    allowed_schemes: HashSet<String>,

    /// Blocked hostnames
    blocked_hosts: HashSet<String>,

    /// Blocked CIDR ranges
    blocked_cidrs: Vec<ipnet::IpNet>,

    /// Our own storage host; images there are already migrated
    storage_host: Option<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlPolicy {
    /// Create a policy with the default security rules.
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: [
                "localhost",
                "127.0.0.1",
                "::1",
                "[::1]",
                "0.0.0.0",
                "metadata.google.internal",
                "metadata.gke.internal",
                "instance-data",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            blocked_cidrs: vec![
                "10.0.0.0/8".parse().unwrap(),
                "172.16.0.0/12".parse().unwrap(),
                "192.168.0.0/16".parse().unwrap(),
                "169.254.0.0/16".parse().unwrap(), // Link-local / cloud metadata
                "127.0.0.0/8".parse().unwrap(),    // Loopback
                "0.0.0.0/8".parse().unwrap(),
                "::1/128".parse().unwrap(),  // IPv6 loopback
                "fc00::/7".parse().unwrap(), // IPv6 private
                "fe80::/10".parse().unwrap(), // IPv6 link-local
            ],
            storage_host: None,
        }
    }

    /// Set the storage host excluded from image re-migration.
    pub fn with_storage_host(mut self, host: impl Into<String>) -> Self {
        self.storage_host = Some(host.into().to_ascii_lowercase());
        self
    }

    /// Block an additional host.
    pub fn block_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.insert(host.into());
        self
    }

    /// Validate a URL before fetching a page. Returns the parsed URL.
    pub fn check_page_url(&self, url: &str) -> SecurityResult<Url> {
        let parsed = Url::parse(url)?;

        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(SecurityError::DisallowedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host_str().ok_or(SecurityError::NoHost)?;
        let host = host.to_ascii_lowercase();

        if self.blocked_hosts.contains(host.as_str()) {
            return Err(SecurityError::BlockedHost(host));
        }

        // IP literals are checked against the blocked ranges. IPv6 hosts
        // arrive bracketed from the url crate.
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            for cidr in &self.blocked_cidrs {
                if cidr.contains(&ip) {
                    return Err(SecurityError::BlockedCidr(ip.to_string()));
                }
            }
        }

        Ok(parsed)
    }

    /// Validate a URL before migrating an image. Returns the parsed URL.
    ///
    /// Stricter than [`check_page_url`](Self::check_page_url): our own
    /// storage host is excluded (those assets are already migrated), and any
    /// hostname containing `:` is rejected. The latter also blocks
    /// legitimate public IPv6 literals; that is intentional production
    /// policy, carried over as-is.
    pub fn check_image_url(&self, url: &str) -> SecurityResult<Url> {
        let parsed = self.check_page_url(url)?;

        let host = parsed
            .host_str()
            .ok_or(SecurityError::NoHost)?
            .to_ascii_lowercase();

        if host.starts_with('[') || host.contains(':') {
            return Err(SecurityError::BlockedHost(host));
        }

        if let Some(storage) = &self.storage_host {
            if &host == storage {
                return Err(SecurityError::StorageHost(host));
            }
        }

        Ok(parsed)
    }

    /// Convenience boolean form of [`check_page_url`](Self::check_page_url).
    pub fn is_safe_url(&self, url: &str) -> bool {
        self.check_page_url(url).is_ok()
    }

    /// Convenience boolean form of [`check_image_url`](Self::check_image_url).
    pub fn is_external_image_url(&self, url: &str) -> bool {
        self.check_image_url(url).is_ok()
    }
}
