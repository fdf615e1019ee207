//! Isolation policy for the iframe a view runs in.
use mcp_ui_core::ui::apps::{UiPermissions, UiResourceMeta, UiResourceCsp};
use url::Url;

use crate::config::SandboxConfig;

/// Everything the host needs to set up the sandbox proxy iframe.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxPolicy {
    pub proxy_url: Url,
    /// Value of the iframe `sandbox` attribute
    pub sandbox_attribute: String,
    /// Content Security Policy for the inner document
    pub csp: String,
    /// Value of the iframe `allow` attribute
    pub permissions_allow: String,
}

impl SandboxPolicy {
    pub fn new(config: &SandboxConfig, resource_meta: Option<&UiResourceMeta>) -> Self {
        let mut permissions_allow =
            permissions_allow(resource_meta.and_then(|meta| meta.permissions.as_ref()));
        if let Some(policy) = &config.permissions_policy {
            if !permissions_allow.is_empty() {
                permissions_allow.push_str("; ");
            }
            permissions_allow.push_str(policy);
        }

        Self {
            proxy_url: config.url.clone(),
            sandbox_attribute: config.sandbox_attribute(),
            csp: build_csp(resource_meta.and_then(|meta| meta.csp.as_ref())),
            permissions_allow,
        }
    }
}

// Anything that could break out of a source list is refused.
fn is_valid_source(domain: &str) -> bool {
    !domain.is_empty()
        && !domain
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | ',' | '\'' | '"'))
}

fn sources(domains: Option<&Vec<String>>) -> Vec<&str> {
    domains
        .into_iter()
        .flatten()
        .filter_map(|domain| {
            if is_valid_source(domain) {
                Some(domain.as_str())
            } else {
                tracing::warn!(domain = %domain, "dropping invalid CSP source");
                None
            }
        })
        .collect()
}

fn directive(name: &str, fixed: &[&str], extra: &[&str]) -> String {
    let mut parts = Vec::with_capacity(1 + fixed.len() + extra.len());
    parts.push(name);
    parts.extend_from_slice(fixed);
    parts.extend_from_slice(extra);
    parts.join(" ")
}

/// Build a default-deny CSP, opened only for the domains the resource declares.
pub fn build_csp(csp: Option<&UiResourceCsp>) -> String {
    let resource = sources(csp.and_then(|c| c.resource_domains.as_ref()));
    let connect = sources(csp.and_then(|c| c.connect_domains.as_ref()));
    let frame = sources(csp.and_then(|c| c.frame_domains.as_ref()));
    let base = sources(csp.and_then(|c| c.base_uri_domains.as_ref()));

    let frame_src = if frame.is_empty() {
        directive("frame-src", &["'none'"], &[])
    } else {
        directive("frame-src", &[], &frame)
    };

    [
        directive("default-src", &["'none'"], &[]),
        directive("script-src", &["'self'", "'unsafe-inline'"], &resource),
        directive("style-src", &["'self'", "'unsafe-inline'"], &resource),
        directive("img-src", &["'self'", "data:"], &resource),
        directive("font-src", &["'self'"], &resource),
        directive("media-src", &["'self'", "data:"], &resource),
        directive("connect-src", &["'self'"], &connect),
        frame_src,
        directive("base-uri", &["'self'"], &base),
        directive("object-src", &["'none'"], &[]),
    ]
    .join("; ")
}

/// Drop every declared source [`build_csp`] would refuse, so a proxy that
/// builds its own policy from these lists gets the same domains.
pub fn sanitize_csp(csp: &UiResourceCsp) -> UiResourceCsp {
    let owned = |domains: &Option<Vec<String>>| {
        domains.as_ref().map(|domains| {
            sources(Some(domains))
                .into_iter()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
    };
    UiResourceCsp {
        connect_domains: owned(&csp.connect_domains),
        resource_domains: owned(&csp.resource_domains),
        frame_domains: owned(&csp.frame_domains),
        base_uri_domains: owned(&csp.base_uri_domains),
    }
}

/// Render the iframe `allow` attribute for the requested permissions.
pub fn permissions_allow(permissions: Option<&UiPermissions>) -> String {
    let Some(permissions) = permissions else {
        return String::new();
    };
    [
        ("camera", permissions.camera.is_some()),
        ("microphone", permissions.microphone.is_some()),
        ("geolocation", permissions.geolocation.is_some()),
        ("clipboard-write", permissions.clipboard_write.is_some()),
    ]
    .into_iter()
    .filter_map(|(feature, requested)| requested.then_some(feature))
    .collect::<Vec<_>>()
    .join("; ")
}
