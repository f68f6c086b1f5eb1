//! Final destination resolution for the redirect page.

use tracing::warn;
use url::Url;

/// Root-path rewrites for legacy landing hosts: `(host, replacement)`.
const LEGACY_ROOT_REWRITES: &[(&str, &str)] = &[
    ("mobila-buna-redirect.netlify.app", "https://youtube.com"),
    ("mobila-buna-redirect.com", "https://mobila-buna.md"),
];

/// Resolves the URL the visitor is finally sent to.
///
/// Root requests (`/` or `/index.html`) on the legacy landing hosts are
/// rewritten; every other target, including targets that fail to parse, is
/// returned unchanged. Targets are validated on creation, so an unparseable
/// one can only come from rows stored before that check and is logged.
pub fn resolve_destination(target_url: &str) -> String {
    let url = match Url::parse(target_url) {
        Ok(url) => url,
        Err(e) => {
            warn!(target_url, "Stored target URL does not parse, redirecting as is: {}", e);
            return target_url.to_string();
        }
    };

    let is_root = matches!(url.path(), "/" | "/index.html");
    if !is_root {
        return target_url.to_string();
    }

    url.host_str()
        .and_then(|host| {
            LEGACY_ROOT_REWRITES
                .iter()
                .find(|(legacy, _)| *legacy == host)
                .map(|(_, replacement)| replacement.to_string())
        })
        .unwrap_or_else(|| target_url.to_string())
}
