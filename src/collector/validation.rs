//! Shape check for shareable MTProto proxy links.

use url::Url;

/// Every accepted proxy link starts with this prefix.
pub const PROXY_URL_PREFIX: &str = "https://t.me/proxy?";

/// Returns true if `url` looks like a usable `t.me/proxy` link.
///
/// The link must start with [`PROXY_URL_PREFIX`] and its query must carry
/// both a `server` and a `port` key. Values are not inspected: an empty
/// `port=` still counts as present. Anything that fails to parse is
/// rejected.
///
/// # Examples
/// ```
/// use config_harvester::collector::validation::is_valid_proxy_url;
///
/// assert!(is_valid_proxy_url("https://t.me/proxy?server=1.2.3.4&port=443"));
/// assert!(!is_valid_proxy_url("https://t.me/proxy?server=1"));
/// assert!(!is_valid_proxy_url("http://t.me/proxy?server=1&port=2"));
/// ```
pub fn is_valid_proxy_url(url: &str) -> bool {
    if !url.starts_with(PROXY_URL_PREFIX) {
        return false;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Rejecting unparsable proxy link {}: {}", url, e);
            return false;
        }
    };

    let (mut has_server, mut has_port) = (false, false);
    for (key, _) in parsed.query_pairs() {
        match key.as_ref() {
            "server" => has_server = true,
            "port" => has_port = true,
            _ => {}
        }
    }
    has_server && has_port
}
