//! Pattern extraction of config URIs and proxy links from message content.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{ChannelMessage, ConfigSet, LinkAnnotation, Protocol};
use super::validation::is_valid_proxy_url;

// One alternation scanned once: matches cannot overlap, so an `ss://` that
// sits inside a `vless://` config is never reported as shadowsocks.
static CONFIG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(vless|vmess|ss|shadowsocks|trojan)://\S+").expect("config regex is valid")
});

// `)` ends the link so Markdown-wrapped proxies come out clean.
static PROXY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://t\.me/proxy\?[^\s)]+").expect("proxy regex is valid"));

impl Protocol {
    /// Protocol named by a URI scheme; `ss` is shadowsocks.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "vless" => Some(Protocol::Vless),
            "vmess" => Some(Protocol::Vmess),
            "ss" | "shadowsocks" => Some(Protocol::Shadowsocks),
            "trojan" => Some(Protocol::Trojan),
            _ => None,
        }
    }
}

/// Collects every config URI in `text`, verbatim, grouped by protocol.
///
/// Empty text gives an empty set.
pub fn extract_configs(text: &str) -> ConfigSet {
    let mut configs = ConfigSet::new();
    for caps in CONFIG_RE.captures_iter(text) {
        let (Some(whole), Some(scheme)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some(protocol) = Protocol::from_scheme(scheme.as_str()) {
            configs.extend_protocol(protocol, std::iter::once(whole.as_str().to_string()));
        }
    }
    configs
}

/// Collects valid proxy links from the message text and its link annotations.
///
/// Text matches come first, then annotations in message order. Only links
/// passing [`is_valid_proxy_url`] are kept, each once.
pub fn extract_proxies(message: &ChannelMessage) -> Vec<String> {
    let text = message.text();

    let from_text = text
        .into_iter()
        .flat_map(|t| PROXY_RE.find_iter(t).map(|m| m.as_str().to_string()));
    let from_links = message
        .links
        .iter()
        .filter_map(|link| resolve_link(link, text));

    from_text
        .chain(from_links)
        .filter(|url| is_valid_proxy_url(url))
        .unique()
        .collect()
}

/// Turns an annotation into a URL; spans outside the text resolve to `None`.
fn resolve_link(link: &LinkAnnotation, text: Option<&str>) -> Option<String> {
    match link {
        LinkAnnotation::TextUrl { url } => Some(url.clone()),
        LinkAnnotation::Url { offset, length } => slice_utf16(text?, *offset, *length),
    }
}

/// Telegram measures entity spans in UTF-16 code units.
fn slice_utf16(text: &str, offset: i32, length: i32) -> Option<String> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(length).ok()?)?;
    let units: Vec<u16> = text.encode_utf16().collect();
    let span = units.get(start..end)?;
    String::from_utf16(span).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    const PROXY: &str = "https://t.me/proxy?server=1.1.1.1&port=443&secret=xyz";

    #[test]
    fn test_extracts_each_protocol() {
        let text = "new!\nvless://abc@host:443?type=ws#x\nvmess://eyJ2IjoyfQ==\n\
                    ss://YWVzOnBhc3M@1.2.3.4:8388 and trojan://pw@host:443";
        let configs = extract_configs(text);

        assert_eq!(configs.get(Protocol::Vless), ["vless://abc@host:443?type=ws#x"]);
        assert_eq!(configs.get(Protocol::Vmess), ["vmess://eyJ2IjoyfQ=="]);
        assert_eq!(configs.get(Protocol::Shadowsocks), ["ss://YWVzOnBhc3M@1.2.3.4:8388"]);
        assert_eq!(configs.get(Protocol::Trojan), ["trojan://pw@host:443"]);
    }

    #[test]
    fn test_vless_does_not_leak_into_shadowsocks() {
        let configs = extract_configs("vless://abc123");
        assert_eq!(configs.count(Protocol::Vless), 1);
        assert_eq!(configs.count(Protocol::Shadowsocks), 0);
    }

    #[test]
    fn test_ss_inside_another_config_is_not_shadowsocks() {
        let configs = extract_configs("vless://id@h:443?path=/ss://x#r\nvless://a|ss://b");

        assert_eq!(configs.get(Protocol::Vless), ["vless://id@h:443?path=/ss://x#r", "vless://a|ss://b"]);
        assert!(configs.get(Protocol::Shadowsocks).is_empty());
        assert_eq!(configs.total(), 2);
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!(Protocol::from_scheme("ss"), Some(Protocol::Shadowsocks));
        assert_eq!(Protocol::from_scheme("shadowsocks"), Some(Protocol::Shadowsocks));
        assert_eq!(Protocol::from_scheme("http"), None);
    }

    #[test]
    fn test_shadowsocks_long_scheme() {
        let configs = extract_configs("shadowsocks://abc");
        assert_eq!(configs.get(Protocol::Shadowsocks), ["shadowsocks://abc"]);
    }

    #[test]
    fn test_matches_keep_duplicates_and_order() {
        let configs = extract_configs("trojan://b trojan://a trojan://b");
        assert_eq!(configs.get(Protocol::Trojan), ["trojan://b", "trojan://a", "trojan://b"]);
    }

    #[test]
    fn test_every_match_starts_with_its_scheme_and_is_idempotent() {
        let text = "xss://no vless://a,vmess://b (trojan://c) ss://d";
        let first = extract_configs(text);
        let second = extract_configs(text);
        assert_eq!(first, second);

        for (protocol, configs) in first.iter() {
            for config in configs {
                let ok = match protocol {
                    Protocol::Shadowsocks => config.starts_with("ss://") || config.starts_with("shadowsocks://"),
                    other => config.starts_with(&format!("{}://", other)),
                };
                assert!(ok, "{config} does not belong to {protocol}");
            }
        }
        assert_eq!(first.get(Protocol::Shadowsocks), ["ss://d"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extract_configs("").is_empty());
        assert!(extract_configs("no links here").is_empty());
    }

    #[test]
    fn test_proxies_from_text_and_annotations() {
        let text = format!("join {PROXY} now");
        let span_url = "https://t.me/proxy?server=2.2.2.2&port=80";
        let message = ChannelMessage::new(Utc::now(), format!("{text} {span_url}"))
            .with_link(LinkAnnotation::TextUrl {
                url: "https://t.me/proxy?server=3.3.3.3&port=8443".to_string(),
            })
            .with_link(LinkAnnotation::Url {
                offset: (text.len() + 1) as i32,
                length: span_url.len() as i32,
            });

        let proxies = extract_proxies(&message);
        assert_eq!(
            proxies,
            vec![
                PROXY.to_string(),
                span_url.to_string(),
                "https://t.me/proxy?server=3.3.3.3&port=8443".to_string(),
            ]
        );
    }

    #[test]
    fn test_proxies_are_validated_and_deduplicated() {
        let message = ChannelMessage::new(Utc::now(), format!("{PROXY} https://t.me/proxy?server=1 {PROXY}"))
            .with_link(LinkAnnotation::TextUrl { url: PROXY.to_string() })
            .with_link(LinkAnnotation::TextUrl {
                url: "https://example.com".to_string(),
            });

        assert_eq!(extract_proxies(&message), vec![PROXY.to_string()]);
    }

    #[test]
    fn test_proxy_in_parentheses_stops_at_closing_paren() {
        let message = ChannelMessage::new(Utc::now(), format!("fast one ({PROXY}), enjoy"))
            .with_link(LinkAnnotation::TextUrl { url: PROXY.to_string() });

        assert_eq!(extract_proxies(&message), vec![PROXY.to_string()]);
    }

    #[test]
    fn test_out_of_range_spans_are_skipped() {
        let message = ChannelMessage::new(Utc::now(), "short")
            .with_link(LinkAnnotation::Url { offset: 2, length: 100 })
            .with_link(LinkAnnotation::Url { offset: -1, length: 3 })
            .with_link(LinkAnnotation::Url { offset: 0, length: -5 })
            .with_link(LinkAnnotation::TextUrl { url: PROXY.to_string() });

        assert_eq!(extract_proxies(&message), vec![PROXY.to_string()]);
    }

    #[test]
    fn test_spans_count_utf16_units() {
        let prefix = "🔥 ";
        let text = format!("{prefix}{PROXY}");
        let message = ChannelMessage::new(Utc::now(), text).with_link(LinkAnnotation::Url {
            offset: prefix.encode_utf16().count() as i32,
            length: PROXY.len() as i32,
        });

        assert_eq!(extract_proxies(&message), vec![PROXY.to_string()]);
    }

    #[test]
    fn test_message_without_text_has_no_proxies() {
        let message = ChannelMessage {
            date: Some(Utc::now()),
            text: None,
            links: vec![LinkAnnotation::Url { offset: 0, length: 10 }],
        };
        assert!(extract_proxies(&message).is_empty());
    }
}
