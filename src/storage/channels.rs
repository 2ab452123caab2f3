//! Channel list loading.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ChannelList {
    all_channels: Vec<String>,
}

/// Parses a `{"all_channels": [...]}` document.
pub fn parse_channel_list(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str::<ChannelList>(raw).map(|list| list.all_channels)
}

/// Reads the channel list at `path`.
///
/// A missing file, malformed JSON or a missing `all_channels` key are logged
/// and yield an empty list.
pub async fn load_channel_list(path: &Path) -> Vec<String> {
    let raw = match fs_err::tokio::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("Failed to read channel list: {}", e);
            return Vec::new();
        }
    };

    match parse_channel_list(&raw) {
        Ok(channels) => {
            log::info!("{} channels loaded from {}", channels.len(), path.display());
            channels
        }
        Err(e) => {
            log::error!("Malformed channel list {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_keeps_order() {
        let channels = parse_channel_list(r#"{"all_channels": ["chanA", "@chanB"], "other": 1}"#).unwrap();
        assert_eq!(channels, vec!["chanA".to_string(), "@chanB".to_string()]);
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        assert!(parse_channel_list(r#"{"channels": ["chanA"]}"#).is_err());
        assert!(parse_channel_list("not json").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_channel_list(&dir.path().join("channels.json")).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(&path, "{\"all_channels\": [").unwrap();
        assert!(load_channel_list(&path).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(&path, r#"{"all_channels": ["one", "two"]}"#).unwrap();
        assert_eq!(load_channel_list(&path).await, vec!["one", "two"]);
    }
}
