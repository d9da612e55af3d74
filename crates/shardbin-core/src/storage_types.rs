use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Durable storage backend for a completed upload.
///
/// Closed set: the completion engine dispatches on this enum, so adding a
/// backend means adding a variant here and an adapter in `shardbin-storage`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible object store (including R2-style endpoints).
    Blob,
    /// Bot-messaging API repurposed as file storage.
    Relay,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blob" => Ok(StorageBackend::Blob),
            "relay" => Ok(StorageBackend::Relay),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Blob => write!(f, "blob"),
            StorageBackend::Relay => write!(f, "relay"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!(
            "blob".parse::<StorageBackend>().unwrap(),
            StorageBackend::Blob
        );
        assert_eq!(
            "Blob".parse::<StorageBackend>().unwrap(),
            StorageBackend::Blob
        );
        assert_eq!(
            "relay".parse::<StorageBackend>().unwrap(),
            StorageBackend::Relay
        );
        assert!("telegram".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&StorageBackend::Blob).unwrap(),
            "\"blob\""
        );
        let parsed: StorageBackend = serde_json::from_str("\"relay\"").unwrap();
        assert_eq!(parsed, StorageBackend::Relay);
    }
}
