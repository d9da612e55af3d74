//! Shared staging key layout.
//!
//! Session records live at `upload:{session_id}`; chunk blobs at
//! `chunk:{session_id}:{index}`.

use uuid::Uuid;

/// Staging key for a session record.
pub fn session_key(session_id: Uuid) -> String {
    format!("upload:{}", session_id)
}

/// Staging key for one chunk blob.
pub fn chunk_key(session_id: Uuid, index: u32) -> String {
    format!("chunk:{}:{}", session_id, index)
}

/// Prefix matching every chunk blob of a session.
pub fn chunk_prefix(session_id: Uuid) -> String {
    format!("chunk:{}:", session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        let id = Uuid::nil();
        assert_eq!(
            session_key(id),
            "upload:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            chunk_key(id, 7),
            "chunk:00000000-0000-0000-0000-000000000000:7"
        );
        assert!(chunk_key(id, 7).starts_with(&chunk_prefix(id)));
    }

    #[test]
    fn test_chunk_prefix_does_not_match_sessions() {
        let id = Uuid::new_v4();
        assert!(!session_key(id).starts_with(&chunk_prefix(id)));
    }
}
