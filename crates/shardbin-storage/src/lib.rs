//! Backend adapters for committed uploads.
//!
//! Two durable destinations exist for an assembled file: an S3-compatible
//! object store ([`BlobStore`]) and a bot-messaging API used as opportunistic
//! file storage ([`BotRelay`]). Both accept an [`AssembledFile`] and return a
//! [`CommittedFile`] carrying the durable reference key. Dispatch is closed
//! over [`shardbin_core::StorageBackend`] via [`BackendSet`].

pub mod blob;
pub mod relay;
pub mod traits;

pub use blob::BlobStore;
pub use relay::BotRelay;
pub use shardbin_core::StorageBackend;
pub use traits::{AssembledFile, BackendSet, CommittedFile, StorageError, StorageResult};
