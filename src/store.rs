//! Storage contracts and built-in store implementations for issued token records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenRecord};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by token stores.
///
/// Records are keyed by their exposed access token value.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists or replaces a token record.
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()>;

	/// Fetches the record issued under `access_token`, if present.
	fn fetch<'a>(&'a self, access_token: &'a str) -> StoreFuture<'a, Option<TokenRecord>>;

	/// Marks a record as revoked at the provided instant.
	fn revoke<'a>(
		&'a self,
		access_token: &'a str,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<TokenRecord>>;

	/// Drops every record that is expired at `instant`, returning how many were removed.
	fn purge_expired(&self, instant: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
