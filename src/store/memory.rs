//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	store::{StoreError, StoreFuture, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<String, TokenRecord>>>;

/// Thread-safe storage backend that keeps records in-process.
///
/// Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of records currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when the store holds no records.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: StoreMap, record: TokenRecord) -> Result<(), StoreError> {
		let key = record.access_token.expose().to_owned();

		map.write().insert(key, record);

		Ok(())
	}

	fn revoke_now(map: StoreMap, access_token: &str, instant: OffsetDateTime) -> Option<TokenRecord> {
		let mut guard = map.write();

		match guard.get_mut(access_token) {
			Some(record) => {
				record.revoke(instant);

				Some(record.clone())
			},
			None => None,
		}
	}

	fn purge_now(map: StoreMap, instant: OffsetDateTime) -> usize {
		let mut guard = map.write();
		let before = guard.len();

		guard.retain(|_, record| record.expires_at > instant);

		before - guard.len()
	}
}
impl TokenStore for MemoryStore {
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, record) })
	}

	fn fetch<'a>(&'a self, access_token: &'a str) -> StoreFuture<'a, Option<TokenRecord>> {
		let found = self.0.read().get(access_token).cloned();

		Box::pin(async move { Ok(found) })
	}

	fn revoke<'a>(
		&'a self,
		access_token: &'a str,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<TokenRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::revoke_now(map, access_token, instant)) })
	}

	fn purge_expired(&self, instant: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::purge_now(map, instant)) })
	}
}
