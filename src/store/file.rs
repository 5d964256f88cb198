//! Simple file-backed [`TokenStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists token records to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, TokenRecord>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		tracing::debug!(path = %path.display(), records = snapshot.len(), "Opened file token store.");

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, TokenRecord>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
		let records: Vec<TokenRecord> = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {} at `{}`: {}", path.display(), e.path(), e.inner()),
			})?;

		Ok(records
			.into_iter()
			.map(|record| (record.access_token.expose().to_owned(), record))
			.collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, TokenRecord>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.values().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenStore for FileStore {
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let key = record.access_token.expose().to_owned();
			let mut guard = self.inner.write();
			let mut staged = guard.clone();

			staged.insert(key, record);
			self.persist_locked(&staged)?;

			*guard = staged;

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, access_token: &'a str) -> StoreFuture<'a, Option<TokenRecord>> {
		Box::pin(async move { Ok(self.inner.read().get(access_token).cloned()) })
	}

	fn revoke<'a>(
		&'a self,
		access_token: &'a str,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<TokenRecord>> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut staged = guard.clone();
			let Some(record) = staged.get_mut(access_token) else {
				return Ok(None);
			};

			record.revoke(instant);

			let revoked = record.clone();

			self.persist_locked(&staged)?;

			*guard = staged;

			Ok(Some(revoked))
		})
	}

	fn purge_expired(&self, instant: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut staged = guard.clone();

			staged.retain(|_, record| record.expires_at > instant);

			let removed = guard.len() - staged.len();

			if removed > 0 {
				self.persist_locked(&staged)?;

				*guard = staged;
			}

			Ok(removed)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::{ScopeList, Username};

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"oauth2_provider_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_record(access: &str, lifetime: Duration) -> TokenRecord {
		let owner = Username::new("alice").expect("Failed to build owner fixture.");
		let scope = ScopeList::parse("read write").expect("Failed to build scope fixture.");

		TokenRecord::builder(owner, scope)
			.access_token(access)
			.issued_at(OffsetDateTime::now_utc() - Duration::hours(2))
			.expires_in(lifetime)
			.build()
			.expect("Failed to build file-store test record.")
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let record = build_record("access-token", Duration::hours(3));
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(record.clone()))
			.expect("Failed to save fixture record to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch("access-token"))
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched.access_token.expose(), record.access_token.expose());
		assert_eq!(fetched.scope, record.scope);
		assert_eq!(fetched.owner, record.owner);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn purge_and_revoke_persist() {
		let path = temp_path("purge");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(build_record("stale", Duration::hours(1))))
			.expect("Failed to save stale record.");
		rt.block_on(store.save(build_record("fresh", Duration::hours(3))))
			.expect("Failed to save fresh record.");

		let removed = rt
			.block_on(store.purge_expired(OffsetDateTime::now_utc()))
			.expect("Purge should succeed.");

		assert_eq!(removed, 1);

		let revoked = rt
			.block_on(store.revoke("fresh", OffsetDateTime::now_utc()))
			.expect("Revoke should succeed.")
			.expect("Fresh record should still exist.");

		assert!(revoked.is_revoked());

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(rt.block_on(reopened.fetch("stale")).expect("Fetch should succeed.").is_none());
		assert!(
			rt.block_on(reopened.fetch("fresh"))
				.expect("Fetch should succeed.")
				.expect("Fresh record should survive reopen.")
				.is_revoked()
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_writes_leave_memory_untouched() {
		let path = temp_path("failed_write");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(build_record("kept", Duration::hours(3))))
			.expect("Failed to save initial record.");
		rt.block_on(store.save(build_record("stale", Duration::hours(1))))
			.expect("Failed to save stale record.");

		let mut tmp_path = path.clone();

		tmp_path.set_extension("tmp");
		// A directory at the staging path makes every persist fail.
		fs::create_dir(&tmp_path).expect("Failed to block the staging path.");

		assert!(rt.block_on(store.save(build_record("lost", Duration::hours(3)))).is_err());
		assert!(rt.block_on(store.fetch("lost")).expect("Fetch should succeed.").is_none());
		assert!(rt.block_on(store.revoke("kept", OffsetDateTime::now_utc())).is_err());
		assert!(
			!rt.block_on(store.fetch("kept"))
				.expect("Fetch should succeed.")
				.expect("Kept record should remain.")
				.is_revoked()
		);
		assert!(rt.block_on(store.purge_expired(OffsetDateTime::now_utc())).is_err());
		assert!(rt.block_on(store.fetch("stale")).expect("Fetch should succeed.").is_some());

		fs::remove_dir(&tmp_path).unwrap_or_else(|e| {
			panic!("Failed to remove blocking directory {}: {e}", tmp_path.display())
		});
		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_reports_path() {
		let path = temp_path("corrupt");

		fs::write(&path, b"[{\"owner\": 7}]").expect("Failed to write corrupt snapshot.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshots must be rejected.");

		match err {
			StoreError::Serialization { message } => assert!(message.contains("[0].owner")),
			other => panic!("Unexpected error: {other:?}"),
		}

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
