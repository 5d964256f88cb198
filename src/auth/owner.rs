//! Resource owner directories consulted before a token is minted.

// crates.io
use argon2::{
	Argon2,
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::RngCore;
// self
use crate::{_prelude::*, auth::Username, store::StoreError};

const SALT_LEN: usize = 16;

/// Boxed future returned by [`OwnerDirectory`] implementations.
pub type OwnerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Checks resource owner credentials.
pub trait OwnerDirectory
where
	Self: Send + Sync,
{
	/// Returns `true` when the password matches the registered owner.
	fn authenticate<'a>(
		&'a self,
		username: &'a Username,
		password: &'a str,
	) -> OwnerFuture<'a, bool>;
}

/// Argon2id hash of an owner's password, kept in PHC string form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);
impl PasswordDigest {
	/// Hashes `password` with a freshly generated salt.
	pub fn generate(password: &str) -> Result<Self, StoreError> {
		let mut bytes = [0_u8; SALT_LEN];

		rand::rng().fill_bytes(&mut bytes);

		let salt = SaltString::encode_b64(&bytes).map_err(|e| StoreError::Backend {
			message: format!("Failed to encode owner password salt: {e}"),
		})?;
		let hash = Argon2::default().hash_password(password.as_bytes(), &salt).map_err(|e| {
			StoreError::Backend { message: format!("Failed to hash owner password: {e}") }
		})?;

		Ok(Self(hash.to_string()))
	}

	/// Returns `true` when `password` matches the stored hash.
	///
	/// A stored value that is not a valid PHC string never matches.
	pub fn verify(&self, password: &str) -> bool {
		let Ok(parsed) = PasswordHash::new(&self.0) else {
			tracing::warn!("Stored owner password hash is not a valid PHC string.");

			return false;
		};

		Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
	}
}
impl Debug for PasswordDigest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PasswordDigest(<redacted>)")
	}
}

/// Thread-safe in-process directory for demos, tests, and single-node deployments.
#[derive(Clone, Debug, Default)]
pub struct MemoryDirectory(Arc<RwLock<HashMap<Username, PasswordDigest>>>);
impl MemoryDirectory {
	/// Registers or replaces an owner.
	pub fn register(&self, username: Username, password: &str) -> Result<(), StoreError> {
		let digest = PasswordDigest::generate(password)?;

		self.0.write().insert(username, digest);

		Ok(())
	}

	/// Removes an owner, returning `true` if one was registered.
	pub fn remove(&self, username: &str) -> bool {
		self.0.write().remove(username).is_some()
	}

	/// Number of registered owners.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no owners are registered.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl OwnerDirectory for MemoryDirectory {
	fn authenticate<'a>(
		&'a self,
		username: &'a Username,
		password: &'a str,
	) -> OwnerFuture<'a, bool> {
		let accepted = self
			.0
			.read()
			.get(username.as_ref())
			.map(|digest| digest.verify(password))
			.unwrap_or(false);

		Box::pin(async move { Ok(accepted) })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	#[test]
	fn digests_are_salted_argon2id_hashes() {
		let first = PasswordDigest::generate("secret").expect("Hashing should succeed.");
		let second = PasswordDigest::generate("secret").expect("Hashing should succeed.");

		assert_ne!(first, second, "Each digest should carry its own salt.");
		assert!(first.0.starts_with("$argon2id$"));
		assert!(first.verify("secret"));
		assert!(!first.verify("Secret"));
		assert!(!first.verify(""));
		assert_eq!(format!("{first:?}"), "PasswordDigest(<redacted>)");
	}

	#[test]
	fn digests_serialize_as_phc_strings() {
		let digest = PasswordDigest::generate("secret").expect("Hashing should succeed.");
		let payload = serde_json::to_string(&digest).expect("Digest should serialize.");
		let restored: PasswordDigest =
			serde_json::from_str(&payload).expect("Digest should deserialize.");

		assert!(payload.starts_with("\"$argon2id$"));
		assert!(restored.verify("secret"));

		let garbage: PasswordDigest =
			serde_json::from_str("\"not-a-phc-string\"").expect("Any string deserializes.");

		assert!(!garbage.verify("not-a-phc-string"));
	}

	#[test]
	fn directory_authenticates_registered_owners() {
		let rt = Runtime::new().expect("Failed to build Tokio runtime for directory test.");
		let directory = MemoryDirectory::default();
		let alice = Username::new("alice").expect("Username fixture should be valid.");
		let bob = Username::new("bob").expect("Username fixture should be valid.");

		directory.register(alice.clone(), "wonderland").expect("Registration should succeed.");

		let check = |owner: &Username, password: &str| {
			rt.block_on(directory.authenticate(owner, password))
				.expect("Memory directory lookups should never fail.")
		};

		assert!(check(&alice, "wonderland"));
		assert!(!check(&alice, "looking-glass"));
		assert!(!check(&bob, "wonderland"));
		assert!(directory.remove("alice"));
		assert!(directory.is_empty());
	}
}
