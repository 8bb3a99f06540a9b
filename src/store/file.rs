//! File-backed [`TokenStore`] so CLI sessions survive restarts.

// std
use std::{
	fs::{self, File},
	io::{self, ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	store::{StoreError, StoreFuture, TokenStore},
};

#[derive(Serialize, Deserialize)]
struct Snapshot {
	access_token: AccessToken,
}

/// Persists the current token to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<AccessToken>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading an existing token.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		create_parent_dir(&path)?;

		let token = read_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(token)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn write_snapshot(&self, token: &AccessToken) -> Result<(), StoreError> {
		let bytes = serde_json::to_vec_pretty(&Snapshot { access_token: token.clone() })
			.map_err(|e| StoreError::Serialization {
				message: format!("Token snapshot could not be encoded: {e}"),
			})?;
		let staging = self.path.with_extension("tmp");

		create_parent_dir(&self.path)?;

		let mut file = File::create(&staging).map_err(|e| backend("create", &staging, e))?;

		file.write_all(&bytes).map_err(|e| backend("write", &staging, e))?;
		file.sync_all().map_err(|e| backend("sync", &staging, e))?;
		drop(file);

		// Readers only ever see a complete snapshot.
		fs::rename(&staging, &self.path).map_err(|e| backend("replace", &self.path, e))
	}

	fn delete_snapshot(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Err(e) if e.kind() != ErrorKind::NotFound => Err(backend("remove", &self.path, e)),
			_ => Ok(()),
		}
	}
}
impl TokenStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<AccessToken>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn save(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut slot = self.inner.write();

			self.write_snapshot(&token)?;
			*slot = Some(token);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut slot = self.inner.write();

			self.delete_snapshot()?;
			*slot = None;

			Ok(())
		})
	}
}

fn read_snapshot(path: &Path) -> Result<Option<AccessToken>, StoreError> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(backend("read", path, e)),
	};

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(None);
	}

	let snapshot = serde_json::from_slice::<Snapshot>(&bytes).map_err(|e| {
		StoreError::Serialization { message: format!("{} is not a token snapshot: {e}", path.display()) }
	})?;

	Ok(Some(snapshot.access_token))
}

fn create_parent_dir(path: &Path) -> Result<(), StoreError> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() =>
			fs::create_dir_all(parent).map_err(|e| backend("create directory", parent, e)),
		_ => Ok(()),
	}
}

fn backend(action: &str, path: &Path, error: io::Error) -> StoreError {
	StoreError::Backend { message: format!("Could not {action} {}: {error}", path.display()) }
}
