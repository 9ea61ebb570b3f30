//! # lp-storage-local
//!
//! Local filesystem implementation of `BlobStore`.
//! Features: content-addressable storage, per-owner namespacing, and
//! directory sharding so one directory never collects millions of files.

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;

use lp_core::traits::{AssetKind, BlobStore, MAX_UPLOAD_BYTES};

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g. "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g. "/static/uploads")
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root_path: root, url_prefix }
    }

    /// Relative location: "<owner>/ab/cd/<kind>_<hash>"
    fn relative_path(owner_id: &str, kind: AssetKind, hash: &str) -> String {
        format!(
            "{}/{}/{}/{}_{}",
            owner_id,
            &hash[0..2],
            &hash[2..4],
            kind.as_str(),
            hash
        )
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    /// Saves an upload under its SHA-256 hash. Identical bytes re-uploaded
    /// by the same owner land on the same file.
    async fn upload(
        &self,
        owner_id: &str,
        kind: AssetKind,
        data: Vec<u8>,
    ) -> anyhow::Result<String> {
        if data.len() > MAX_UPLOAD_BYTES {
            anyhow::bail!(
                "upload of {} bytes exceeds the {} byte limit",
                data.len(),
                MAX_UPLOAD_BYTES
            );
        }

        // 1. Sanity-decode: only real images are ever served back.
        image::io::Reader::new(Cursor::new(&data))
            .with_guessed_format()?
            .decode()
            .map_err(|err| anyhow::anyhow!("not a decodable image: {err}"))?;

        // 2. Content address.
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());

        let rel = Self::relative_path(owner_id, kind, &hash);
        let target = self.root_path.join(&rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        // 3. Write once; identical content already on disk is left alone.
        if fs::try_exists(&target).await? {
            return Ok(format!("{}/{}", self.url_prefix, rel));
        }
        fs::write(&target, &data).await?;

        Ok(format!("{}/{}", self.url_prefix, rel))
    }
}
