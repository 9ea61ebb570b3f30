//! # Core Traits (Ports)
//!
//! The narrow contracts the core depends on. Any plugin must implement
//! these traits to be wired into the binary.

use async_trait::async_trait;
use serde_json::Value;

/// Size ceiling for a single asset upload, enforced before any network or
/// filesystem work happens.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Which editable surface an uploaded asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Avatar,
    Background,
    Overlay,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Background => "background",
            Self::Overlay => "overlay",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "avatar" => Some(Self::Avatar),
            "background" => Some(Self::Background),
            "overlay" => Some(Self::Overlay),
            _ => None,
        }
    }
}

/// Persistence gateway for Profile documents, keyed by public name.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    /// Raw stored document, if any. Callers normalize before use.
    async fn get(&self, name: &str) -> anyhow::Result<Option<Value>>;

    /// Merge `partial` onto the stored document: object fields merge
    /// recursively, scalars and arrays replace, absent fields are untouched.
    /// Creates the document when none exists.
    async fn merge_write(&self, name: &str, partial: Value) -> anyhow::Result<()>;

    /// First name bound to `owner_id` by the store's default ordering.
    /// Multiple names per owner are not structurally prevented; callers get
    /// the first match only.
    async fn find_by_owner(&self, owner_id: &str) -> anyhow::Result<Option<String>>;
}

/// Binary asset storage. Only latency, failure and the size limit matter
/// to the core; the URL shape is the adapter's business.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` namespaced by owner and returns its public URL.
    async fn upload(
        &self,
        owner_id: &str,
        kind: AssetKind,
        data: Vec<u8>,
    ) -> anyhow::Result<String>;
}

/// Session identity contract. The core treats owner ids as opaque.
pub trait IdentityProvider: Send + Sync {
    /// Mints a bearer token for an owner id.
    fn issue_token(&self, owner_id: &str) -> String;

    /// Owner id for a presented token, or `None` if the token is invalid.
    fn owner_for_token(&self, token: &str) -> Option<String>;
}
