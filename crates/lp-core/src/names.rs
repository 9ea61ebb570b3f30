//! # Name Resolution & Uniqueness Protocol
//!
//! Public names are the primary key of the persistence store; this module
//! adds the semantics a plain key-value store does not give you: validity,
//! availability, owner lookup, and the atomic claim that backs every save.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Profile;
use crate::traits::ProfileRepo;

/// Minimum length of a public name.
pub const MIN_NAME_LEN: usize = 3;

/// A name is valid iff it matches `[a-z0-9-]+` and is at least
/// [`MIN_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<()> {
    let well_formed = name.len() >= MIN_NAME_LEN
        && name.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'));
    if well_formed {
        Ok(())
    } else {
        Err(AppError::InvalidName(name.to_string()))
    }
}

/// Advisory availability of a candidate name. `Invalid` is decided before
/// the store is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Availability {
    Available,
    Taken {
        #[serde(rename = "ownerId")]
        owner_id: String,
    },
    Invalid,
}

/// Serializes claims per name so check-then-write is atomic with respect to
/// other claims in this process. The store-level re-read inside the critical
/// section is the compensating pattern for backends without native
/// check-and-set.
pub struct NameRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// A name is available iff no document exists at that key.
    pub async fn check(&self, repo: &dyn ProfileRepo, name: &str) -> Result<Availability> {
        if validate_name(name).is_err() {
            return Ok(Availability::Invalid);
        }
        match repo.get(name).await? {
            Some(doc) => Ok(Availability::Taken {
                owner_id: owner_of(&doc),
            }),
            None => Ok(Availability::Available),
        }
    }

    /// First existing name bound to `owner_id`, used to route "my page"
    /// links. If several names reference the owner this returns the first
    /// match by the store's default ordering only.
    pub async fn resolve_by_owner(
        &self,
        repo: &dyn ProfileRepo,
        owner_id: &str,
    ) -> Result<Option<String>> {
        Ok(repo.find_by_owner(owner_id).await?)
    }

    /// The atomic save path. Re-reads the occupant immediately before
    /// writing; an occupant with a different owner fails with `Conflict`
    /// and nothing is written. The written document always carries the
    /// caller's owner id.
    pub async fn claim(
        &self,
        repo: &dyn ProfileRepo,
        name: &str,
        owner_id: &str,
        profile: &Profile,
    ) -> Result<()> {
        validate_name(name)?;

        let lock = self.lock_for(name);
        let _guard = lock.lock().await;

        // Advisory availability may have gone stale between check and save;
        // only this read, under the lock, authorizes the write.
        if let Some(existing) = repo.get(name).await? {
            let occupant = owner_of(&existing);
            if !occupant.is_empty() && occupant != owner_id {
                return Err(AppError::Conflict(name.to_string()));
            }
        }

        let mut doc = serde_json::to_value(profile)
            .map_err(|e| AppError::Unavailable(e.to_string()))?;
        doc["ownerId"] = Value::String(owner_id.to_string());
        repo.merge_write(name, doc).await?;
        Ok(())
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn owner_of(doc: &Value) -> String {
    doc.get("ownerId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
