//! In-process `ProfileRepo` backed by a concurrent map. Used by tests and
//! as the dev fallback when no database plugin is compiled in. Documents
//! are stored exactly as merged JSON, like any real adapter.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::merge::deep_merge;
use crate::traits::ProfileRepo;

pub struct MemoryProfileRepo {
    docs: DashMap<String, Value>,
}

impl MemoryProfileRepo {
    pub fn new() -> Self {
        Self { docs: DashMap::new() }
    }
}

impl Default for MemoryProfileRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepo for MemoryProfileRepo {
    async fn get(&self, name: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.docs.get(name).map(|doc| doc.value().clone()))
    }

    async fn merge_write(&self, name: &str, partial: Value) -> anyhow::Result<()> {
        let merged = match self.docs.get(name) {
            Some(existing) => deep_merge(existing.value().clone(), partial),
            None => partial,
        };
        self.docs.insert(name.to_string(), merged);
        Ok(())
    }

    async fn find_by_owner(&self, owner_id: &str) -> anyhow::Result<Option<String>> {
        // Default ordering here is lexicographic by name; map iteration
        // order is not stable.
        let mut names: Vec<String> = self
            .docs
            .iter()
            .filter(|entry| {
                entry.value().get("ownerId").and_then(Value::as_str) == Some(owner_id)
            })
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn merge_write_preserves_absent_fields() {
        let repo = MemoryProfileRepo::new();
        repo.merge_write("p", json!({ "displayName": "Jane", "bio": "hi" }))
            .await
            .unwrap();
        repo.merge_write("p", json!({ "bio": "hello" })).await.unwrap();

        let doc = repo.get("p").await.unwrap().unwrap();
        assert_eq!(doc["displayName"], "Jane");
        assert_eq!(doc["bio"], "hello");
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let repo = MemoryProfileRepo::new();
        assert!(repo.get("nope").await.unwrap().is_none());
    }
}
