use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{
    is_valid_collection_name, Direction, Document, DocumentStore, GroupCount, Query, SortKey, StoreError,
};

/// In-process store used by the test suite and by development runs without
/// a `DATABASE_URL`. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_name(collection: &str) -> Result<(), StoreError> {
        if is_valid_collection_name(collection) {
            Ok(())
        } else {
            Err(StoreError::InvalidCollection(collection.to_string()))
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, collection: &str) -> Result<(), StoreError> {
        Self::check_name(collection)?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default();
        Ok(())
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<(), StoreError> {
        Self::check_name(collection)?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| query.matches(&d.data)).cloned().collect())
            .unwrap_or_default();

        if !query.sort.is_empty() {
            docs.sort_by(|a, b| {
                for sort in &query.sort {
                    let ordering = match &sort.key {
                        SortKey::Field(field) => compare_values(a.data.get(field), b.data.get(field)),
                        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                    };
                    let ordering = match sort.direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        Ok(docs)
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn modify(
        &self,
        collection: &str,
        id: Uuid,
        updated_at: DateTime<Utc>,
        mutate: &mut (dyn for<'v> FnMut(&'v mut Value) -> Result<bool, StoreError> + Send),
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };
        let mut data = existing.data.clone();
        if mutate(&mut data)? {
            existing.data = data;
            existing.updated_at = updated_at;
        }
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|d| d.id == id)
            .map(|index| docs.remove(index)))
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .map(|docs| docs.drain(..).count())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn count(&self, collection: &str, query: &Query) -> Result<i64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| query.matches(&d.data)).count())
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn group_count(&self, collection: &str, field: &str) -> Result<Vec<GroupCount>, StoreError> {
        let collections = self.collections.read().await;
        let mut groups: HashMap<Option<String>, i64> = HashMap::new();
        for doc in collections.get(collection).into_iter().flatten() {
            let key = match doc.data.get(field) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            };
            *groups.entry(key).or_default() += 1;
        }

        let mut groups: Vec<GroupCount> = groups
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| compare_keys(&a.key, &b.key)));
        Ok(groups)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Ungrouped (null) keys go last, as Postgres orders them ascending.
fn compare_keys(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Missing and null values sort after everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn doc(data: Value, age_secs: i64) -> Document {
        let at = Utc::now() - Duration::seconds(age_secs);
        Document {
            id: Uuid::new_v4(),
            data,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn sorts_by_order_then_newest() {
        let store = MemoryStore::new();
        let old = doc(json!({"title": "old", "order": 1}), 30);
        let new = doc(json!({"title": "new", "order": 1}), 10);
        let first = doc(json!({"title": "first", "order": 0}), 60);
        let unordered = doc(json!({"title": "unordered"}), 0);
        for d in [old, new, first, unordered] {
            store.insert("works", d).await.unwrap();
        }

        let found = store
            .find("works", &Query::all().sort_asc("order").newest_first())
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(|d| d.data["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["first", "new", "old", "unordered"]);
    }

    #[tokio::test]
    async fn modify_and_delete_unknown_ids() {
        let store = MemoryStore::new();
        let d = doc(json!({"title": "x"}), 0);
        let mut rename = |data: &mut Value| {
            data["title"] = json!("y");
            Ok::<_, StoreError>(true)
        };
        assert!(store.modify("courses", d.id, Utc::now(), &mut rename).await.unwrap().is_none());
        assert!(store.delete("courses", d.id).await.unwrap().is_none());

        store.insert("courses", d.clone()).await.unwrap();
        let changed = store.modify("courses", d.id, Utc::now(), &mut rename).await.unwrap().unwrap();
        assert_eq!(changed.data["title"], "y");
        assert!(changed.updated_at > d.updated_at);
        assert_eq!(store.find_by_id("courses", d.id).await.unwrap().unwrap().data["title"], "y");
        assert!(store.delete("courses", d.id).await.unwrap().is_some());
        assert_eq!(store.count("courses", &Query::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn modify_without_change_keeps_timestamp() {
        let store = MemoryStore::new();
        let d = doc(json!({"title": "x"}), 0);
        store.insert("courses", d.clone()).await.unwrap();

        let mut noop = |data: &mut Value| {
            data["title"] = json!("discarded");
            Ok::<_, StoreError>(false)
        };
        let unchanged = store.modify("courses", d.id, Utc::now(), &mut noop).await.unwrap().unwrap();
        assert_eq!(unchanged.data["title"], "x");
        assert_eq!(unchanged.updated_at, d.updated_at);
    }

    #[tokio::test]
    async fn concurrent_modify_keeps_every_append() {
        let store = Arc::new(MemoryStore::new());
        let d = doc(json!({"tags": []}), 0);
        store.insert("works", d.clone()).await.unwrap();
        let id = d.id;

        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut append = |data: &mut Value| {
                        data["tags"].as_array_mut().unwrap().push(json!(n));
                        Ok::<_, StoreError>(true)
                    };
                    store.modify("works", id, Utc::now(), &mut append).await.unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stored = store.find_by_id("works", d.id).await.unwrap().unwrap();
        assert_eq!(stored.data["tags"].as_array().unwrap().len(), 32);
    }

    #[tokio::test]
    async fn group_count_largest_first() {
        let store = MemoryStore::new();
        for level in ["beginner", "advanced", "beginner"] {
            store.insert("courses", doc(json!({"level": level}), 0)).await.unwrap();
        }
        store.insert("courses", doc(json!({}), 0)).await.unwrap();

        let groups = store.group_count("courses", "level").await.unwrap();
        assert_eq!(
            groups[0],
            GroupCount {
                key: Some("beginner".to_string()),
                count: 2
            }
        );
        assert_eq!(groups.len(), 3);
        assert!(groups.contains(&GroupCount { key: None, count: 1 }));
    }

    #[tokio::test]
    async fn group_count_puts_missing_keys_last_on_ties() {
        let store = MemoryStore::new();
        store.insert("contacts", doc(json!({}), 0)).await.unwrap();
        store.insert("contacts", doc(json!({"status": "read"}), 0)).await.unwrap();
        store.insert("contacts", doc(json!({"status": "new"}), 0)).await.unwrap();

        let keys: Vec<_> = store
            .group_count("contacts", "status")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec![Some("new".to_string()), Some("read".to_string()), None]);
    }

    #[tokio::test]
    async fn rejects_bad_collection_names() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.ensure_collection("Bad Name").await,
            Err(StoreError::InvalidCollection(_))
        ));
    }
}
