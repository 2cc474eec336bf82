use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::Model;
use crate::database::store::{Document, DocumentStore, GroupCount, Query, StoreError};

/// A typed document together with its server-managed fields.
/// Serializes flat: `{ "id", ...body, "createdAt", "updatedAt" }`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed access to one collection of the document store.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Model> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    fn hydrate(doc: Document) -> Result<Stored<T>, StoreError> {
        let data = serde_json::from_value(doc.data).map_err(|e| StoreError::Corrupt {
            label: T::LABEL,
            id: doc.id,
            message: e.to_string(),
        })?;
        Ok(Stored {
            id: doc.id,
            data,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound {
            label: T::LABEL,
            id: id.to_string(),
        }
    }

    pub async fn insert(&self, data: T) -> Result<Stored<T>, StoreError> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            data: serde_json::to_value(&data)?,
            created_at: now,
            updated_at: now,
        };
        let id = doc.id;
        self.store.insert(T::COLLECTION, doc).await?;
        Ok(Stored {
            id,
            data,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find(&self, query: &Query) -> Result<Vec<Stored<T>>, StoreError> {
        self.store
            .find(T::COLLECTION, query)
            .await?
            .into_iter()
            .map(Self::hydrate)
            .collect()
    }

    pub async fn find_one(&self, query: &Query) -> Result<Option<Stored<T>>, StoreError> {
        let mut docs = self.store.find(T::COLLECTION, query).await?;
        if docs.is_empty() {
            return Ok(None);
        }
        Self::hydrate(docs.swap_remove(0)).map(Some)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Stored<T>>, StoreError> {
        match self.store.find_by_id(T::COLLECTION, id).await? {
            Some(doc) => Self::hydrate(doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_404(&self, id: Uuid) -> Result<Stored<T>, StoreError> {
        self.get(id).await?.ok_or_else(|| Self::not_found(id))
    }

    /// Load, mutate and write back one record without another writer
    /// interleaving. `mutate` returns whether it changed the record; an
    /// error from it aborts the write and is handed back unchanged.
    pub async fn try_modify<E, F>(&self, id: Uuid, mut mutate: F) -> Result<Stored<T>, E>
    where
        E: From<StoreError> + Send,
        F: FnMut(&mut T) -> Result<bool, E> + Send,
    {
        let mut failure: Option<E> = None;
        let mut apply = |data: &mut Value| -> Result<bool, StoreError> {
            let mut record: T = serde_json::from_value(data.clone()).map_err(|e| StoreError::Corrupt {
                label: T::LABEL,
                id,
                message: e.to_string(),
            })?;
            match mutate(&mut record) {
                Ok(true) => {
                    *data = serde_json::to_value(&record)?;
                    Ok(true)
                }
                Ok(false) => Ok(false),
                Err(e) => {
                    failure = Some(e);
                    Ok(false)
                }
            }
        };

        let doc = self
            .store
            .modify(T::COLLECTION, id, Utc::now(), &mut apply)
            .await?;
        if let Some(e) = failure {
            return Err(e);
        }
        let doc = doc.ok_or_else(|| Self::not_found(id))?;
        Ok(Self::hydrate(doc)?)
    }

    pub async fn modify<F>(&self, id: Uuid, mut mutate: F) -> Result<Stored<T>, StoreError>
    where
        F: FnMut(&mut T) -> bool + Send,
    {
        self.try_modify(id, |record| Ok::<_, StoreError>(mutate(record))).await
    }

    pub async fn delete_404(&self, id: Uuid) -> Result<Stored<T>, StoreError> {
        match self.store.delete(T::COLLECTION, id).await? {
            Some(doc) => Self::hydrate(doc),
            None => Err(Self::not_found(id)),
        }
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        self.store.delete_all(T::COLLECTION).await
    }

    pub async fn count(&self, query: &Query) -> Result<i64, StoreError> {
        self.store.count(T::COLLECTION, query).await
    }

    pub async fn count_all(&self) -> Result<i64, StoreError> {
        self.count(&Query::all()).await
    }

    pub async fn group_count(&self, field: &str) -> Result<Vec<GroupCount>, StoreError> {
        self.store.group_count(T::COLLECTION, field).await
    }
}
