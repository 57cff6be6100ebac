use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionHandle, CollectionSchema, EnsuredCollection, IndexConfig};
use crate::schema::sanitize_collection_name;
use crate::store::VectorStore;

/// Creates, describes, drops and lists collections.
#[derive(Clone)]
pub struct CollectionManager {
    store: Arc<dyn VectorStore>,
    index: IndexConfig,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn VectorStore>, index: IndexConfig) -> Self {
        Self { store, index }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn index_config(&self) -> &IndexConfig {
        &self.index
    }

    /// Returns a handle to `name`, creating and indexing it with `schema`
    /// when it does not exist yet.
    ///
    /// An existing collection keeps the schema it was created with.
    pub async fn ensure_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> VectorResult<EnsuredCollection> {
        let name = sanitize_collection_name(name)?;

        if self.store.has_collection(&name).await? {
            return self.existing(name).await;
        }

        if let Err(e) = self.store.create_collection(&name, schema).await {
            // Lost a race with a concurrent ingest of the same dataset.
            if self.store.has_collection(&name).await.unwrap_or(false) {
                return self.existing(name).await;
            }
            return Err(e);
        }

        let vector_field = schema
            .vector_field()
            .ok_or_else(|| VectorError::Validation("schema has no vector field".to_string()))?;

        if let Err(e) = self
            .store
            .create_index(&name, &vector_field.name, &self.index)
            .await
        {
            warn!(collection = %name, error = %e, "Index creation failed, dropping collection");
            if let Err(drop_err) = self.store.drop_collection(&name).await {
                warn!(collection = %name, error = %drop_err, "Failed to drop unindexed collection");
            }
            return Err(e);
        }

        info!(collection = %name, "Collection created and indexed");
        Ok(EnsuredCollection {
            handle: CollectionHandle::new(name, schema.clone()),
            created: true,
        })
    }

    async fn existing(&self, name: String) -> VectorResult<EnsuredCollection> {
        let schema = self.store.describe_collection(&name).await?;
        info!(collection = %name, "Collection already exists");
        Ok(EnsuredCollection {
            handle: CollectionHandle::new(name, schema),
            created: false,
        })
    }

    /// Drops `name`. Returns `false` when no such collection exists.
    pub async fn delete(&self, name: &str) -> VectorResult<bool> {
        let name = sanitize_collection_name(name)?;

        if !self.store.has_collection(&name).await? {
            return Ok(false);
        }

        self.store.drop_collection(&name).await?;
        info!(collection = %name, "Collection deleted");
        Ok(true)
    }

    /// Names of all collections, sorted.
    pub async fn list(&self) -> VectorResult<Vec<String>> {
        let mut names = self.store.list_collections().await?;
        names.sort();
        Ok(names)
    }
}
