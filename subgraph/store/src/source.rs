use {
    crate::{BlockConstraint, BlockNumber, BlockPtr, Entity, EntityQuery, MemoryStore, Result},
    async_trait::async_trait,
    std::{pin::Pin, sync::Arc},
    subgraph_schema::ApiSchema,
    tokio_stream::Stream,
};

pub type BlockStream = Pin<Box<dyn Stream<Item = BlockPtr> + Send + 'static>>;

/// Read access to indexed entities, as needed to answer GraphQL queries.
#[async_trait]
pub trait EntitySource: Send + Sync {
    fn schema(&self) -> &Arc<ApiSchema>;

    fn deployment(&self) -> &str;

    async fn latest_block(&self) -> Option<BlockPtr>;

    async fn has_indexing_errors(&self) -> bool;

    async fn resolve_block(&self, constraint: &BlockConstraint) -> Result<BlockPtr>;

    async fn find_one(
        &self,
        entity_type: &str,
        id: &str,
        block: BlockNumber,
    ) -> Result<Option<Entity>>;

    async fn find(&self, query: EntityQuery) -> Result<Vec<Entity>>;

    /// Stream of blocks indexed from now on.
    fn subscribe(&self) -> BlockStream;
}

#[async_trait]
impl EntitySource for MemoryStore {
    fn schema(&self) -> &Arc<ApiSchema> {
        MemoryStore::schema(self)
    }

    fn deployment(&self) -> &str {
        MemoryStore::deployment(self)
    }

    async fn latest_block(&self) -> Option<BlockPtr> {
        MemoryStore::latest_block(self).await
    }

    async fn has_indexing_errors(&self) -> bool {
        MemoryStore::has_indexing_errors(self).await
    }

    async fn resolve_block(&self, constraint: &BlockConstraint) -> Result<BlockPtr> {
        MemoryStore::resolve_block(self, constraint).await
    }

    async fn find_one(
        &self,
        entity_type: &str,
        id: &str,
        block: BlockNumber,
    ) -> Result<Option<Entity>> {
        MemoryStore::find_one(self, entity_type, id, block).await
    }

    async fn find(&self, query: EntityQuery) -> Result<Vec<Entity>> {
        MemoryStore::find(self, query).await
    }

    fn subscribe(&self) -> BlockStream {
        MemoryStore::subscribe(self)
    }
}
