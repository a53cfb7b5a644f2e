use {
    crate::{BlockPtr, Entity, EntityOperation, MemoryStore, Result, StoreError},
    async_graphql::Value as GraphqlValue,
    serde::Deserialize,
    std::{collections::BTreeMap, path::Path, sync::Arc},
    subgraph_schema::ApiSchema,
};

/// Demo data for the Roboshare subgraph.
pub const ROBOSHARE_FIXTURE: &str = include_str!("../fixtures/roboshare.json");

/// A recorded indexing history: the blocks of a deployment and the entity
/// writes in each of them.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub deployment: String,
    #[serde(default)]
    pub has_indexing_errors: bool,
    pub blocks: Vec<FixtureBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureBlock {
    #[serde(flatten)]
    pub ptr: BlockPtr,
    /// Entities written in the block, by entity type.
    #[serde(default)]
    pub set: BTreeMap<String, Vec<BTreeMap<String, serde_json::Value>>>,
    /// Ids of entities removed in the block, by entity type.
    #[serde(default)]
    pub remove: BTreeMap<String, Vec<String>>,
}

impl Fixture {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn roboshare() -> Result<Self> {
        Self::parse(ROBOSHARE_FIXTURE)
    }
}

impl FixtureBlock {
    fn operations(&self, schema: &ApiSchema) -> Result<Vec<EntityOperation>> {
        let mut ops = vec![];

        for (entity_type, entities) in &self.set {
            let definition = schema
                .entity(entity_type)
                .ok_or_else(|| StoreError::UnknownEntityType(entity_type.clone()))?;

            for attributes in entities {
                let input = attributes
                    .iter()
                    .map(|(name, value)| -> Result<_> {
                        Ok((name.clone(), GraphqlValue::from_json(value.clone())?))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;

                ops.push(EntityOperation::Set {
                    entity_type: entity_type.clone(),
                    entity: Entity::from_input(definition, &input, schema.input())?,
                });
            }
        }

        for (entity_type, ids) in &self.remove {
            ops.extend(ids.iter().map(|id| EntityOperation::Remove {
                entity_type: entity_type.clone(),
                id: id.clone(),
            }));
        }

        Ok(ops)
    }
}

impl MemoryStore {
    /// Create a store and replay the fixture's blocks into it.
    pub async fn from_fixture(schema: Arc<ApiSchema>, fixture: Fixture) -> Result<Self> {
        let store = MemoryStore::new(fixture.deployment, schema.clone());

        for block in fixture.blocks {
            let ops = block.operations(&schema)?;
            store.transact_block(block.ptr, ops).await?;
        }

        store.set_indexing_errors(fixture.has_indexing_errors).await;

        #[cfg(feature = "tracing")]
        tracing::info!(
            deployment = store.deployment(),
            latest_block = store.latest_block().await.map(|ptr| ptr.number),
            "Loaded fixture"
        );

        Ok(store)
    }
}
