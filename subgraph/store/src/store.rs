use {
    crate::{
        BlockConstraint, BlockNumber, BlockPtr, BlockRange, Entity, EntityFilter, EntityQuery,
        Result, StoreError, Value, query::matches_op,
    },
    async_graphql::Value as GraphqlValue,
    std::{
        collections::{BTreeMap, HashMap},
        pin::Pin,
        sync::Arc,
    },
    subgraph_schema::{ApiSchema, EntitySchema, EntityType},
    tokio::sync::{RwLock, broadcast},
    tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream},
};

/// Capacity of the block notification channel. Slow subscribers skip
/// notifications rather than hold the writer back.
const NOTIFICATION_CAPACITY: usize = 64;

/// A write to the store, applied as part of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOperation {
    Set { entity_type: String, entity: Entity },
    Remove { entity_type: String, id: String },
}

/// One version of an entity and the blocks in which it is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityVersion {
    pub range: BlockRange,
    pub entity: Entity,
}

type Versions = BTreeMap<String, Vec<EntityVersion>>;

#[derive(Default)]
struct StoreState {
    blocks: Vec<BlockPtr>,
    entities: HashMap<String, Versions>,
    has_indexing_errors: bool,
}

/// An in-memory, block-versioned entity store.
#[derive(Clone)]
pub struct MemoryStore {
    deployment: String,
    schema: Arc<ApiSchema>,
    inner: Arc<RwLock<StoreState>>,
    sender: broadcast::Sender<BlockPtr>,
}

impl MemoryStore {
    pub fn new<D>(deployment: D, schema: Arc<ApiSchema>) -> Self
    where
        D: Into<String>,
    {
        let (sender, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        Self {
            deployment: deployment.into(),
            schema,
            inner: Arc::new(RwLock::new(StoreState::default())),
            sender,
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    pub fn schema(&self) -> &Arc<ApiSchema> {
        &self.schema
    }

    fn entity_type(&self, name: &str) -> Result<&EntityType> {
        self.schema
            .entity(name)
            .ok_or_else(|| StoreError::UnknownEntityType(name.to_string()))
    }

    /// Append a block and apply its writes. Either every operation is applied
    /// or none is.
    pub async fn transact_block(&self, ptr: BlockPtr, ops: Vec<EntityOperation>) -> Result<()> {
        let mut state = self.inner.write().await;

        if let Some(latest) = state.blocks.last() {
            if ptr.number <= latest.number {
                return Err(StoreError::BlockOutOfOrder {
                    number: ptr.number,
                    latest: latest.number,
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            block = ptr.number,
            operations = ops.len(),
            "Transacting block"
        );

        // Writes go to copies of the touched histories and are merged once the
        // whole block has been validated.
        let mut staged = HashMap::<(String, String), Vec<EntityVersion>>::new();

        for op in ops {
            match op {
                EntityOperation::Set {
                    entity_type,
                    entity,
                } => {
                    let immutable = self.entity_type(&entity_type)?.immutable;
                    let id = entity.id().ok_or_else(|| StoreError::MissingValue {
                        entity_type: entity_type.clone(),
                        field: "id".to_string(),
                    })?;

                    let versions = staged
                        .entry((entity_type.clone(), id.clone()))
                        .or_insert_with(|| state.history(&entity_type, &id));

                    match versions.last_mut() {
                        Some(live) if live.range.is_open() => {
                            if immutable {
                                return Err(StoreError::ImmutableUpdate { entity_type, id });
                            }

                            if live.range.start == ptr.number {
                                live.entity = entity;
                                continue;
                            }

                            live.range.end = Some(ptr.number);
                        },
                        _ => {},
                    }

                    versions.push(EntityVersion {
                        range: BlockRange::starting_at(ptr.number),
                        entity,
                    });
                },
                EntityOperation::Remove { entity_type, id } => {
                    let immutable = self.entity_type(&entity_type)?.immutable;

                    let versions = staged
                        .entry((entity_type.clone(), id.clone()))
                        .or_insert_with(|| state.history(&entity_type, &id));

                    let Some(live) = versions.last_mut().filter(|live| live.range.is_open()) else {
                        continue;
                    };

                    if immutable {
                        return Err(StoreError::ImmutableUpdate { entity_type, id });
                    }

                    if live.range.start == ptr.number {
                        versions.pop();
                    } else {
                        live.range.end = Some(ptr.number);
                    }
                },
            }
        }

        for ((entity_type, id), versions) in staged {
            let by_id = state.entities.entry(entity_type).or_default();

            if versions.is_empty() {
                by_id.remove(&id);
            } else {
                by_id.insert(id, versions);
            }
        }

        state.blocks.push(ptr.clone());

        drop(state);

        // Sending only fails when nobody is subscribed.
        let _ = self.sender.send(ptr);

        Ok(())
    }

    pub async fn set_indexing_errors(&self, has_indexing_errors: bool) {
        self.inner.write().await.has_indexing_errors = has_indexing_errors;
    }

    pub async fn has_indexing_errors(&self) -> bool {
        self.inner.read().await.has_indexing_errors
    }

    pub async fn latest_block(&self) -> Option<BlockPtr> {
        self.inner.read().await.blocks.last().cloned()
    }

    /// Find the block a query with the given constraint runs against.
    pub async fn resolve_block(&self, constraint: &BlockConstraint) -> Result<BlockPtr> {
        let state = self.inner.read().await;

        let (Some(earliest), Some(latest)) = (state.blocks.first(), state.blocks.last()) else {
            return Err(StoreError::NoBlocks(self.deployment.clone()));
        };

        let not_available = |requested| StoreError::BlockNotAvailable {
            deployment: self.deployment.clone(),
            latest: latest.number,
            requested,
        };

        match constraint {
            BlockConstraint::Latest => Ok(latest.clone()),
            BlockConstraint::Hash(hash) => state
                .blocks
                .iter()
                .find(|block| &block.hash == hash)
                .cloned()
                .ok_or_else(|| StoreError::UnknownBlockHash(format!("0x{}", hex::encode(hash)))),
            BlockConstraint::Number(number) if *number > latest.number => Err(not_available(*number)),
            BlockConstraint::Number(number) if *number < earliest.number => {
                Err(StoreError::BlockBeforeStart {
                    deployment: self.deployment.clone(),
                    earliest: earliest.number,
                    requested: *number,
                })
            },
            BlockConstraint::Number(number) => Ok(state
                .blocks
                .iter()
                .find(|block| block.number == *number)
                .cloned()
                // Blocks without writes are not recorded; the state at such a
                // block is that of the closest earlier one.
                .unwrap_or_else(|| BlockPtr::new(*number, vec![]))),
            BlockConstraint::NumberGte(number) if *number > latest.number => {
                Err(not_available(*number))
            },
            BlockConstraint::NumberGte(_) => Ok(latest.clone()),
        }
    }

    /// The version of an entity live at the block.
    pub async fn find_one(
        &self,
        entity_type: &str,
        id: &str,
        block: BlockNumber,
    ) -> Result<Option<Entity>> {
        self.entity_type(entity_type)?;

        // Ids are stored in their canonical form, e.g. lowercase hex for bytes.
        let kind = self.schema.input().reference_kind(entity_type);
        let id = Value::coerce_scalar(kind, &GraphqlValue::from(id), "id")?.to_string();

        let state = self.inner.read().await;

        Ok(state
            .version_at(entity_type, &id, block)
            .map(|version| version.entity.clone()))
    }

    /// Run a collection query: filter, order, then skip and take.
    pub async fn find(&self, query: EntityQuery) -> Result<Vec<Entity>> {
        let entity_type = self.entity_type(&query.entity_type)?;
        let schema = self.schema.input();

        let state = self.inner.read().await;

        let mut matches = state
            .versions_at(&query.entity_type, query.block)
            .filter(|version| match &query.filter {
                Some(filter) => state.matches(schema, entity_type, version, filter, query.block),
                None => true,
            })
            .map(|version| &version.entity)
            .collect::<Vec<_>>();

        matches.sort_by(|a, b| query.order.compare(a, b));

        Ok(matches
            .into_iter()
            .skip(query.range.skip as usize)
            .take(query.range.first as usize)
            .cloned()
            .collect())
    }

    /// Stream of newly indexed blocks.
    pub fn subscribe(&self) -> Pin<Box<dyn Stream<Item = BlockPtr> + Send + 'static>> {
        let rx = self.sender.subscribe();

        Box::pin(BroadcastStream::new(rx).filter_map(|res| res.ok()))
    }
}

impl StoreState {
    fn history(&self, entity_type: &str, id: &str) -> Vec<EntityVersion> {
        self.entities
            .get(entity_type)
            .and_then(|versions| versions.get(id))
            .cloned()
            .unwrap_or_default()
    }

    fn version_at(&self, entity_type: &str, id: &str, block: BlockNumber) -> Option<&EntityVersion> {
        self.entities
            .get(entity_type)?
            .get(id)?
            .iter()
            .rev()
            .find(|version| version.range.contains(block))
    }

    fn versions_at<'a>(
        &'a self,
        entity_type: &str,
        block: BlockNumber,
    ) -> impl Iterator<Item = &'a EntityVersion> + 'a {
        self.entities
            .get(entity_type)
            .into_iter()
            .flat_map(|versions| versions.values())
            .filter_map(move |versions| {
                versions
                    .iter()
                    .rev()
                    .find(|version| version.range.contains(block))
            })
    }

    fn matches(
        &self,
        schema: &EntitySchema,
        entity_type: &EntityType,
        version: &EntityVersion,
        filter: &EntityFilter,
        block: BlockNumber,
    ) -> bool {
        match filter {
            EntityFilter::And(filters) => filters
                .iter()
                .all(|filter| self.matches(schema, entity_type, version, filter, block)),
            EntityFilter::Or(filters) => filters
                .iter()
                .any(|filter| self.matches(schema, entity_type, version, filter, block)),
            EntityFilter::ChangeBlockGte(number) => version.range.start >= *number,
            EntityFilter::Field { field, op, value } => {
                matches_op(version.entity.value(field), *op, value)
            },
            EntityFilter::Child { field, filter } => {
                let Some(field) = entity_type.field(field) else {
                    return false;
                };

                let Some(target) = schema.entity(&field.ty.name) else {
                    return false;
                };

                let target_matches =
                    |child: &EntityVersion| self.matches(schema, target, child, filter, block);

                if let Some(back_reference) = &field.derived_from {
                    let Some(id) = version.entity.get("id") else {
                        return false;
                    };

                    return self
                        .versions_at(&target.name, block)
                        .filter(|child| references(child.entity.value(back_reference), id))
                        .any(target_matches);
                }

                let ids = match version.entity.value(&field.name) {
                    Value::Null => return false,
                    Value::List(ids) => ids.iter().map(Value::to_string).collect(),
                    id => vec![id.to_string()],
                };

                ids.iter()
                    .filter_map(|id| self.version_at(&target.name, id, block))
                    .any(target_matches)
            },
        }
    }
}

/// Whether a reference attribute, single or list, points at `id`.
fn references(attribute: &Value, id: &Value) -> bool {
    match attribute {
        Value::List(ids) => ids.contains(id),
        attribute => attribute == id,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{EntityOrder, EntityRange, OrderDirection},
        assertor::*,
        bigdecimal::num_bigint::BigInt,
        subgraph_schema::{FilterOp, SchemaOptions},
    };

    const SDL: &str = r#"
        type Partner @entity {
          id: ID!
          name: String!
          vehicles: [Vehicle!]! @derivedFrom(field: "partner")
        }

        type Vehicle @entity {
          id: ID!
          partner: Partner!
          make: String!
          year: BigInt
        }

        type Transfer @entity(immutable: true) {
          id: ID!
          value: BigInt!
        }

        type Account @entity {
          id: Bytes!
          balance: BigInt!
        }
    "#;

    fn block(number: BlockNumber) -> BlockPtr {
        BlockPtr::new(number, vec![number as u8; 4])
    }

    fn partner(id: &str, name: &str) -> EntityOperation {
        EntityOperation::Set {
            entity_type: "Partner".to_string(),
            entity: Entity::new().with("id", id).with("name", name),
        }
    }

    fn vehicle(id: &str, partner: &str, make: &str, year: Option<i64>) -> EntityOperation {
        let entity = Entity::new()
            .with("id", id)
            .with("partner", partner)
            .with("make", make);

        EntityOperation::Set {
            entity_type: "Vehicle".to_string(),
            entity: match year {
                Some(year) => entity.with("year", BigInt::from(year)),
                None => entity,
            },
        }
    }

    async fn store() -> MemoryStore {
        let schema = Arc::new(ApiSchema::parse(SDL, SchemaOptions::default()).unwrap());
        let store = MemoryStore::new("QmTest", schema);

        store
            .transact_block(block(1), vec![
                partner("p1", "Acme Motors"),
                partner("p2", "Volt Fleet"),
                vehicle("v1", "p1", "Tesla", Some(2021)),
                vehicle("v2", "p2", "Rivian", Some(2023)),
            ])
            .await
            .unwrap();

        store
            .transact_block(block(3), vec![
                vehicle("v1", "p1", "Tesla", Some(2022)),
                vehicle("v3", "p1", "Lucid", None),
                EntityOperation::Remove {
                    entity_type: "Vehicle".to_string(),
                    id: "v2".to_string(),
                },
            ])
            .await
            .unwrap();

        store
    }

    fn ids(entities: &[Entity]) -> Vec<String> {
        entities.iter().filter_map(Entity::id).collect()
    }

    #[tokio::test]
    async fn reading_history_by_block() {
        let store = store().await;

        let v1_then = store.find_one("Vehicle", "v1", 2).await.unwrap().unwrap();
        assert_eq!(v1_then.value("year"), &Value::BigInt(BigInt::from(2021)));

        let v1_now = store.find_one("Vehicle", "v1", 3).await.unwrap().unwrap();
        assert_eq!(v1_now.value("year"), &Value::BigInt(BigInt::from(2022)));

        assert_that!(store.find_one("Vehicle", "v2", 2).await.unwrap()).is_some();
        assert_that!(store.find_one("Vehicle", "v2", 3).await.unwrap()).is_none();
        assert_that!(store.find_one("Vehicle", "v3", 1).await.unwrap()).is_none();
    }

    #[tokio::test]
    async fn filtering_ordering_and_paging() {
        let store = store().await;

        let all = store.find(EntityQuery::new("Vehicle", 3)).await.unwrap();
        assert_eq!(ids(&all), vec!["v1", "v3"]);

        let by_year_desc = store
            .find(EntityQuery::new("Vehicle", 1).with_order(EntityOrder {
                field: "year".to_string(),
                direction: OrderDirection::Desc,
            }))
            .await
            .unwrap();
        assert_eq!(ids(&by_year_desc), vec!["v2", "v1"]);

        let paged = store
            .find(EntityQuery::new("Partner", 3).with_range(EntityRange { skip: 1, first: 1 }))
            .await
            .unwrap();
        assert_eq!(ids(&paged), vec!["p2"]);

        let nulls = store
            .find(
                EntityQuery::new("Vehicle", 3)
                    .with_filter(Some(EntityFilter::field("year", FilterOp::Equal, Value::Null))),
            )
            .await
            .unwrap();
        assert_eq!(ids(&nulls), vec!["v3"]);

        let not_tesla = store
            .find(
                EntityQuery::new("Vehicle", 3)
                    .with_filter(Some(EntityFilter::field("make", FilterOp::Not, "Tesla"))),
            )
            .await
            .unwrap();
        assert_eq!(ids(&not_tesla), vec!["v3"]);
    }

    #[tokio::test]
    async fn nested_filters_follow_references_both_ways() {
        let store = store().await;

        let acme_vehicles = store
            .find(EntityQuery::new("Vehicle", 3).with_filter(Some(EntityFilter::child(
                "partner",
                EntityFilter::field("name", FilterOp::StartsWith, "Acme"),
            ))))
            .await
            .unwrap();
        assert_eq!(ids(&acme_vehicles), vec!["v1", "v3"]);

        let partners_with_lucid = store
            .find(EntityQuery::new("Partner", 3).with_filter(Some(EntityFilter::child(
                "vehicles",
                EntityFilter::field("make", FilterOp::Equal, "Lucid"),
            ))))
            .await
            .unwrap();
        assert_eq!(ids(&partners_with_lucid), vec!["p1"]);

        let partners_with_rivian_then = store
            .find(EntityQuery::new("Partner", 1).with_filter(Some(EntityFilter::child(
                "vehicles",
                EntityFilter::field("make", FilterOp::Equal, "Rivian"),
            ))))
            .await
            .unwrap();
        assert_eq!(ids(&partners_with_rivian_then), vec!["p2"]);
    }

    #[tokio::test]
    async fn change_block_filter_matches_recent_writes() {
        let store = store().await;

        let changed = store
            .find(EntityQuery::new("Vehicle", 3).with_filter(Some(EntityFilter::ChangeBlockGte(2))))
            .await
            .unwrap();

        assert_eq!(ids(&changed), vec!["v1", "v3"]);

        let changed = store
            .find(EntityQuery::new("Partner", 3).with_filter(Some(EntityFilter::ChangeBlockGte(2))))
            .await
            .unwrap();

        assert_that!(changed).is_empty();
    }

    #[tokio::test]
    async fn resolving_block_constraints() {
        let store = store().await;

        assert_eq!(
            store.resolve_block(&BlockConstraint::Latest).await.unwrap().number,
            3
        );
        assert_eq!(
            store
                .resolve_block(&BlockConstraint::Hash(vec![1; 4]))
                .await
                .unwrap()
                .number,
            1
        );
        assert_eq!(
            store.resolve_block(&BlockConstraint::Number(2)).await.unwrap().number,
            2
        );
        assert_eq!(
            store.resolve_block(&BlockConstraint::NumberGte(2)).await.unwrap().number,
            3
        );

        let err = store
            .resolve_block(&BlockConstraint::NumberGte(10))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "subgraph `QmTest` has only indexed up to block number 3 and data for block number 10 is therefore not yet available"
        );

        assert!(store.resolve_block(&BlockConstraint::Number(4)).await.is_err());

        let err = store
            .resolve_block(&BlockConstraint::Number(0))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "subgraph `QmTest` starts at block number 1 and has no data for block number 0"
        );
        assert!(
            store
                .resolve_block(&BlockConstraint::Hash(vec![9; 4]))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn blocks_must_advance() {
        let store = store().await;

        assert!(matches!(
            store.transact_block(block(3), vec![]).await,
            Err(StoreError::BlockOutOfOrder { number: 3, latest: 3 })
        ));
    }

    #[tokio::test]
    async fn immutable_entities_reject_updates_atomically() {
        let store = store().await;
        let transfer = |value: i64| EntityOperation::Set {
            entity_type: "Transfer".to_string(),
            entity: Entity::new().with("id", "t1").with("value", BigInt::from(value)),
        };

        store.transact_block(block(4), vec![transfer(1)]).await.unwrap();

        let err = store
            .transact_block(block(5), vec![
                partner("p3", "Late"),
                vehicle("v1", "p2", "Tesla", Some(2024)),
                EntityOperation::Remove {
                    entity_type: "Vehicle".to_string(),
                    id: "v3".to_string(),
                },
                transfer(2),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::ImmutableUpdate { .. }));
        assert_that!(store.find_one("Partner", "p3", 5).await.unwrap()).is_none();
        assert_that!(store.find_one("Vehicle", "v3", 5).await.unwrap()).is_some();

        let v1 = store.find_one("Vehicle", "v1", 5).await.unwrap().unwrap();
        assert_eq!(v1.value("partner"), &Value::from("p1"));
        assert_eq!(v1.value("year"), &Value::BigInt(BigInt::from(2022)));

        let vehicles = store.find(EntityQuery::new("Vehicle", 5)).await.unwrap();
        assert_eq!(ids(&vehicles), vec!["v1", "v3"]);
        assert_eq!(store.latest_block().await.unwrap().number, 4);
    }

    #[tokio::test]
    async fn bytes_ids_are_found_in_any_case() {
        let store = store().await;
        let account = Entity::new()
            .with("id", Value::Bytes(vec![0xab, 0xcd]))
            .with("balance", BigInt::from(10));

        store
            .transact_block(block(4), vec![EntityOperation::Set {
                entity_type: "Account".to_string(),
                entity: account.clone(),
            }])
            .await
            .unwrap();

        for id in ["0xabcd", "0xABCD", "0xAbCd"] {
            assert_eq!(store.find_one("Account", id, 4).await.unwrap(), Some(account.clone()));
        }

        assert!(matches!(
            store.find_one("Account", "abcd", 4).await,
            Err(StoreError::InvalidValue { .. })
        ));
        assert_that!(store.find_one("Vehicle", "V1", 4).await.unwrap()).is_none();
    }

    #[tokio::test]
    async fn subscribers_see_new_blocks() {
        let store = store().await;
        let mut blocks = store.subscribe();

        store.transact_block(block(7), vec![]).await.unwrap();

        assert_eq!(blocks.next().await.map(|ptr| ptr.number), Some(7));
    }
}
