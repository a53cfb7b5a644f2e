use {
    crate::{
        context::Context,
        graphql::arguments::{Arguments, ErrorPolicy},
    },
    async_graphql::{Error, Name, Result, Value as GraphqlValue, dynamic::FieldValue},
    subgraph_schema::{EntityField, EntityType, FieldKind, FilterOp, RootField},
    subgraph_store::{
        BlockNumber, BlockPtr, Entity, EntityFilter, EntityQuery, EntityRange, EntitySource,
        Value,
    },
};

/// Message returned instead of data when the subgraph has indexing errors
/// and the query did not opt into partial data.
pub const INDEXING_ERROR: &str = "indexing_error";

// ---------------------------------- parents ----------------------------------

/// An entity, as the parent of its field resolvers. Nested fields are read at
/// the same block as the entity.
pub struct EntityValue {
    pub entity: Entity,
    pub block: BlockNumber,
}

pub struct MetaValue {
    pub block: BlockValue,
    pub deployment: String,
    pub has_indexing_errors: bool,
}

pub struct BlockValue {
    pub ptr: BlockPtr,
    /// Hashes are not reported when the block was requested by number.
    pub hide_hash: bool,
}

fn entity_value<'a>(entity: Entity, block: BlockNumber) -> FieldValue<'a> {
    FieldValue::owned_any(EntityValue { entity, block })
}

fn entity_list<'a>(entities: Vec<Entity>, block: BlockNumber) -> FieldValue<'a> {
    FieldValue::list(
        entities
            .into_iter()
            .map(|entity| entity_value(entity, block)),
    )
}

// ----------------------------------- roots -----------------------------------

/// An owned version of [`RootField`], captured by resolver closures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootQuery {
    Single(String),
    Collection(String),
    Meta,
}

impl From<RootField<'_>> for RootQuery {
    fn from(field: RootField<'_>) -> Self {
        match field {
            RootField::Single(entity) => RootQuery::Single(entity.name.clone()),
            RootField::Collection(entity) => RootQuery::Collection(entity.name.clone()),
            RootField::Meta => RootQuery::Meta,
        }
    }
}

async fn check_error_policy(source: &dyn EntitySource, args: &Arguments) -> Result<()> {
    if args.error_policy()? == ErrorPolicy::Deny && source.has_indexing_errors().await {
        return Err(Error::new(INDEXING_ERROR));
    }

    Ok(())
}

fn entity_type<'s>(context: &'s Context, name: &str) -> Result<&'s EntityType> {
    context
        .schema()
        .entity(name)
        .ok_or_else(|| Error::new(format!("entity type `{name}` is not defined")))
}

/// Resolve a field of `Query` or `Subscription`.
pub async fn resolve_root<'a>(
    context: &Context,
    root: &RootQuery,
    args: &Arguments,
) -> Result<Option<FieldValue<'a>>> {
    let source = context.source.as_ref();

    match root {
        RootQuery::Meta => {
            let constraint = args.block()?;
            let ptr = source.resolve_block(&constraint).await?;

            Ok(Some(FieldValue::owned_any(MetaValue {
                block: BlockValue {
                    ptr,
                    hide_hash: constraint.is_by_number(),
                },
                deployment: source.deployment().to_string(),
                has_indexing_errors: source.has_indexing_errors().await,
            })))
        },
        RootQuery::Single(name) => {
            check_error_policy(source, args).await?;

            let block = source.resolve_block(&args.block()?).await?;
            let entity = source.find_one(name, &args.id()?, block.number).await?;

            Ok(entity.map(|entity| entity_value(entity, block.number)))
        },
        RootQuery::Collection(name) => {
            check_error_policy(source, args).await?;

            let block = source.resolve_block(&args.block()?).await?;
            let entity_type = entity_type(context, name)?;
            let query = collection_query(context, entity_type, args, block.number, None)?;
            let entities = source.find(query).await?;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                entity_type = name,
                block = block.number,
                results = entities.len(),
                "Resolved collection"
            );

            Ok(Some(entity_list(entities, block.number)))
        },
    }
}

/// Build a collection query from the paging, ordering and `where` arguments,
/// narrowed to `scope` when the collection hangs off a parent entity.
fn collection_query(
    context: &Context,
    entity_type: &EntityType,
    args: &Arguments,
    block: BlockNumber,
    scope: Option<EntityFilter>,
) -> Result<EntityQuery> {
    let filter = args.filter(entity_type, context.schema().input())?;

    let filter = match (scope, filter) {
        (Some(scope), Some(filter)) => Some(EntityFilter::And(vec![scope, filter])),
        (scope, filter) => scope.or(filter),
    };

    Ok(EntityQuery::new(&entity_type.name, block)
        .with_filter(filter)
        .with_order(args.order(entity_type)?)
        .with_range(args.range(context.limits)?))
}

// ---------------------------------- entities ---------------------------------

/// Enum attributes are stored as strings and returned as enum values.
fn enum_output(value: &Value) -> GraphqlValue {
    match value {
        Value::String(name) => GraphqlValue::Enum(Name::new(name)),
        Value::List(values) => GraphqlValue::List(values.iter().map(enum_output).collect()),
        other => other.to_graphql(),
    }
}

/// Resolve an attribute of an entity.
pub async fn resolve_entity_field<'a>(
    context: &Context,
    field: &EntityField,
    parent: &EntityValue,
    args: &Arguments,
) -> Result<Option<FieldValue<'a>>> {
    let value = parent.entity.value(&field.name);

    match field.ty.kind {
        FieldKind::Scalar(_) if value.is_null() => Ok(None),
        FieldKind::Scalar(_) => Ok(Some(FieldValue::value(value.to_graphql()))),
        FieldKind::Enum if value.is_null() => Ok(None),
        FieldKind::Enum => Ok(Some(FieldValue::value(enum_output(value)))),
        FieldKind::Entity => resolve_reference(context, field, parent, args).await,
    }
}

async fn resolve_reference<'a>(
    context: &Context,
    field: &EntityField,
    parent: &EntityValue,
    args: &Arguments,
) -> Result<Option<FieldValue<'a>>> {
    let source = context.source.as_ref();
    let target = entity_type(context, &field.ty.name)?;
    let block = parent.block;

    if let Some(back_reference) = &field.derived_from {
        let back_field = target.field(back_reference).ok_or_else(|| {
            Error::new(format!(
                "`{}` has no attribute `{back_reference}`",
                target.name
            ))
        })?;

        let id = parent.entity.value("id").clone();

        let pointing_back = if back_field.ty.list {
            EntityFilter::field(back_reference, FilterOp::Contains, Value::List(vec![id]))
        } else {
            EntityFilter::field(back_reference, FilterOp::Equal, id)
        };

        if field.ty.list {
            let query = collection_query(context, target, args, block, Some(pointing_back))?;

            return Ok(Some(entity_list(source.find(query).await?, block)));
        }

        let query = EntityQuery::new(&target.name, block)
            .with_filter(Some(pointing_back))
            .with_range(EntityRange { skip: 0, first: 1 });

        return Ok(source
            .find(query)
            .await?
            .into_iter()
            .next()
            .map(|entity| entity_value(entity, block)));
    }

    match parent.entity.value(&field.name) {
        Value::Null => Ok(None),
        Value::List(ids) => {
            let by_id = EntityFilter::field("id", FilterOp::In, Value::List(ids.clone()));
            let query = collection_query(context, target, args, block, Some(by_id))?;

            Ok(Some(entity_list(source.find(query).await?, block)))
        },
        id => Ok(source
            .find_one(&target.name, &id.to_string(), block)
            .await?
            .map(|entity| entity_value(entity, block))),
    }
}

// ------------------------------------ meta -----------------------------------

pub fn resolve_meta_field<'a>(field: &str, meta: &MetaValue) -> Option<FieldValue<'a>> {
    match field {
        "block" => Some(FieldValue::owned_any(BlockValue {
            ptr: meta.block.ptr.clone(),
            hide_hash: meta.block.hide_hash,
        })),
        "deployment" => Some(FieldValue::value(meta.deployment.clone())),
        "hasIndexingErrors" => Some(FieldValue::value(meta.has_indexing_errors)),
        _ => None,
    }
}

pub fn resolve_block_field<'a>(field: &str, block: &BlockValue) -> Option<FieldValue<'a>> {
    let hex = |bytes: &Vec<u8>| FieldValue::value(Value::Bytes(bytes.clone()).to_string());

    match field {
        "number" => Some(FieldValue::value(block.ptr.number)),
        "hash" if block.hide_hash => None,
        "hash" => Some(hex(&block.ptr.hash)),
        "parentHash" => block.ptr.parent_hash.as_ref().map(hex),
        "timestamp" => block.ptr.timestamp.map(FieldValue::value),
        _ => None,
    }
}
