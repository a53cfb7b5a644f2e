use {
    crate::{
        ApiDocument, DirectiveDef, DirectiveLocation, EnumDef, EnumValueDef, FieldDef,
        InputObjectDef, InputValueDef, ObjectDef, Result, ScalarDef, ScalarKind, TypeDef, TypeRef,
    },
    async_graphql::{Name, Value},
    strum::IntoEnumIterator,
};

pub const QUERY: &str = "Query";
pub const SUBSCRIPTION: &str = "Subscription";
pub const BLOCK_HEIGHT: &str = "Block_height";
pub const BLOCK_CHANGED_FILTER: &str = "BlockChangedFilter";
pub const ERROR_POLICY: &str = "_SubgraphErrorPolicy_";
pub const ORDER_DIRECTION: &str = "OrderDirection";
pub const AGGREGATION_INTERVAL: &str = "Aggregation_interval";
pub const META: &str = "_Meta_";
pub const BLOCK: &str = "_Block_";
pub const META_FIELD: &str = "_meta";
pub const CHANGE_BLOCK_FILTER: &str = "_change_block";

/// Page size used when a collection query does not set `first`.
pub const DEFAULT_FIRST: i32 = 100;

/// Number of entities skipped when a collection query does not set `skip`.
pub const DEFAULT_SKIP: i32 = 0;

pub const BLOCK_ARGUMENT_DESCRIPTION: &str = "The block at which the query should be executed. Can either be a `{ hash: Bytes }` value containing a block hash, a `{ number: Int }` containing the block number, or a `{ number_gte: Int }` containing the minimum block number. In the case of `number_gte`, the query will be executed on the latest block only if the subgraph has progressed to or past the minimum block number. Defaults to the latest block when omitted.";

pub const ERROR_POLICY_ARGUMENT_DESCRIPTION: &str =
    "Set to `allow` to receive data even if the subgraph has skipped over errors while syncing.";

/// Argument selecting the block a query runs against.
pub fn block_argument() -> InputValueDef {
    InputValueDef::new("block", TypeRef::named(BLOCK_HEIGHT)).description(BLOCK_ARGUMENT_DESCRIPTION)
}

/// Argument selecting the partial-failure policy, `deny` unless set.
pub fn error_policy_argument() -> InputValueDef {
    InputValueDef::new("subgraphError", TypeRef::named_nn(ERROR_POLICY))
        .description(ERROR_POLICY_ARGUMENT_DESCRIPTION)
        .default_value(Value::Enum(Name::new("deny")))
}

/// Declare every type and directive the derived API relies on regardless of
/// the entities in the subgraph.
pub fn add_builtins(document: &mut ApiDocument) -> Result<()> {
    for kind in ScalarKind::iter().filter(|kind| !kind.is_graphql_builtin()) {
        document.add_type(TypeDef::Scalar(ScalarDef {
            name: kind.name().to_string(),
            description: scalar_description(kind).map(ToString::to_string),
        }))?;
    }

    document.add_type(TypeDef::Enum(EnumDef {
        name: ORDER_DIRECTION.to_string(),
        description: Some(
            "Defines the order direction, either ascending or descending".to_string(),
        ),
        values: vec![EnumValueDef::new("asc"), EnumValueDef::new("desc")],
    }))?;

    document.add_type(TypeDef::Enum(EnumDef {
        name: AGGREGATION_INTERVAL.to_string(),
        description: None,
        values: vec![EnumValueDef::new("hour"), EnumValueDef::new("day")],
    }))?;

    document.add_type(TypeDef::Enum(EnumDef {
        name: ERROR_POLICY.to_string(),
        description: None,
        values: vec![
            EnumValueDef::new("allow")
                .description("Data will be returned even if the subgraph has indexing errors"),
            EnumValueDef::new("deny").description(
                "If the subgraph has indexing errors, data will be omitted. The default.",
            ),
        ],
    }))?;

    document.add_type(TypeDef::InputObject(InputObjectDef {
        name: BLOCK_CHANGED_FILTER.to_string(),
        description: None,
        fields: vec![InputValueDef::new("number_gte", TypeRef::named_nn("Int"))],
    }))?;

    document.add_type(TypeDef::InputObject(InputObjectDef {
        name: BLOCK_HEIGHT.to_string(),
        description: None,
        fields: vec![
            InputValueDef::new("hash", TypeRef::named("Bytes")),
            InputValueDef::new("number", TypeRef::named("Int")),
            InputValueDef::new("number_gte", TypeRef::named("Int")),
        ],
    }))?;

    document.add_type(TypeDef::Object(ObjectDef {
        name: BLOCK.to_string(),
        description: None,
        fields: vec![
            FieldDef::new("hash", TypeRef::named("Bytes")).description("The hash of the block"),
            FieldDef::new("number", TypeRef::named_nn("Int")).description("The block number"),
            FieldDef::new("timestamp", TypeRef::named("Int"))
                .description("Integer representation of the timestamp stored in blocks for the chain"),
            FieldDef::new("parentHash", TypeRef::named("Bytes"))
                .description("The hash of the parent block"),
        ],
    }))?;

    document.add_type(TypeDef::Object(ObjectDef {
        name: META.to_string(),
        description: Some("The type for the top-level _meta field".to_string()),
        fields: vec![
            FieldDef::new("block", TypeRef::named_nn(BLOCK)).description(
                "Information about a specific subgraph block. The hash of the block\nwill be null if the _meta field has a block constraint that asks for\na block number. It will be filled if the _meta field has no block constraint\nand therefore asks for the latest  block",
            ),
            FieldDef::new("deployment", TypeRef::named_nn("String"))
                .description("The deployment ID"),
            FieldDef::new("hasIndexingErrors", TypeRef::named_nn("Boolean"))
                .description("If `true`, the subgraph encountered indexing errors at some past block"),
        ],
    }))?;

    document.add_directive(DirectiveDef {
        name: "entity".to_string(),
        description: Some(
            "Marks the GraphQL type as indexable entity.  Each type that should be an entity is required to be annotated with this directive.".to_string(),
        ),
        arguments: vec![],
        locations: vec![DirectiveLocation::Object],
    })?;

    document.add_directive(DirectiveDef {
        name: "subgraphId".to_string(),
        description: Some("Defined a Subgraph ID for an object type".to_string()),
        arguments: vec![InputValueDef::new("id", TypeRef::named_nn("String"))],
        locations: vec![DirectiveLocation::Object],
    })?;

    document.add_directive(DirectiveDef {
        name: "derivedFrom".to_string(),
        description: Some(
            "creates a virtual field on the entity that may be queried but cannot be set manually through the mappings API.".to_string(),
        ),
        arguments: vec![InputValueDef::new("field", TypeRef::named_nn("String"))],
        locations: vec![DirectiveLocation::FieldDefinition],
    })?;

    Ok(())
}

fn scalar_description(kind: ScalarKind) -> Option<&'static str> {
    match kind {
        ScalarKind::Int8 => Some("8 bytes signed integer"),
        ScalarKind::Timestamp => Some("A string representation of microseconds UNIX timestamp (16 digits)"),
        _ => None,
    }
}

/// The `_meta` root field.
pub fn meta_field() -> FieldDef {
    FieldDef::new(META_FIELD, TypeRef::named(META))
        .description("Access to subgraph metadata")
        .argument(InputValueDef::new("block", TypeRef::named(BLOCK_HEIGHT)))
}
