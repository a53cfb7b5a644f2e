use {subgraph_schema::SchemaError, thiserror::Error};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("entity type `{0}` is not defined")]
    UnknownEntityType(String),

    #[error("`{entity_type}` has no attribute `{field}`")]
    UnknownField { entity_type: String, field: String },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("missing value for non-null attribute `{entity_type}.{field}`")]
    MissingValue { entity_type: String, field: String },

    #[error("entity `{entity_type}` with id `{id}` is immutable and can't be updated or removed")]
    ImmutableUpdate { entity_type: String, id: String },

    #[error("block number {number} must be greater than the latest block {latest}")]
    BlockOutOfOrder { number: i32, latest: i32 },

    #[error("block {0} is not indexed")]
    UnknownBlockHash(String),

    #[error(
        "subgraph `{deployment}` has only indexed up to block number {latest} and data for block number {requested} is therefore not yet available"
    )]
    BlockNotAvailable {
        deployment: String,
        latest: i32,
        requested: i32,
    },

    #[error("subgraph `{0}` has not indexed any block yet")]
    NoBlocks(String),

    #[error(
        "subgraph `{deployment}` starts at block number {earliest} and has no data for block number {requested}"
    )]
    BlockBeforeStart {
        deployment: String,
        earliest: i32,
        requested: i32,
    },

    #[error("filter key `{key}` is not valid for `{entity_type}`")]
    InvalidFilterKey { entity_type: String, key: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

pub type Result<T> = core::result::Result<T, StoreError>;
