use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("failed to parse SDL: {0}")]
    Parse(String),

    #[error("type `{name}` is defined more than once")]
    DuplicateType { name: String },

    #[error("directive `@{name}` is defined more than once")]
    DuplicateDirective { name: String },

    #[error("`{member}` is defined more than once on `{owner}`")]
    DuplicateMember { owner: String, member: String },

    #[error("type `{name}` referenced by `{referrer}` is not defined")]
    UnknownType { name: String, referrer: String },

    #[error("object type `{name}` must be annotated with @entity")]
    NotAnEntity { name: String },

    #[error("{kind} definitions are not supported: `{name}`")]
    Unsupported { kind: &'static str, name: String },

    #[error("nested list types are not supported: `{owner}.{field}`")]
    NestedList { owner: String, field: String },

    #[error("entity `{name}` must have a non-null `id` field")]
    MissingId { name: String },

    #[error("`id` of entity `{name}` must be one of ID, String, Bytes or Int8, found `{found}`")]
    InvalidIdType { name: String, found: String },

    #[error("invalid @derivedFrom on `{owner}.{field}`: {reason}")]
    InvalidDerivedFrom {
        owner: String,
        field: String,
        reason: String,
    },

    #[error("`{referrer}` is an input position but `{name}` is an object type")]
    NotAnInputType { name: String, referrer: String },

    #[error("`{referrer}` is an output position but `{name}` is an input object type")]
    NotAnOutputType { name: String, referrer: String },

    #[error("root operation type `{name}` is not an object type defined in the document")]
    MissingRootType { name: String },

    #[error("directive location `{0}` is not supported")]
    UnsupportedDirectiveLocation(String),
}

impl From<async_graphql::parser::Error> for SchemaError {
    fn from(err: async_graphql::parser::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, SchemaError>;
