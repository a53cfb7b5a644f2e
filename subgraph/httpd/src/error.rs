use {std::io, subgraph_store::StoreError, thiserror::Error};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to assemble the GraphQL schema: {0}")]
    Schema(#[from] async_graphql::dynamic::SchemaError),
}
