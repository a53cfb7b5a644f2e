use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error("query failed: {}", messages(.0))]
    Graphql(Vec<graphql_client::Error>),

    #[error("no data returned from query")]
    MissingData,

    #[error("response has no `{0}` field")]
    MissingField(String),
}

fn messages(errors: &[graphql_client::Error]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = core::result::Result<T, ClientError>;
