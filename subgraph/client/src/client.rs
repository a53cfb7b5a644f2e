use {
    crate::{BlockHeight, ClientError, GraphqlRequest, Meta, MetaQuery, Result, SubgraphQuery},
    async_trait::async_trait,
    graphql_client::Response,
    serde::de::DeserializeOwned,
    serde_json::Value as JsonValue,
};

/// Sends a GraphQL request somewhere and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Response<JsonValue>>;
}

/// Transport posting requests to a subgraph's HTTP endpoint, e.g.
/// `http://localhost:8000/graphql`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    endpoint: String,
}

impl HttpClient {
    pub fn new<E>(endpoint: E) -> Self
    where
        E: Into<String>,
    {
        Self {
            inner: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Response<JsonValue>> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = %self.endpoint,
            operation = ?request.operation_name,
            "Sending GraphQL request"
        );

        let response = self
            .inner
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response)
    }
}

/// Typed queries over any transport.
#[async_trait]
pub trait SubgraphClient: Transport {
    /// Run the query and return the JSON under its root field.
    async fn query<Q>(&self, query: &Q) -> Result<JsonValue>
    where
        Q: SubgraphQuery + Sync,
    {
        let response = self.execute(&query.to_request()).await?;

        if let Some(errors) = response.errors {
            if !errors.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::warn!(count = errors.len(), "Subgraph returned errors");

                return Err(ClientError::Graphql(errors));
            }
        }

        let mut data = response.data.ok_or(ClientError::MissingData)?;
        let field = query.root_field();

        data.get_mut(&field)
            .map(JsonValue::take)
            .ok_or(ClientError::MissingField(field))
    }

    async fn query_as<Q, T>(&self, query: &Q) -> Result<T>
    where
        Q: SubgraphQuery + Sync,
        T: DeserializeOwned + Send,
    {
        let value = self.query(query).await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn meta(&self, block: Option<BlockHeight>) -> Result<Meta> {
        let query = match block {
            Some(block) => MetaQuery::new().block(block),
            None => MetaQuery::new(),
        };

        self.query_as(&query).await
    }
}

impl<T> SubgraphClient for T where T: Transport + ?Sized {}
