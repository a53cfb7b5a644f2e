use {
    assert_json_diff::assert_json_eq,
    assertor::*,
    async_graphql::Variables,
    async_trait::async_trait,
    graphql_client::Response,
    serde::Deserialize,
    serde_json::{Value as JsonValue, json},
    std::sync::Arc,
    subgraph_client::{
        BlockHeight, ClientError, CollectionQuery, EntityQuery, Filter, GraphqlRequest,
        OrderDirection, SubgraphClient, SubgraphErrorPolicy, Transport,
    },
    subgraph_httpd::{
        context::Context,
        graphql::{AppSchema, build_schema},
    },
    subgraph_schema::ROBOSHARE_SCHEMA,
    subgraph_store::{Fixture, MemoryStore},
};

const BLOCK_30_HASH: &str = "0x5416a7e8f7cb6aaaf8f4b87aa4c68ca9dd386a3576ec1724cc1bd4643f2f3af0";

/// Executes requests against the schema directly, without an HTTP server.
struct InProcess(AppSchema);

#[async_trait]
impl Transport for InProcess {
    async fn execute(
        &self,
        request: &GraphqlRequest,
    ) -> subgraph_client::Result<Response<JsonValue>> {
        let mut gql_request = async_graphql::Request::new(request.query.clone()).variables(
            Variables::from_json(JsonValue::Object(request.variables.clone())),
        );

        if let Some(name) = &request.operation_name {
            gql_request = gql_request.operation_name(name.clone());
        }

        let response = self.0.execute(gql_request).await;

        Ok(serde_json::from_value(serde_json::to_value(&response)?)?)
    }
}

async fn setup() -> (MemoryStore, InProcess) {
    let store = MemoryStore::from_fixture(ROBOSHARE_SCHEMA.clone(), Fixture::roboshare().unwrap())
        .await
        .unwrap();
    let schema = build_schema(Context::new(Arc::new(store.clone()))).unwrap();

    (store, InProcess(schema))
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Listing {
    id: String,
    price_per_token: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Partner {
    name: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Vehicle {
    make: String,
    partner: Partner,
}

#[tokio::test]
async fn collection_query_with_variables() {
    let (_, client) = setup().await;

    let query = CollectionQuery::new("Listing")
        .select(["id", "pricePerToken"])
        .order_by("pricePerToken", OrderDirection::Desc)
        .filter(Filter::new().eq("status", "Active"))
        .first(2)
        .block(BlockHeight::Number(30));

    let listings: Vec<Listing> = client.query_as(&query).await.unwrap();

    assert_eq!(listings, vec![
        Listing {
            id: "3".to_string(),
            price_per_token: "260000000".to_string(),
        },
        Listing {
            id: "2".to_string(),
            price_per_token: "120000000".to_string(),
        },
    ]);
}

#[tokio::test]
async fn nested_filters_and_skip() {
    let (_, client) = setup().await;

    let query = CollectionQuery::new("Vehicle")
        .filter(Filter::new().child("partner", Filter::new().eq("isAuthorized", true)))
        .order_by("id", OrderDirection::Asc)
        .skip(1);

    assert_json_eq!(client.query(&query).await.unwrap(), json!([{ "id": "2" }]));
}

#[tokio::test]
async fn entity_query_by_id() {
    let (_, client) = setup().await;

    let vehicle: Option<Vehicle> = client
        .query_as(&EntityQuery::new("Vehicle", "3").select(["make", "partner { name }"]))
        .await
        .unwrap();

    assert_eq!(
        vehicle,
        Some(Vehicle {
            make: "Lucid".to_string(),
            partner: Partner {
                name: "Volt Fleet".to_string(),
            },
        })
    );

    let missing: Option<Vehicle> = client
        .query_as(&EntityQuery::new("Vehicle", "99").select(["make"]))
        .await
        .unwrap();

    assert_that!(missing).is_none();
}

#[tokio::test]
async fn meta_at_a_block_hash() {
    let (_, client) = setup().await;

    let meta = client
        .meta(Some(BlockHeight::Hash(BLOCK_30_HASH.to_string())))
        .await
        .unwrap();

    assert_eq!(meta.deployment, "QmRoboshareSubgraphDemoDeployment0000000000000");
    assert_that!(meta.has_indexing_errors).is_false();
    assert_eq!(meta.block.number, 30);
    assert_eq!(meta.block.hash.as_deref(), Some(BLOCK_30_HASH));
    assert_eq!(meta.block.timestamp, Some(1735689960));

    let latest = client.meta(None).await.unwrap();
    assert_eq!(latest.block.number, 40);
    assert_eq!(latest.block.parent_hash.as_deref(), Some(BLOCK_30_HASH));
}

#[tokio::test]
async fn graphql_errors_are_returned_as_errors() {
    let (store, client) = setup().await;
    store.set_indexing_errors(true).await;

    let query = CollectionQuery::new("Partner").select(["name"]);

    match client.query(&query).await {
        Err(ClientError::Graphql(errors)) => {
            assert_eq!(errors[0].message, "indexing_error");
        },
        other => panic!("expected indexing error, got {other:?}"),
    }

    let allowed = client
        .query(&query.subgraph_error(SubgraphErrorPolicy::Allow))
        .await
        .unwrap();

    assert_that!(allowed.as_array().unwrap().len()).is_equal_to(2);
}
