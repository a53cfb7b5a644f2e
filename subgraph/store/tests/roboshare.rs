use {
    assertor::*,
    async_graphql::{Name, Value as GraphqlValue},
    subgraph_schema::{FilterOp, ROBOSHARE_SCHEMA},
    subgraph_store::{
        BlockConstraint, Entity, EntityFilter, EntityOrder, EntityQuery, EntitySource, Fixture,
        MemoryStore, OrderDirection, Value, filter_from_input,
    },
};

const ACME: &str = "0xc072907978761c5e6241a7d9881a777365158eba";
const VOLT: &str = "0x1ea728051e8148c2f415fba446715d4d047934d0";

async fn store() -> MemoryStore {
    MemoryStore::from_fixture(ROBOSHARE_SCHEMA.clone(), Fixture::roboshare().unwrap())
        .await
        .unwrap()
}

fn ids(entities: &[Entity]) -> Vec<String> {
    entities.iter().filter_map(Entity::id).collect()
}

fn object<const N: usize>(entries: [(&str, GraphqlValue); N]) -> GraphqlValue {
    GraphqlValue::Object(
        entries
            .into_iter()
            .map(|(key, value)| (Name::new(key), value))
            .collect(),
    )
}

#[tokio::test]
async fn listing_status_follows_the_block() {
    let store = store().await;

    let listing_at = |block| {
        let store = store.clone();
        async move { store.find_one("Listing", "1", block).await.unwrap().unwrap() }
    };

    assert_eq!(listing_at(30).await.value("status"), &Value::from("Active"));
    assert_eq!(listing_at(40).await.value("status"), &Value::from("Purchased"));
    assert_that!(store.find_one("Listing", "1", 20).await.unwrap()).is_none();
}

#[tokio::test]
async fn active_listings_by_price() {
    let store = store().await;
    let entity_type = ROBOSHARE_SCHEMA.entity("Listing").unwrap();

    let filter = filter_from_input(
        entity_type,
        ROBOSHARE_SCHEMA.input(),
        &object([("status", GraphqlValue::Enum(Name::new("Active")))]),
    )
    .unwrap();

    let query = EntityQuery::new("Listing", 40)
        .with_filter(filter)
        .with_order(EntityOrder {
            field: "pricePerToken".to_string(),
            direction: OrderDirection::Desc,
        });

    assert_eq!(ids(&store.find(query.clone()).await.unwrap()), vec!["2"]);

    let mut then = query;
    then.block = 30;
    assert_eq!(ids(&store.find(then).await.unwrap()), vec!["3", "2", "1"]);
}

#[tokio::test]
async fn empty_or_matches_nothing_and_empty_branch_matches_everything() {
    let store = store().await;
    let entity_type = ROBOSHARE_SCHEMA.entity("Listing").unwrap();

    let listings = |input: GraphqlValue| {
        let store = store.clone();
        async move {
            let filter = filter_from_input(entity_type, ROBOSHARE_SCHEMA.input(), &input).unwrap();
            ids(&store.find(EntityQuery::new("Listing", 40).with_filter(filter)).await.unwrap())
        }
    };

    assert_that!(listings(object([("or", GraphqlValue::List(vec![]))])).await).is_empty();
    assert_eq!(
        listings(object([("or", GraphqlValue::List(vec![object([])]))])).await,
        vec!["1", "2", "3"]
    );
    assert_eq!(
        listings(object([(
            "or",
            GraphqlValue::List(vec![
                object([("status", GraphqlValue::Enum(Name::new("Cancelled")))]),
                object([]),
            ])
        )]))
        .await,
        vec!["1", "2", "3"]
    );
}

#[tokio::test]
async fn vehicles_of_authorized_partners() {
    let store = store().await;

    let query = |block| {
        EntityQuery::new("Vehicle", block).with_filter(Some(EntityFilter::child(
            "partner",
            EntityFilter::field("isAuthorized", FilterOp::Equal, true),
        )))
    };

    assert_eq!(ids(&store.find(query(30)).await.unwrap()), vec!["1", "2", "3"]);
    assert_eq!(ids(&store.find(query(40)).await.unwrap()), vec!["1", "2"]);
}

#[tokio::test]
async fn partners_by_vehicle_make() {
    let store = store().await;
    let entity_type = ROBOSHARE_SCHEMA.entity("Partner").unwrap();

    let filter = filter_from_input(
        entity_type,
        ROBOSHARE_SCHEMA.input(),
        &object([(
            "vehicles_",
            object([("make_in", GraphqlValue::List(vec!["Lucid".into(), "Rivian".into()]))]),
        )]),
    )
    .unwrap();

    let mut partners = ids(
        &store
            .find(EntityQuery::new("Partner", 40).with_filter(filter))
            .await
            .unwrap(),
    );
    partners.sort();

    let mut expected = vec![ACME.to_string(), VOLT.to_string()];
    expected.sort();

    assert_eq!(partners, expected);
}

#[tokio::test]
async fn removed_collateral_is_gone_at_later_blocks() {
    let store = store().await;

    let locks = |block| EntityQuery::new("CollateralLock", block);

    assert_eq!(ids(&store.find(locks(30)).await.unwrap()), vec!["1", "2"]);
    assert_eq!(ids(&store.find(locks(40)).await.unwrap()), vec!["1"]);
}

#[tokio::test]
async fn source_reports_the_latest_block() {
    let store = store().await;
    let source: &dyn EntitySource = &store;

    let latest = source.resolve_block(&BlockConstraint::Latest).await.unwrap();

    assert_eq!(latest.number, 40);
    assert_that!(latest.parent_hash).is_some();
    assert_eq!(
        source.deployment(),
        "QmRoboshareSubgraphDemoDeployment0000000000000"
    );
    assert!(!source.has_indexing_errors().await);
}
