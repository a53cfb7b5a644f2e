use {
    assertor::*,
    async_graphql::Value,
    subgraph_schema::{
        ApiDocument, ApiSchema, FieldKind, PROVENANCE_FIELDS, ROBOSHARE_SCHEMA, ROBOSHARE_SDL,
        ScalarKind, SchemaOptions, filter::scalar_ops, validate,
    },
};

const ENTITIES: [&str; 15] = [
    "CollateralLock",
    "Listing",
    "MarketplaceContract",
    "MockUSDCContract",
    "Partner",
    "PartnerManagerContract",
    "RegisteredAssetRouter",
    "RegistryRouterContract",
    "RoboshareToken",
    "RoboshareTokensContract",
    "Transfer",
    "TransferSingleEvent",
    "TreasuryContract",
    "Vehicle",
    "VehicleRegistryContract",
];

#[test]
fn bundled_schema_declares_every_entity() {
    let names = ROBOSHARE_SCHEMA
        .input()
        .entities
        .iter()
        .map(|entity| entity.name.as_str())
        .collect::<Vec<_>>();

    assert_that!(names).is_equal_to(ENTITIES.to_vec());
}

#[test]
fn every_entity_records_provenance() {
    for entity in &ROBOSHARE_SCHEMA.input().entities {
        for name in PROVENANCE_FIELDS {
            let field = entity
                .field(name)
                .unwrap_or_else(|| panic!("`{}` lacks `{name}`", entity.name));

            assert!(!field.ty.nullable, "`{}.{name}` is nullable", entity.name);
        }

        assert_eq!(entity.id_kind(), ScalarKind::Id);
    }
}

#[test]
fn bundled_schema_passes_strict_validation() {
    let strict = ApiSchema::parse(ROBOSHARE_SDL, SchemaOptions::default()).unwrap();

    assert_that!(validate(strict.document())).is_ok();
    assert_eq!(&strict, ROBOSHARE_SCHEMA.as_ref());
}

#[test]
fn filters_carry_exactly_the_operators_of_each_scalar_kind() {
    let document = ROBOSHARE_SCHEMA.document();

    for entity in &ROBOSHARE_SCHEMA.input().entities {
        let filter = document.input_object(&entity.filter_type_name()).unwrap();

        for field in &entity.fields {
            let FieldKind::Scalar(kind) = field.ty.kind else {
                continue;
            };

            if field.ty.list {
                continue;
            }

            // Suffixes of other attributes sharing the prefix never start
            // with `_`.
            let actual = filter
                .fields
                .iter()
                .filter_map(|input| input.name.strip_prefix(field.name.as_str()))
                .filter(|suffix| suffix.is_empty() || suffix.starts_with('_'))
                .collect::<Vec<_>>();

            let expect = scalar_ops(kind)
                .iter()
                .map(|op| op.suffix())
                .collect::<Vec<_>>();

            assert_eq!(actual, expect, "operators of `{}.{}`", entity.name, field.name);
        }
    }
}

#[test]
fn order_by_has_one_value_per_field() {
    let document = ROBOSHARE_SCHEMA.document();

    for entity in &ROBOSHARE_SCHEMA.input().entities {
        let order_by = document.enum_def(&entity.order_by_type_name()).unwrap();

        let values = order_by.value_names().collect::<Vec<_>>();
        let fields = entity
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(values, fields, "`{}`", order_by.name);
    }
}

#[test]
fn list_fields_default_paging_and_share_block_arguments() {
    let document = ROBOSHARE_SCHEMA.document();

    for root in [document.query().unwrap(), document.subscription().unwrap()] {
        let collections = root
            .fields
            .iter()
            .filter(|field| field.ty.to_string().starts_with('['))
            .collect::<Vec<_>>();

        assert_that!(collections).has_length(ENTITIES.len());

        for field in collections {
            let argument = |name: &str| {
                field
                    .get_argument(name)
                    .unwrap_or_else(|| panic!("`{}` lacks `{name}`", field.name))
            };

            assert_eq!(argument("skip").default_value, Some(Value::from(0)));
            assert_eq!(argument("first").default_value, Some(Value::from(100)));
            assert_eq!(argument("block").ty.to_string(), "Block_height");
            assert_eq!(
                argument("subgraphError").ty.to_string(),
                "_SubgraphErrorPolicy_!"
            );
        }
    }
}

#[test]
fn derived_collections_are_queryable_from_the_parent() {
    let vehicle = ROBOSHARE_SCHEMA.document().object("Vehicle").unwrap();
    let listings = vehicle.field("listings").unwrap();

    assert_eq!(listings.ty.to_string(), "[Listing!]!");
    assert_eq!(
        listings.get_argument("where").unwrap().ty.to_string(),
        "Listing_filter"
    );

    let filter = ROBOSHARE_SCHEMA.document().input_object("Vehicle_filter").unwrap();
    assert_that!(filter.field("listings_")).is_some();
    assert_that!(filter.field("listings")).is_none();
}

#[test]
fn sdl_round_trip_is_lossless_and_idempotent() {
    let sdl = ROBOSHARE_SCHEMA.document().to_sdl();
    let parsed = ApiDocument::parse(&sdl).unwrap();

    assert_eq!(&parsed, ROBOSHARE_SCHEMA.document());
    assert_eq!(parsed.to_sdl(), sdl);
}

#[test]
fn plural_root_fields() {
    let query = ROBOSHARE_SCHEMA.document().query().unwrap();

    for name in [
        "collateralLocks",
        "mockUSDCContracts",
        "roboshareTokens",
        "transferSingleEvents",
        "vehicles",
    ] {
        assert_that!(query.field(name)).is_some();
    }
}
