use {
    crate::{
        EntityField, EntitySchema, EntityType, FieldKind, InputObjectDef, InputValueDef,
        ScalarKind, TypeRef,
        builtins::{BLOCK_CHANGED_FILTER, CHANGE_BLOCK_FILTER},
    },
    strum_macros::{EnumIter, IntoStaticStr},
};

/// A comparison operator usable in a `where` clause, identified by the suffix
/// it appends to an attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum FilterOp {
    #[strum(serialize = "")]
    Equal,
    #[strum(serialize = "_not")]
    Not,
    #[strum(serialize = "_gt")]
    Gt,
    #[strum(serialize = "_lt")]
    Lt,
    #[strum(serialize = "_gte")]
    Gte,
    #[strum(serialize = "_lte")]
    Lte,
    #[strum(serialize = "_in")]
    In,
    #[strum(serialize = "_not_in")]
    NotIn,
    #[strum(serialize = "_contains")]
    Contains,
    #[strum(serialize = "_contains_nocase")]
    ContainsNocase,
    #[strum(serialize = "_not_contains")]
    NotContains,
    #[strum(serialize = "_not_contains_nocase")]
    NotContainsNocase,
    #[strum(serialize = "_starts_with")]
    StartsWith,
    #[strum(serialize = "_starts_with_nocase")]
    StartsWithNocase,
    #[strum(serialize = "_not_starts_with")]
    NotStartsWith,
    #[strum(serialize = "_not_starts_with_nocase")]
    NotStartsWithNocase,
    #[strum(serialize = "_ends_with")]
    EndsWith,
    #[strum(serialize = "_ends_with_nocase")]
    EndsWithNocase,
    #[strum(serialize = "_not_ends_with")]
    NotEndsWith,
    #[strum(serialize = "_not_ends_with_nocase")]
    NotEndsWithNocase,
}

use FilterOp::*;

const EQUALITY_OPS: &[FilterOp] = &[Equal, Not, In, NotIn];

const ORDERED_OPS: &[FilterOp] = &[Equal, Not, Gt, Lt, Gte, Lte, In, NotIn];

const BYTES_OPS: &[FilterOp] = &[
    Equal,
    Not,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    Contains,
    NotContains,
];

const STRING_OPS: &[FilterOp] = &[
    Equal,
    Not,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    Contains,
    ContainsNocase,
    NotContains,
    NotContainsNocase,
    StartsWith,
    StartsWithNocase,
    NotStartsWith,
    NotStartsWithNocase,
    EndsWith,
    EndsWithNocase,
    NotEndsWith,
    NotEndsWithNocase,
];

const LIST_OPS: &[FilterOp] = &[
    Equal,
    Not,
    Contains,
    ContainsNocase,
    NotContains,
    NotContainsNocase,
];

impl FilterOp {
    pub fn suffix(self) -> &'static str {
        self.into()
    }

    /// Operators whose value is a list of candidates rather than a single value.
    pub fn takes_list(self) -> bool {
        matches!(self, In | NotIn)
    }

    pub fn is_nocase(self) -> bool {
        matches!(
            self,
            ContainsNocase
                | NotContainsNocase
                | StartsWithNocase
                | NotStartsWithNocase
                | EndsWithNocase
                | NotEndsWithNocase
        )
    }

    /// The operator with the negation stripped, and whether it was negated.
    pub fn positive(self) -> (FilterOp, bool) {
        match self {
            Not => (Equal, true),
            NotIn => (In, true),
            NotContains => (Contains, true),
            NotContainsNocase => (ContainsNocase, true),
            NotStartsWith => (StartsWith, true),
            NotStartsWithNocase => (StartsWithNocase, true),
            NotEndsWith => (EndsWith, true),
            NotEndsWithNocase => (EndsWithNocase, true),
            op => (op, false),
        }
    }
}

/// Operators applicable to a scalar attribute of the given kind.
pub fn scalar_ops(kind: ScalarKind) -> &'static [FilterOp] {
    match kind {
        ScalarKind::String => STRING_OPS,
        ScalarKind::Bytes => BYTES_OPS,
        ScalarKind::Boolean => EQUALITY_OPS,
        ScalarKind::Id
        | ScalarKind::BigInt
        | ScalarKind::BigDecimal
        | ScalarKind::Int
        | ScalarKind::Int8
        | ScalarKind::Timestamp => ORDERED_OPS,
    }
}

/// Operators applicable to an entity attribute. Derived fields have none;
/// they can only be filtered through a nested child filter.
pub fn filter_ops(field: &EntityField, schema: &EntitySchema) -> &'static [FilterOp] {
    if field.is_derived() {
        return &[];
    }

    if field.ty.list {
        return LIST_OPS;
    }

    match field.ty.kind {
        FieldKind::Scalar(kind) => scalar_ops(kind),
        FieldKind::Enum => EQUALITY_OPS,
        FieldKind::Entity => scalar_ops(schema.reference_kind(&field.ty.name)),
    }
}

/// The named type filter values of an attribute are expressed in. References
/// are filtered by the referenced entity's id.
pub fn filter_base_type(field: &EntityField, schema: &EntitySchema) -> String {
    match field.ty.kind {
        FieldKind::Entity => schema.reference_kind(&field.ty.name).name().to_string(),
        _ => field.ty.name.clone(),
    }
}

pub fn filter_value_type(field: &EntityField, op: FilterOp, schema: &EntitySchema) -> TypeRef {
    let base = filter_base_type(field, schema);

    if field.ty.list || op.takes_list() {
        TypeRef::list(TypeRef::named_nn(base))
    } else {
        TypeRef::named(base)
    }
}

/// Derive the `<Entity>_filter` input type.
pub fn filter_input(entity: &EntityType, schema: &EntitySchema) -> InputObjectDef {
    let filter_type = entity.filter_type_name();
    let mut fields = vec![];

    for field in &entity.fields {
        for op in filter_ops(field, schema) {
            fields.push(InputValueDef::new(
                format!("{}{}", field.name, op.suffix()),
                filter_value_type(field, *op, schema),
            ));
        }

        if field.ty.is_entity() {
            fields.push(InputValueDef::new(
                format!("{}_", field.name),
                TypeRef::named(format!("{}_filter", field.ty.name)),
            ));
        }
    }

    fields.push(
        InputValueDef::new(CHANGE_BLOCK_FILTER, TypeRef::named(BLOCK_CHANGED_FILTER))
            .description("Filter for the block changed event."),
    );
    fields.push(InputValueDef::new(
        "and",
        TypeRef::list(TypeRef::named(&filter_type)),
    ));
    fields.push(InputValueDef::new(
        "or",
        TypeRef::list(TypeRef::named(&filter_type)),
    ));

    InputObjectDef {
        name: filter_type,
        description: None,
        fields,
    }
}

/// What a key of a `where` object refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey<'a> {
    Attribute { field: &'a EntityField, op: FilterOp },
    Child { field: &'a EntityField },
    ChangeBlock,
    And,
    Or,
}

impl EntityType {
    /// Resolve a `where` key using the same operator table the filter input
    /// type is derived from.
    pub fn filter_key<'a>(&'a self, key: &str, schema: &EntitySchema) -> Option<FilterKey<'a>> {
        match key {
            CHANGE_BLOCK_FILTER => return Some(FilterKey::ChangeBlock),
            "and" => return Some(FilterKey::And),
            "or" => return Some(FilterKey::Or),
            _ => {},
        }

        if let Some(field) = key
            .strip_suffix('_')
            .and_then(|name| self.field(name))
            .filter(|field| field.ty.is_entity())
        {
            return Some(FilterKey::Child { field });
        }

        self.fields.iter().find_map(|field| {
            let op_suffix = key.strip_prefix(field.name.as_str())?;

            filter_ops(field, schema)
                .iter()
                .find(|op| op.suffix() == op_suffix)
                .map(|op| FilterKey::Attribute { field, op: *op })
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{EntityField, FieldType},
        assertor::*,
        test_case::test_case,
    };

    fn schema() -> EntitySchema {
        EntitySchema {
            entities: vec![
                EntityType::new("Vehicle", vec![
                    EntityField::new("id", FieldType::scalar(ScalarKind::Id).non_null()),
                    EntityField::new("vin", FieldType::scalar(ScalarKind::String).non_null()),
                    EntityField::new("year", FieldType::scalar(ScalarKind::BigInt).non_null()),
                    EntityField::new(
                        "listings",
                        FieldType::entity("Listing").list_of_non_null().non_null(),
                    )
                    .derived_from("vehicle"),
                ]),
                EntityType::new("Listing", vec![
                    EntityField::new("id", FieldType::scalar(ScalarKind::Id).non_null()),
                    EntityField::new("vehicle", FieldType::entity("Vehicle").non_null()),
                    EntityField::new("seller", FieldType::scalar(ScalarKind::Bytes).non_null()),
                    EntityField::new("isActive", FieldType::scalar(ScalarKind::Boolean)),
                    EntityField::new(
                        "tags",
                        FieldType::scalar(ScalarKind::String).list_of_non_null(),
                    ),
                ]),
            ],
            enums: vec![],
        }
    }

    fn field_names(input: &InputObjectDef) -> Vec<&str> {
        input
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect()
    }

    #[test]
    fn string_fields_get_the_contains_family() {
        let schema = schema();
        let input = filter_input(schema.entity("Vehicle").unwrap(), &schema);
        let names = field_names(&input);

        assert_that!(names).contains("vin_contains_nocase");
        assert_that!(names).contains("vin_not_ends_with_nocase");
        assert!(!names.contains(&"year_contains"));
        assert!(!names.contains(&"id_contains"));
        assert!(!names.contains(&"listings"));
        assert_that!(names).contains("listings_");
    }

    #[test]
    fn reference_fields_filter_by_id_and_child() {
        let schema = schema();
        let input = filter_input(schema.entity("Listing").unwrap(), &schema);

        let vehicle_in = input.field("vehicle_in").unwrap();
        assert_eq!(vehicle_in.ty.to_string(), "[String!]");

        let vehicle_starts_with = input.field("vehicle_starts_with").unwrap();
        assert_eq!(vehicle_starts_with.ty.to_string(), "String");

        let child = input.field("vehicle_").unwrap();
        assert_eq!(child.ty.to_string(), "Vehicle_filter");
    }

    #[test]
    fn list_fields_get_list_operators() {
        let schema = schema();
        let input = filter_input(schema.entity("Listing").unwrap(), &schema);

        let tags = input
            .fields
            .iter()
            .filter(|field| field.name.starts_with("tags"))
            .map(|field| (field.name.as_str(), field.ty.to_string()))
            .collect::<Vec<_>>();

        assert_that!(tags).is_equal_to(vec![
            ("tags", "[String!]".to_string()),
            ("tags_not", "[String!]".to_string()),
            ("tags_contains", "[String!]".to_string()),
            ("tags_contains_nocase", "[String!]".to_string()),
            ("tags_not_contains", "[String!]".to_string()),
            ("tags_not_contains_nocase", "[String!]".to_string()),
        ]);
    }

    #[test]
    fn filters_end_with_block_and_boolean_composition() {
        let schema = schema();
        let input = filter_input(schema.entity("Listing").unwrap(), &schema);
        let names = field_names(&input);

        assert_that!(names[names.len() - 3..].to_vec()).is_equal_to(vec![
            "_change_block",
            "and",
            "or",
        ]);
        assert_eq!(
            input.field("and").unwrap().ty.to_string(),
            "[Listing_filter]"
        );
    }

    #[test_case("vin", Some(("vin", Equal)); "bare attribute")]
    #[test_case("vin_not_in", Some(("vin", NotIn)); "negated list operator")]
    #[test_case("year_gte", Some(("year", Gte)); "ordering operator")]
    #[test_case("year_contains", None; "operator not applicable to kind")]
    #[test_case("listings", None; "derived field has no attribute filter")]
    #[test_case("unknown", None; "unknown attribute")]
    fn resolving_attribute_keys(key: &str, expect: Option<(&str, FilterOp)>) {
        let schema = schema();
        let vehicle = schema.entity("Vehicle").unwrap();

        let actual = match vehicle.filter_key(key, &schema) {
            Some(FilterKey::Attribute { field, op }) => Some((field.name.as_str(), op)),
            _ => None,
        };

        assert_eq!(actual, expect);
    }

    #[test]
    fn resolving_structural_keys() {
        let schema = schema();
        let vehicle = schema.entity("Vehicle").unwrap();

        assert_eq!(
            vehicle.filter_key("_change_block", &schema),
            Some(FilterKey::ChangeBlock)
        );
        assert_eq!(vehicle.filter_key("or", &schema), Some(FilterKey::Or));
        assert!(matches!(
            vehicle.filter_key("listings_", &schema),
            Some(FilterKey::Child { field }) if field.name == "listings"
        ));
    }
}
