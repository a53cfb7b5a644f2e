use {
    crate::{
        EntityField, EntitySchema, EntityType, EnumType, FieldKind, FieldType, Result, ScalarKind,
        SchemaError, SchemaOptions,
    },
    async_graphql::{
        Value,
        parser::{
            Positioned, parse_schema,
            types::{BaseType, ConstDirective, FieldDefinition, Type, TypeKind, TypeSystemDefinition},
        },
    },
    std::{collections::HashSet, str::FromStr},
};

impl EntitySchema {
    /// Parse the entity definitions of a subgraph.
    ///
    /// Unless `options.assume_valid_sdl` is set, the subgraph-specific rules
    /// (`id` attributes, `@derivedFrom` targets) are checked as well.
    pub fn parse(sdl: &str, options: SchemaOptions) -> Result<Self> {
        let document = parse_schema(sdl)?;

        // Collect names first so fields may reference types declared later.
        let mut entity_names = HashSet::new();
        let mut enum_names = HashSet::new();

        for definition in &document.definitions {
            let TypeSystemDefinition::Type(ty) = definition else {
                continue;
            };

            let name = ty.node.name.node.to_string();
            let clashes_with_scalar = ScalarKind::from_str(&name).is_ok();

            let is_new = match &ty.node.kind {
                TypeKind::Scalar if clashes_with_scalar => continue,
                TypeKind::Scalar => {
                    return Err(SchemaError::Unsupported {
                        kind: "custom scalar",
                        name,
                    });
                },
                TypeKind::Object(_) => {
                    !clashes_with_scalar
                        && !enum_names.contains(&name)
                        && entity_names.insert(name.clone())
                },
                TypeKind::Enum(_) => {
                    !clashes_with_scalar
                        && !entity_names.contains(&name)
                        && enum_names.insert(name.clone())
                },
                TypeKind::Interface(_) => {
                    return Err(SchemaError::Unsupported {
                        kind: "interface",
                        name,
                    });
                },
                TypeKind::Union(_) => {
                    return Err(SchemaError::Unsupported {
                        kind: "union",
                        name,
                    });
                },
                TypeKind::InputObject(_) => {
                    return Err(SchemaError::Unsupported {
                        kind: "input object",
                        name,
                    });
                },
            };

            if !is_new {
                return Err(SchemaError::DuplicateType { name });
            }
        }

        let mut schema = EntitySchema::default();

        for definition in document.definitions {
            let TypeSystemDefinition::Type(ty) = definition else {
                continue;
            };

            let ty = ty.node;
            let name = ty.name.node.to_string();
            let description = ty.description.map(|description| description.node);

            match ty.kind {
                TypeKind::Object(object) => {
                    let Some(entity) = find_directive(&ty.directives, "entity") else {
                        return Err(SchemaError::NotAnEntity { name });
                    };

                    let immutable = matches!(
                        directive_argument(entity, "immutable"),
                        Some(Value::Boolean(true))
                    );

                    let mut fields: Vec<EntityField> = Vec::with_capacity(object.fields.len());

                    for field in object.fields {
                        let field = parse_field(&name, field.node, &entity_names, &enum_names)?;

                        if fields.iter().any(|existing| existing.name == field.name) {
                            return Err(SchemaError::DuplicateMember {
                                owner: name,
                                member: field.name,
                            });
                        }

                        fields.push(field);
                    }

                    schema.entities.push(EntityType {
                        name,
                        description,
                        fields,
                        immutable,
                    });
                },
                TypeKind::Enum(enum_type) => {
                    let mut values: Vec<String> = Vec::with_capacity(enum_type.values.len());

                    for value in enum_type.values {
                        let value = value.node.value.node.to_string();

                        if values.contains(&value) {
                            return Err(SchemaError::DuplicateMember {
                                owner: name,
                                member: value,
                            });
                        }

                        values.push(value);
                    }

                    schema.enums.push(EnumType {
                        name,
                        description,
                        values,
                    });
                },
                _ => {},
            }
        }

        if !options.assume_valid_sdl {
            check_entities(&schema)?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            entities = schema.entities.len(),
            enums = schema.enums.len(),
            "Parsed subgraph entity definitions"
        );

        Ok(schema)
    }
}

fn find_directive<'a>(
    directives: &'a [Positioned<ConstDirective>],
    name: &str,
) -> Option<&'a ConstDirective> {
    directives
        .iter()
        .map(|directive| &directive.node)
        .find(|directive| directive.name.node.as_str() == name)
}

fn directive_argument<'a>(directive: &'a ConstDirective, name: &str) -> Option<&'a Value> {
    directive
        .arguments
        .iter()
        .find(|(argument, _)| argument.node.as_str() == name)
        .map(|(_, value)| &value.node)
}

fn parse_field(
    owner: &str,
    field: FieldDefinition,
    entity_names: &HashSet<String>,
    enum_names: &HashSet<String>,
) -> Result<EntityField> {
    let name = field.name.node.to_string();
    let ty = resolve_type(owner, &name, &field.ty.node, entity_names, enum_names)?;

    let derived_from = match find_directive(&field.directives, "derivedFrom") {
        Some(directive) => match directive_argument(directive, "field") {
            Some(Value::String(target)) => Some(target.clone()),
            _ => {
                return Err(SchemaError::InvalidDerivedFrom {
                    owner: owner.to_string(),
                    field: name,
                    reason: "the `field` argument must be a string".to_string(),
                });
            },
        },
        None => None,
    };

    Ok(EntityField {
        name,
        ty,
        description: field.description.map(|description| description.node),
        derived_from,
    })
}

fn resolve_type(
    owner: &str,
    field: &str,
    ty: &Type,
    entity_names: &HashSet<String>,
    enum_names: &HashSet<String>,
) -> Result<FieldType> {
    let (name, list, item_nullable) = match &ty.base {
        BaseType::Named(name) => (name.to_string(), false, true),
        BaseType::List(inner) => match &inner.base {
            BaseType::Named(name) => (name.to_string(), true, inner.nullable),
            BaseType::List(_) => {
                return Err(SchemaError::NestedList {
                    owner: owner.to_string(),
                    field: field.to_string(),
                });
            },
        },
    };

    let kind = if let Ok(kind) = ScalarKind::from_str(&name) {
        FieldKind::Scalar(kind)
    } else if entity_names.contains(&name) {
        FieldKind::Entity
    } else if enum_names.contains(&name) {
        FieldKind::Enum
    } else {
        return Err(SchemaError::UnknownType {
            name,
            referrer: format!("{owner}.{field}"),
        });
    };

    Ok(FieldType {
        name,
        kind,
        nullable: ty.nullable,
        list,
        item_nullable,
    })
}

/// Subgraph-specific rules on top of plain GraphQL validity.
fn check_entities(schema: &EntitySchema) -> Result<()> {
    for entity in &schema.entities {
        let id = entity
            .field("id")
            .filter(|id| !id.ty.nullable && !id.ty.list)
            .ok_or_else(|| SchemaError::MissingId {
                name: entity.name.clone(),
            })?;

        if !id.ty.scalar_kind().is_some_and(ScalarKind::is_id_kind) {
            return Err(SchemaError::InvalidIdType {
                name: entity.name.clone(),
                found: id.ty.to_string(),
            });
        }

        for field in &entity.fields {
            let Some(target_field) = &field.derived_from else {
                continue;
            };

            let invalid = |reason: String| SchemaError::InvalidDerivedFrom {
                owner: entity.name.clone(),
                field: field.name.clone(),
                reason,
            };

            let Some(target) = schema.entity(&field.ty.name) else {
                return Err(invalid(format!(
                    "`{}` is not an entity type",
                    field.ty.name
                )));
            };

            match target.field(target_field) {
                Some(back_reference) if back_reference.ty.name == entity.name => {},
                Some(_) => {
                    return Err(invalid(format!(
                        "`{}.{target_field}` does not reference `{}`",
                        target.name, entity.name
                    )));
                },
                None => {
                    return Err(invalid(format!(
                        "`{}` has no field `{target_field}`",
                        target.name
                    )));
                },
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, test_case::test_case};

    const SDL: &str = r#"
        enum ListingStatus {
          Open
          Closed
        }

        """A tokenized vehicle"""
        type Vehicle @entity {
          id: ID!
          vin: String!
          listings: [Listing!]! @derivedFrom(field: "vehicle")
        }

        type Listing @entity(immutable: true) {
          id: ID!
          vehicle: Vehicle!
          status: ListingStatus
          tags: [String!]
        }
    "#;

    #[test]
    fn parsing_entities_and_enums() {
        let schema = EntitySchema::parse(SDL, SchemaOptions::default()).unwrap();

        assert_that!(schema.entities).has_length(2);
        assert_that!(schema.enums).has_length(1);

        let vehicle = schema.entity("Vehicle").unwrap();
        assert_eq!(vehicle.description.as_deref(), Some("A tokenized vehicle"));
        assert!(!vehicle.immutable);

        let listings = vehicle.field("listings").unwrap();
        assert_eq!(listings.ty.to_string(), "[Listing!]!");
        assert_eq!(listings.ty.kind, FieldKind::Entity);
        assert_eq!(listings.derived_from.as_deref(), Some("vehicle"));

        let listing = schema.entity("Listing").unwrap();
        assert!(listing.immutable);
        assert_eq!(listing.field("status").unwrap().ty.kind, FieldKind::Enum);
        assert_eq!(
            listing.field("tags").unwrap().ty.kind,
            FieldKind::Scalar(ScalarKind::String)
        );
        assert_eq!(schema.enum_type("ListingStatus").unwrap().values, vec![
            "Open".to_string(),
            "Closed".to_string()
        ]);
    }

    #[test_case(
        "type Vehicle { id: ID! }",
        "object type `Vehicle` must be annotated with @entity";
        "missing entity directive"
    )]
    #[test_case(
        "type Vehicle @entity { id: ID! owner: Owner }",
        "type `Owner` referenced by `Vehicle.owner` is not defined";
        "unknown type"
    )]
    #[test_case(
        "type Vehicle @entity { id: ID! grid: [[Int!]!] }",
        "nested list types are not supported: `Vehicle.grid`";
        "nested list"
    )]
    #[test_case(
        "interface Asset { id: ID! }",
        "interface definitions are not supported: `Asset`";
        "interface"
    )]
    #[test_case(
        "type Vehicle @entity { id: ID! } enum Vehicle { A }",
        "type `Vehicle` is defined more than once";
        "duplicate type"
    )]
    #[test_case(
        "type Vehicle @entity { id: ID! vin: String vin: String }",
        "`vin` is defined more than once on `Vehicle`";
        "duplicate field"
    )]
    #[test_case(
        "type Vehicle @entity { vin: String }",
        "entity `Vehicle` must have a non-null `id` field";
        "missing id"
    )]
    #[test_case(
        "type Vehicle @entity { id: BigInt! }",
        "`id` of entity `Vehicle` must be one of ID, String, Bytes or Int8, found `BigInt!`";
        "invalid id type"
    )]
    #[test_case(
        r#"type Vehicle @entity { id: ID! listings: [Listing!]! @derivedFrom(field: "car") }
           type Listing @entity { id: ID! vehicle: Vehicle! }"#,
        "invalid @derivedFrom on `Vehicle.listings`: `Listing` has no field `car`";
        "derived from unknown field"
    )]
    fn rejecting_invalid_schemas(sdl: &str, expect: &str) {
        let err = EntitySchema::parse(sdl, SchemaOptions::default()).unwrap_err();

        assert_eq!(err.to_string(), expect);
    }

    #[test]
    fn assume_valid_sdl_skips_subgraph_rules() {
        let sdl = "type Vehicle @entity { vin: String }";

        assert!(EntitySchema::parse(sdl, SchemaOptions::default()).is_err());
        assert!(EntitySchema::parse(sdl, SchemaOptions::GENERATED).is_ok());
    }

    #[test]
    fn malformed_sdl_is_a_parse_error() {
        let err = EntitySchema::parse("type {", SchemaOptions::default()).unwrap_err();

        assert!(matches!(err, SchemaError::Parse(_)));
    }
}
