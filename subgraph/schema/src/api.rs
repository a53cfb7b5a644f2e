use {
    crate::{
        ApiDocument, EntitySchema, EntityType, EnumDef, EnumValueDef, FieldDef, FieldType,
        InputValueDef, ObjectDef, Result, SchemaOptions, TypeDef, TypeRef,
        builtins::{
            self, DEFAULT_FIRST, DEFAULT_SKIP, META_FIELD, ORDER_DIRECTION, QUERY, SUBSCRIPTION,
        },
        filter::filter_input,
        order_by::order_by_enum,
        validation::validate,
    },
    std::fmt::{self, Formatter},
};

/// What a root field of `Query` or `Subscription` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootField<'a> {
    /// Lookup of a single entity by id.
    Single(&'a EntityType),
    /// Paged, filtered and ordered list of entities.
    Collection(&'a EntityType),
    /// Indexing status of the subgraph.
    Meta,
}

/// A subgraph's entity definitions together with the API derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSchema {
    input: EntitySchema,
    document: ApiDocument,
}

impl ApiSchema {
    /// Derive the public API of the given entities.
    pub fn new(input: EntitySchema) -> Result<Self> {
        let document = derive_document(&input)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            entities = input.entities.len(),
            types = document.types().count(),
            "Derived subgraph API"
        );

        Ok(Self { input, document })
    }

    /// Parse entity SDL, derive the API, and validate the result unless
    /// `options.assume_valid` is set.
    pub fn parse(sdl: &str, options: SchemaOptions) -> Result<Self> {
        let input = EntitySchema::parse(sdl, options)?;
        let schema = Self::new(input)?;

        if !options.assume_valid {
            validate(&schema.document)?;
        }

        Ok(schema)
    }

    pub fn input(&self) -> &EntitySchema {
        &self.input
    }

    pub fn document(&self) -> &ApiDocument {
        &self.document
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.input.entity(name)
    }

    /// Find out what a root field named `name` resolves to. `Query` and
    /// `Subscription` have the same fields.
    pub fn root_field(&self, name: &str) -> Option<RootField<'_>> {
        if name == META_FIELD {
            return Some(RootField::Meta);
        }

        self.input.entities.iter().find_map(|entity| {
            if entity.singular_field_name() == name {
                Some(RootField::Single(entity))
            } else if entity.plural_field_name() == name {
                Some(RootField::Collection(entity))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for ApiSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.document.fmt(f)
    }
}

fn derive_document(input: &EntitySchema) -> Result<ApiDocument> {
    let mut document = ApiDocument::new(QUERY, Some(SUBSCRIPTION.to_string()));

    builtins::add_builtins(&mut document)?;

    for enum_type in &input.enums {
        document.add_type(TypeDef::Enum(EnumDef {
            name: enum_type.name.clone(),
            description: enum_type.description.clone(),
            values: enum_type.values.iter().map(EnumValueDef::new).collect(),
        }))?;
    }

    for entity in &input.entities {
        document.add_type(TypeDef::Object(entity_object(entity)))?;
        document.add_type(TypeDef::InputObject(filter_input(entity, input)))?;
        document.add_type(TypeDef::Enum(order_by_enum(entity)))?;
    }

    for root in [QUERY, SUBSCRIPTION] {
        document.add_type(TypeDef::Object(root_object(root, input)))?;
    }

    Ok(document)
}

/// The type reference an entity field is exposed as.
pub fn field_type_ref(ty: &FieldType) -> TypeRef {
    let named = TypeRef::named(&ty.name);

    let ty_ref = if ty.list {
        TypeRef::list(if ty.item_nullable {
            named
        } else {
            named.non_null()
        })
    } else {
        named
    };

    if ty.nullable {
        ty_ref
    } else {
        ty_ref.non_null()
    }
}

/// `skip`, `first`, `orderBy`, `orderDirection` and `where` for a list of
/// the given entity.
pub fn collection_arguments(entity: &str) -> Vec<InputValueDef> {
    vec![
        InputValueDef::new("skip", TypeRef::named("Int")).default_value(DEFAULT_SKIP),
        InputValueDef::new("first", TypeRef::named("Int")).default_value(DEFAULT_FIRST),
        InputValueDef::new("orderBy", TypeRef::named(format!("{entity}_orderBy"))),
        InputValueDef::new("orderDirection", TypeRef::named(ORDER_DIRECTION)),
        InputValueDef::new("where", TypeRef::named(format!("{entity}_filter"))),
    ]
}

fn entity_object(entity: &EntityType) -> ObjectDef {
    let fields = entity
        .fields
        .iter()
        .map(|field| {
            let mut def = FieldDef::new(&field.name, field_type_ref(&field.ty));

            def.description = field.description.clone();

            if field.ty.list && field.ty.is_entity() {
                def = def.arguments(collection_arguments(&field.ty.name));
            }

            def
        })
        .collect();

    ObjectDef {
        name: entity.name.clone(),
        description: entity.description.clone(),
        fields,
    }
}

fn root_object(name: &str, input: &EntitySchema) -> ObjectDef {
    let mut fields = Vec::with_capacity(input.entities.len() * 2 + 1);

    for entity in &input.entities {
        fields.push(
            FieldDef::new(entity.singular_field_name(), TypeRef::named(&entity.name))
                .argument(InputValueDef::new("id", TypeRef::named_nn("ID")))
                .argument(builtins::block_argument())
                .argument(builtins::error_policy_argument()),
        );

        fields.push(
            FieldDef::new(
                entity.plural_field_name(),
                TypeRef::list(TypeRef::named_nn(&entity.name)).non_null(),
            )
            .arguments(collection_arguments(&entity.name))
            .argument(builtins::block_argument())
            .argument(builtins::error_policy_argument()),
        );
    }

    fields.push(builtins::meta_field());

    ObjectDef {
        name: name.to_string(),
        description: None,
        fields,
    }
}
