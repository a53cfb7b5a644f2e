use {
    crate::{
        context::Context,
        error::Error,
        graphql::{
            arguments::Arguments,
            resolvers::{
                BlockValue, EntityValue, MetaValue, RootQuery, resolve_block_field,
                resolve_entity_field, resolve_meta_field, resolve_root,
            },
        },
    },
    async_graphql::{
        dynamic::{
            self, Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Object,
            Scalar, Subscription, SubscriptionField, SubscriptionFieldFuture,
        },
        extensions,
    },
    futures::{StreamExt, future, stream},
    std::sync::Arc,
    subgraph_schema::{
        ApiSchema, EnumDef, FieldDef, InputObjectDef, InputValueDef, ObjectDef, ScalarDef,
        TypeDef, TypeRef,
        builtins::{BLOCK, META},
    },
};

pub mod arguments;
pub mod resolvers;

pub type AppSchema = dynamic::Schema;

/// Assemble an executable schema from the API derived for the source's
/// entities.
pub fn build_schema(context: Context) -> Result<AppSchema, Error> {
    let api = context.schema().clone();
    let document = api.document();

    let mut builder = dynamic::Schema::build(
        &document.query_type,
        None,
        document.subscription_type.as_deref(),
    );

    for ty in document.types() {
        builder = match ty {
            TypeDef::Scalar(def) => builder.register(scalar(def)),
            TypeDef::Enum(def) => builder.register(enumeration(def)),
            TypeDef::InputObject(def) => builder.register(input_object(def)),
            TypeDef::Object(def) if Some(&def.name) == document.subscription_type.as_ref() => {
                builder.register(subscription(&api, def))
            },
            TypeDef::Object(def) => builder.register(object(&api, def)),
        };
    }

    let schema = builder
        .extension(extensions::Logger)
        .data(context)
        .finish()?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        entities = api.input().entities.len(),
        "Built executable GraphQL schema"
    );

    Ok(schema)
}

fn type_ref(ty: &TypeRef) -> dynamic::TypeRef {
    match ty {
        TypeRef::Named(name) => dynamic::TypeRef::Named(name.clone().into()),
        TypeRef::List(inner) => dynamic::TypeRef::List(Box::new(type_ref(inner))),
        TypeRef::NonNull(inner) => dynamic::TypeRef::NonNull(Box::new(type_ref(inner))),
    }
}

// ------------------------------- input types ---------------------------------

fn scalar(def: &ScalarDef) -> Scalar {
    let scalar = Scalar::new(&def.name);

    match &def.description {
        Some(description) => scalar.description(description),
        None => scalar,
    }
}

fn enumeration(def: &EnumDef) -> Enum {
    let mut enumeration = Enum::new(&def.name);

    if let Some(description) = &def.description {
        enumeration = enumeration.description(description);
    }

    for value in &def.values {
        let item = EnumItem::new(&value.name);

        enumeration = enumeration.item(match &value.description {
            Some(description) => item.description(description),
            None => item,
        });
    }

    enumeration
}

fn input_value(def: &InputValueDef) -> InputValue {
    let mut input = InputValue::new(&def.name, type_ref(&def.ty));

    if let Some(description) = &def.description {
        input = input.description(description);
    }

    if let Some(default_value) = &def.default_value {
        input = input.default_value(default_value.clone());
    }

    input
}

fn input_object(def: &InputObjectDef) -> InputObject {
    let mut input = InputObject::new(&def.name);

    if let Some(description) = &def.description {
        input = input.description(description);
    }

    for field in &def.fields {
        input = input.field(input_value(field));
    }

    input
}

// ------------------------------- output types --------------------------------

fn with_arguments(mut field: Field, def: &FieldDef) -> Field {
    if let Some(description) = &def.description {
        field = field.description(description);
    }

    for argument in &def.arguments {
        field = field.argument(input_value(argument));
    }

    field
}

fn object(api: &ApiSchema, def: &ObjectDef) -> Object {
    let mut object = Object::new(&def.name);

    if let Some(description) = &def.description {
        object = object.description(description);
    }

    for field_def in &def.fields {
        let field = if def.name == api.document().query_type {
            root_field(api, field_def)
        } else if def.name == META {
            meta_field(field_def)
        } else if def.name == BLOCK {
            block_field(field_def)
        } else {
            entity_field(api, def, field_def)
        };

        if let Some(field) = field {
            object = object.field(with_arguments(field, field_def));
        }
    }

    object
}

fn root_field(api: &ApiSchema, def: &FieldDef) -> Option<Field> {
    let root = Arc::new(RootQuery::from(api.root_field(&def.name)?));

    Some(Field::new(&def.name, type_ref(&def.ty), move |ctx| {
        let root = root.clone();

        FieldFuture::new(async move {
            let context = ctx.data::<Context>()?;
            let args = Arguments::from_accessor(&ctx.args);

            resolve_root(context, &root, &args).await
        })
    }))
}

fn entity_field(api: &ApiSchema, object: &ObjectDef, def: &FieldDef) -> Option<Field> {
    let field = Arc::new(api.entity(&object.name)?.field(&def.name)?.clone());

    Some(Field::new(&def.name, type_ref(&def.ty), move |ctx| {
        let field = field.clone();

        FieldFuture::new(async move {
            let context = ctx.data::<Context>()?;
            let parent = ctx.parent_value.try_downcast_ref::<EntityValue>()?;
            let args = Arguments::from_accessor(&ctx.args);

            resolve_entity_field(context, &field, parent, &args).await
        })
    }))
}

fn meta_field(def: &FieldDef) -> Option<Field> {
    let name = def.name.clone();

    Some(Field::new(&def.name, type_ref(&def.ty), move |ctx| {
        let name = name.clone();

        FieldFuture::new(async move {
            let meta = ctx.parent_value.try_downcast_ref::<MetaValue>()?;

            Ok(resolve_meta_field(&name, meta))
        })
    }))
}

fn block_field(def: &FieldDef) -> Option<Field> {
    let name = def.name.clone();

    Some(Field::new(&def.name, type_ref(&def.ty), move |ctx| {
        let name = name.clone();

        FieldFuture::new(async move {
            let block = ctx.parent_value.try_downcast_ref::<BlockValue>()?;

            Ok(resolve_block_field(&name, block))
        })
    }))
}

// ------------------------------- subscriptions -------------------------------

/// Subscription fields mirror the query fields. Each yields its result right
/// away and again whenever a block is indexed.
fn subscription(api: &ApiSchema, def: &ObjectDef) -> Subscription {
    let mut subscription = Subscription::new(&def.name);

    if let Some(description) = &def.description {
        subscription = subscription.description(description);
    }

    for field_def in &def.fields {
        let Some(root) = api.root_field(&field_def.name).map(RootQuery::from) else {
            continue;
        };

        let root = Arc::new(root);

        let mut field = SubscriptionField::new(&field_def.name, type_ref(&field_def.ty), move |ctx| {
            let root = root.clone();

            SubscriptionFieldFuture::new(async move {
                let context = ctx.data::<Context>()?.clone();
                let args = Arguments::from_accessor(&ctx.args);
                let blocks = context.source.subscribe();

                Ok(stream::once(future::ready(()))
                    .chain(blocks.map(|_| ()))
                    .then(move |_| {
                        let context = context.clone();
                        let root = root.clone();
                        let args = args.clone();

                        async move {
                            let value = resolve_root(&context, &root, &args).await?;

                            Ok::<_, async_graphql::Error>(value.unwrap_or(FieldValue::NULL))
                        }
                    }))
            })
        });

        if let Some(description) = &field_def.description {
            field = field.description(description);
        }

        for argument in &field_def.arguments {
            field = field.argument(input_value(argument));
        }

        subscription = subscription.field(field);
    }

    subscription
}
