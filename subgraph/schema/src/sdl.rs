use {
    crate::{
        ApiDocument, DirectiveDef, DirectiveLocation, EnumDef, EnumValueDef, FieldDef,
        InputObjectDef, InputValueDef, ObjectDef, Result, ScalarDef, SchemaError, TypeDef, TypeRef,
        builtins::QUERY,
    },
    async_graphql::parser::{
        Positioned, parse_schema,
        types::{self, BaseType, TypeKind, TypeSystemDefinition},
    },
    itertools::Itertools,
    std::fmt::{self, Formatter, Write},
};

// ---------------------------------- printing ---------------------------------

impl ApiDocument {
    /// Print the document as SDL: the schema definition, then directives,
    /// then every type sorted by name.
    pub fn to_sdl(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ApiDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "schema {{")?;
        writeln!(f, "  query: {}", self.query_type)?;
        if let Some(subscription) = &self.subscription_type {
            writeln!(f, "  subscription: {subscription}")?;
        }
        writeln!(f, "}}")?;

        for directive in &self.directives {
            writeln!(f)?;
            write_directive(f, directive)?;
        }

        for ty in self.types() {
            writeln!(f)?;
            write_type(f, ty)?;
        }

        Ok(())
    }
}

fn write_description(f: &mut Formatter<'_>, description: Option<&str>, indent: &str) -> fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };

    // Block strings drop leading and trailing blank space, so such text is
    // written as an escaped string instead.
    if description.starts_with(char::is_whitespace)
        || description.ends_with(char::is_whitespace)
        || description.contains('\r')
    {
        return writeln!(f, "{indent}{}", async_graphql::Value::from(description));
    }

    let escaped = description.replace(r#"""""#, r#"\""""#);

    let fits_on_one_line = !escaped.contains('\n') && !escaped.ends_with('"');

    if fits_on_one_line {
        return writeln!(f, r#"{indent}"""{escaped}""""#);
    }

    writeln!(f, r#"{indent}""""#)?;
    for line in escaped.lines() {
        if line.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "{indent}{line}")?;
        }
    }
    writeln!(f, r#"{indent}""""#)
}

fn write_input_value(f: &mut Formatter<'_>, value: &InputValueDef) -> fmt::Result {
    write!(f, "{}: {}", value.name, value.ty)?;

    if let Some(default_value) = &value.default_value {
        write!(f, " = {default_value}")?;
    }

    Ok(())
}

/// Arguments go on one line unless one of them is documented.
fn write_arguments(f: &mut Formatter<'_>, arguments: &[InputValueDef], indent: &str) -> fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }

    if arguments.iter().all(|argument| argument.description.is_none()) {
        f.write_char('(')?;
        for (idx, argument) in arguments.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write_input_value(f, argument)?;
        }
        return f.write_char(')');
    }

    let inner = format!("{indent}  ");

    writeln!(f, "(")?;
    for argument in arguments {
        write_description(f, argument.description.as_deref(), &inner)?;
        f.write_str(&inner)?;
        write_input_value(f, argument)?;
        writeln!(f)?;
    }
    write!(f, "{indent})")
}

fn write_directive(f: &mut Formatter<'_>, directive: &DirectiveDef) -> fmt::Result {
    write_description(f, directive.description.as_deref(), "")?;
    write!(f, "directive @{}", directive.name)?;
    write_arguments(f, &directive.arguments, "")?;
    writeln!(f, " on {}", directive.locations.iter().join(" | "))
}

fn write_type(f: &mut Formatter<'_>, ty: &TypeDef) -> fmt::Result {
    write_description(f, ty.description(), "")?;

    match ty {
        TypeDef::Scalar(def) => writeln!(f, "scalar {}", def.name),
        TypeDef::Enum(def) => {
            write!(f, "enum {}", def.name)?;
            write_block(f, &def.values, |f, value| {
                write_description(f, value.description.as_deref(), "  ")?;
                writeln!(f, "  {}", value.name)
            })
        },
        TypeDef::InputObject(def) => {
            write!(f, "input {}", def.name)?;
            write_block(f, &def.fields, |f, field| {
                write_description(f, field.description.as_deref(), "  ")?;
                f.write_str("  ")?;
                write_input_value(f, field)?;
                writeln!(f)
            })
        },
        TypeDef::Object(def) => {
            write!(f, "type {}", def.name)?;
            write_block(f, &def.fields, |f, field| {
                write_description(f, field.description.as_deref(), "  ")?;
                write!(f, "  {}", field.name)?;
                write_arguments(f, &field.arguments, "  ")?;
                writeln!(f, ": {}", field.ty)
            })
        },
    }
}

fn write_block<T, F>(f: &mut Formatter<'_>, items: &[T], mut write_item: F) -> fmt::Result
where
    F: FnMut(&mut Formatter<'_>, &T) -> fmt::Result,
{
    if items.is_empty() {
        return writeln!(f);
    }

    writeln!(f, " {{")?;
    for item in items {
        write_item(f, item)?;
    }
    writeln!(f, "}}")
}

// ---------------------------------- parsing ----------------------------------

impl ApiDocument {
    /// Read back a document printed by [`ApiDocument::to_sdl`], or any SDL
    /// using the same subset of GraphQL.
    pub fn parse(sdl: &str) -> Result<Self> {
        let parsed = parse_schema(sdl)?;

        let mut document = ApiDocument::new(QUERY, None);

        for definition in parsed.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;

                    if let Some(query) = schema.query {
                        document.query_type = query.node.to_string();
                    }

                    document.subscription_type = schema.subscription.map(|name| name.node.to_string());
                },
                TypeSystemDefinition::Directive(directive) => {
                    document.add_directive(convert_directive(directive.node)?)?;
                },
                TypeSystemDefinition::Type(ty) => {
                    document.add_type(convert_type(ty.node)?)?;
                },
            }
        }

        Ok(document)
    }
}

fn convert_type_ref(ty: &types::Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::named(name.as_str()),
        BaseType::List(inner) => TypeRef::list(convert_type_ref(inner)),
    };

    if ty.nullable { base } else { base.non_null() }
}

fn convert_input_value(value: Positioned<types::InputValueDefinition>) -> InputValueDef {
    let value = value.node;

    InputValueDef {
        name: value.name.node.to_string(),
        description: value.description.map(|description| description.node),
        ty: convert_type_ref(&value.ty.node),
        default_value: value.default_value.map(|default_value| default_value.node),
    }
}

fn convert_directive(directive: types::DirectiveDefinition) -> Result<DirectiveDef> {
    let locations = directive
        .locations
        .into_iter()
        .map(|location| match location.node {
            types::DirectiveLocation::Object => Ok(DirectiveLocation::Object),
            types::DirectiveLocation::FieldDefinition => Ok(DirectiveLocation::FieldDefinition),
            other => Err(SchemaError::UnsupportedDirectiveLocation(format!("{other:?}"))),
        })
        .collect::<Result<_>>()?;

    Ok(DirectiveDef {
        name: directive.name.node.to_string(),
        description: directive.description.map(|description| description.node),
        arguments: directive.arguments.into_iter().map(convert_input_value).collect(),
        locations,
    })
}

fn convert_type(ty: types::TypeDefinition) -> Result<TypeDef> {
    let name = ty.name.node.to_string();
    let description = ty.description.map(|description| description.node);

    let def = match ty.kind {
        TypeKind::Scalar => TypeDef::Scalar(ScalarDef { name, description }),
        TypeKind::Enum(enum_type) => TypeDef::Enum(EnumDef {
            name,
            description,
            values: enum_type
                .values
                .into_iter()
                .map(|value| EnumValueDef {
                    name: value.node.value.node.to_string(),
                    description: value.node.description.map(|description| description.node),
                })
                .collect(),
        }),
        TypeKind::InputObject(input) => TypeDef::InputObject(InputObjectDef {
            name,
            description,
            fields: input.fields.into_iter().map(convert_input_value).collect(),
        }),
        TypeKind::Object(object) => TypeDef::Object(ObjectDef {
            name,
            description,
            fields: object
                .fields
                .into_iter()
                .map(|field| {
                    let field = field.node;

                    FieldDef {
                        name: field.name.node.to_string(),
                        description: field.description.map(|description| description.node),
                        arguments: field.arguments.into_iter().map(convert_input_value).collect(),
                        ty: convert_type_ref(&field.ty.node),
                    }
                })
                .collect(),
        }),
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
    };

    Ok(def)
}
