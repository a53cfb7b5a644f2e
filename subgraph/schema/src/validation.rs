use {
    crate::{ApiDocument, InputValueDef, Result, SchemaError, TypeDef},
    std::collections::HashSet,
};

const GRAPHQL_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Controls which checks run while assembling a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Skip validating the assembled API document.
    pub assume_valid: bool,
    /// Skip the subgraph-specific rules on the entity definitions.
    pub assume_valid_sdl: bool,
}

impl SchemaOptions {
    /// Options used for schemas produced by a code generator, which has
    /// already validated its input.
    pub const GENERATED: SchemaOptions = SchemaOptions {
        assume_valid: true,
        assume_valid_sdl: true,
    };
}

#[derive(Clone, Copy)]
enum Position {
    Input,
    Output,
}

/// Check that the document is a self-consistent GraphQL type system.
pub fn validate(document: &ApiDocument) -> Result<()> {
    for root in std::iter::once(&document.query_type).chain(&document.subscription_type) {
        if document.object(root).is_none() {
            return Err(SchemaError::MissingRootType { name: root.clone() });
        }
    }

    for directive in &document.directives {
        check_input_values(
            document,
            &format!("@{}", directive.name),
            &directive.arguments,
        )?;
    }

    for ty in document.types() {
        match ty {
            TypeDef::Scalar(_) => {},
            TypeDef::Enum(def) => {
                check_unique(&def.name, def.value_names())?;
            },
            TypeDef::InputObject(def) => {
                check_input_values(document, &def.name, &def.fields)?;
            },
            TypeDef::Object(def) => {
                check_unique(
                    &def.name,
                    def.fields.iter().map(|field| field.name.as_str()),
                )?;

                for field in &def.fields {
                    let referrer = format!("{}.{}", def.name, field.name);

                    check_reference(document, &referrer, field.ty.base_name(), Position::Output)?;
                    check_input_values(document, &referrer, &field.arguments)?;
                }
            },
        }
    }

    Ok(())
}

fn check_input_values(document: &ApiDocument, owner: &str, values: &[InputValueDef]) -> Result<()> {
    check_unique(owner, values.iter().map(|value| value.name.as_str()))?;

    for value in values {
        check_reference(
            document,
            &format!("{owner}.{}", value.name),
            value.ty.base_name(),
            Position::Input,
        )?;
    }

    Ok(())
}

fn check_unique<'a, I>(owner: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();

    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateMember {
                owner: owner.to_string(),
                member: name.to_string(),
            });
        }
    }

    Ok(())
}

fn check_reference(
    document: &ApiDocument,
    referrer: &str,
    name: &str,
    position: Position,
) -> Result<()> {
    if GRAPHQL_SCALARS.contains(&name) {
        return Ok(());
    }

    let Some(ty) = document.get_type(name) else {
        return Err(SchemaError::UnknownType {
            name: name.to_string(),
            referrer: referrer.to_string(),
        });
    };

    match position {
        Position::Input if !ty.is_input_type() => Err(SchemaError::NotAnInputType {
            name: name.to_string(),
            referrer: referrer.to_string(),
        }),
        Position::Output if !ty.is_output_type() => Err(SchemaError::NotAnOutputType {
            name: name.to_string(),
            referrer: referrer.to_string(),
        }),
        _ => Ok(()),
    }
}
