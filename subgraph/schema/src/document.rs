use {
    crate::{Result, SchemaError},
    async_graphql::Value,
    std::{
        collections::BTreeMap,
        fmt::{self, Formatter},
    },
    strum_macros::{EnumString, IntoStaticStr},
};

// --------------------------------- type refs ---------------------------------

/// Reference to a type from a field, argument or input field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        TypeRef::Named(name.into())
    }

    pub fn named_nn<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        TypeRef::named(name).non_null()
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    /// The named type at the bottom of any list and non-null wrappers.
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

// -------------------------------- definitions --------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<Value>,
}

impl InputValueDef {
    pub fn new<N>(name: N, ty: TypeRef) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    pub fn description<D>(mut self, description: D) -> Self
    where
        D: Into<String>,
    {
        self.description = Some(description.into());
        self
    }

    pub fn default_value<V>(mut self, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.default_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub ty: TypeRef,
}

impl FieldDef {
    pub fn new<N>(name: N, ty: TypeRef) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            arguments: vec![],
            ty,
        }
    }

    pub fn description<D>(mut self, description: D) -> Self
    where
        D: Into<String>,
    {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, argument: InputValueDef) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn arguments<I>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = InputValueDef>,
    {
        self.arguments.extend(arguments);
        self
    }

    pub fn get_argument(&self, name: &str) -> Option<&InputValueDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDef {
    pub name: String,
    pub description: Option<String>,
}

impl EnumValueDef {
    pub fn new<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn description<D>(mut self, description: D) -> Self
    where
        D: Into<String>,
    {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarDef {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|value| value.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<InputValueDef>,
}

impl InputObjectDef {
    pub fn field(&self, name: &str) -> Option<&InputValueDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl ObjectDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    Scalar(ScalarDef),
    Enum(EnumDef),
    InputObject(InputObjectDef),
    Object(ObjectDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Scalar(def) => &def.name,
            TypeDef::Enum(def) => &def.name,
            TypeDef::InputObject(def) => &def.name,
            TypeDef::Object(def) => &def.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TypeDef::Scalar(def) => def.description.as_deref(),
            TypeDef::Enum(def) => def.description.as_deref(),
            TypeDef::InputObject(def) => def.description.as_deref(),
            TypeDef::Object(def) => def.description.as_deref(),
        }
    }

    pub fn is_input_type(&self) -> bool {
        !matches!(self, TypeDef::Object(_))
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self, TypeDef::InputObject(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    Object,
    FieldDefinition,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name: &'static str = (*self).into();
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub locations: Vec<DirectiveLocation>,
}

// --------------------------------- document ----------------------------------

/// The type system of a GraphQL API.
///
/// Types are kept sorted by name so that printing is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDocument {
    pub query_type: String,
    pub subscription_type: Option<String>,
    pub directives: Vec<DirectiveDef>,
    types: BTreeMap<String, TypeDef>,
}

impl ApiDocument {
    pub fn new<Q>(query_type: Q, subscription_type: Option<String>) -> Self
    where
        Q: Into<String>,
    {
        Self {
            query_type: query_type.into(),
            subscription_type,
            directives: vec![],
            types: BTreeMap::new(),
        }
    }

    pub fn add_type(&mut self, def: TypeDef) -> Result<()> {
        let name = def.name().to_string();

        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateType { name });
        }

        self.types.insert(name, def);

        Ok(())
    }

    pub fn add_directive(&mut self, def: DirectiveDef) -> Result<()> {
        if self.directive(&def.name).is_some() {
            return Err(SchemaError::DuplicateDirective { name: def.name });
        }

        self.directives.push(def);

        Ok(())
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        match self.types.get(name) {
            Some(TypeDef::Object(def)) => Some(def),
            _ => None,
        }
    }

    pub fn input_object(&self, name: &str) -> Option<&InputObjectDef> {
        match self.types.get(name) {
            Some(TypeDef::InputObject(def)) => Some(def),
            _ => None,
        }
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        match self.types.get(name) {
            Some(TypeDef::Enum(def)) => Some(def),
            _ => None,
        }
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.iter().find(|def| def.name == name)
    }

    pub fn query(&self) -> Option<&ObjectDef> {
        self.object(&self.query_type)
    }

    pub fn subscription(&self) -> Option<&ObjectDef> {
        self.subscription_type
            .as_deref()
            .and_then(|name| self.object(name))
    }
}
