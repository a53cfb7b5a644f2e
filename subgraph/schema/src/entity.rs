use {
    crate::naming,
    std::fmt::{self, Formatter},
    strum_macros::{EnumIter, EnumString, IntoStaticStr},
};

// ---------------------------------- scalars ----------------------------------

/// The scalar types an entity attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
pub enum ScalarKind {
    #[strum(serialize = "ID")]
    Id,
    String,
    Bytes,
    BigInt,
    BigDecimal,
    Int,
    Int8,
    Boolean,
    Timestamp,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Scalars defined by GraphQL itself, which the API document does not
    /// need to declare.
    pub fn is_graphql_builtin(self) -> bool {
        matches!(
            self,
            ScalarKind::Id | ScalarKind::String | ScalarKind::Int | ScalarKind::Boolean
        )
    }

    /// Whether the scalar may be used as the type of an entity's `id`.
    pub fn is_id_kind(self) -> bool {
        matches!(
            self,
            ScalarKind::Id | ScalarKind::String | ScalarKind::Bytes | ScalarKind::Int8
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -------------------------------- field types --------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Enum,
    Entity,
}

/// The declared type of an entity attribute.
///
/// Subgraph schemas allow at most one level of list nesting, so the type is
/// flattened into a base name plus nullability of the value and of the list
/// items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    pub list: bool,
    pub item_nullable: bool,
}

impl FieldType {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self {
            name: kind.name().to_string(),
            kind: FieldKind::Scalar(kind),
            nullable: true,
            list: false,
            item_nullable: true,
        }
    }

    pub fn entity<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            kind: FieldKind::Entity,
            nullable: true,
            list: false,
            item_nullable: true,
        }
    }

    pub fn enumeration<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            kind: FieldKind::Enum,
            nullable: true,
            list: false,
            item_nullable: true,
        }
    }

    pub fn non_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Turn the type into a list of its current base, `[T!]` style.
    pub fn list_of_non_null(mut self) -> Self {
        self.list = true;
        self.item_nullable = false;
        self
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        self.kind == FieldKind::Entity
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let bang = |nullable| if nullable { "" } else { "!" };

        if self.list {
            write!(
                f,
                "[{}{}]{}",
                self.name,
                bang(self.item_nullable),
                bang(self.nullable)
            )
        } else {
            write!(f, "{}{}", self.name, bang(self.nullable))
        }
    }
}

// ---------------------------------- entities ---------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityField {
    pub name: String,
    pub ty: FieldType,
    pub description: Option<String>,
    /// Name of the attribute on the referenced entity this field is derived
    /// from, as declared with `@derivedFrom(field: ...)`.
    pub derived_from: Option<String>,
}

impl EntityField {
    pub fn new<N>(name: N, ty: FieldType) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            ty,
            description: None,
            derived_from: None,
        }
    }

    pub fn derived_from<F>(mut self, field: F) -> Self
    where
        F: Into<String>,
    {
        self.derived_from = Some(field.into());
        self
    }

    pub fn is_derived(&self) -> bool {
        self.derived_from.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<EntityField>,
    /// Immutable entities are written once and never updated.
    pub immutable: bool,
}

impl EntityType {
    pub fn new<N>(name: N, fields: Vec<EntityField>) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            fields,
            immutable: false,
        }
    }

    pub fn field(&self, name: &str) -> Option<&EntityField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The scalar kind of the `id` attribute. Falls back to `ID` for
    /// entities built without one.
    pub fn id_kind(&self) -> ScalarKind {
        self.field("id")
            .and_then(|field| field.ty.scalar_kind())
            .unwrap_or(ScalarKind::Id)
    }

    /// Fields stored on the entity itself, i.e. everything except derived
    /// fields.
    pub fn stored_fields(&self) -> impl Iterator<Item = &EntityField> {
        self.fields.iter().filter(|field| !field.is_derived())
    }

    pub fn singular_field_name(&self) -> String {
        naming::singular_field_name(&self.name)
    }

    pub fn plural_field_name(&self) -> String {
        naming::plural_field_name(&self.name)
    }

    pub fn filter_type_name(&self) -> String {
        format!("{}_filter", self.name)
    }

    pub fn order_by_type_name(&self) -> String {
        format!("{}_orderBy", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

// ----------------------------------- schema ----------------------------------

/// The entity definitions of a subgraph, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySchema {
    pub entities: Vec<EntityType>,
    pub enums: Vec<EnumType>,
}

impl EntitySchema {
    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|ty| ty.name == name)
    }

    /// Scalar kind used to refer to an entity from other entities' filters.
    pub fn reference_kind(&self, entity: &str) -> ScalarKind {
        match self.entity(entity).map(EntityType::id_kind) {
            Some(ScalarKind::Bytes) => ScalarKind::Bytes,
            Some(ScalarKind::Int8) => ScalarKind::Int8,
            _ => ScalarKind::String,
        }
    }
}
