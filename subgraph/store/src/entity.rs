use {
    crate::{Result, StoreError, Value},
    async_graphql::Value as GraphqlValue,
    std::collections::{BTreeMap, btree_map},
    subgraph_schema::{EntitySchema, EntityType},
};

/// The attributes of one version of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity(BTreeMap<String, Value>);

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Attribute value, with absent attributes reading as null.
    pub fn value(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&Value::Null)
    }

    pub fn insert<F, V>(&mut self, field: F, value: V) -> Option<Value>
    where
        F: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(field.into(), value.into())
    }

    pub fn with<F, V>(mut self, field: F, value: V) -> Self
    where
        F: Into<String>,
        V: Into<Value>,
    {
        self.insert(field, value);
        self
    }

    /// The `id` attribute in its string form: strings as is, bytes as `0x`
    /// hex and `Int8` in decimal.
    pub fn id(&self) -> Option<String> {
        match self.get("id") {
            None | Some(Value::Null) => None,
            Some(id) => Some(id.to_string()),
        }
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Build an entity from a JSON-like object, coercing every attribute to
    /// its declared type and checking that non-null attributes are present.
    pub fn from_input(
        entity_type: &EntityType,
        input: &BTreeMap<String, GraphqlValue>,
        schema: &EntitySchema,
    ) -> Result<Self> {
        let mut entity = Entity::new();

        for (name, value) in input {
            let field = entity_type
                .field(name)
                .ok_or_else(|| StoreError::UnknownField {
                    entity_type: entity_type.name.clone(),
                    field: name.clone(),
                })?;

            if field.is_derived() {
                return Err(StoreError::InvalidValue {
                    field: name.clone(),
                    reason: "derived attributes can't be set".to_string(),
                });
            }

            entity.insert(name.clone(), Value::coerce_field(field, value, schema)?);
        }

        for field in entity_type.stored_fields() {
            if !field.ty.nullable && entity.value(&field.name).is_null() {
                return Err(StoreError::MissingValue {
                    entity_type: entity_type.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        Ok(entity)
    }
}

impl<'a> IntoIterator for &'a Entity {
    type IntoIter = btree_map::Iter<'a, String, Value>;
    type Item = (&'a String, &'a Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Entity {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self(iter.into_iter().collect())
    }
}
