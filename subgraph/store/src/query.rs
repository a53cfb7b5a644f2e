use {
    crate::{BlockNumber, Entity, Result, StoreError, Value},
    async_graphql::Value as GraphqlValue,
    std::cmp::Ordering,
    strum_macros::{Display, EnumString},
    subgraph_schema::{
        EntitySchema, EntityType, FilterOp,
        builtins::{DEFAULT_FIRST, DEFAULT_SKIP},
        filter::FilterKey,
    },
};

// ---------------------------------- filters ----------------------------------

/// A `where` clause, resolved against the entity's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityFilter {
    And(Vec<EntityFilter>),
    Or(Vec<EntityFilter>),
    /// Entities whose current version was written at or after the block.
    ChangeBlockGte(BlockNumber),
    Field {
        field: String,
        op: FilterOp,
        value: Value,
    },
    /// Entities whose referenced (or, for derived attributes, referencing)
    /// entities match the nested filter.
    Child {
        field: String,
        filter: Box<EntityFilter>,
    },
}

impl EntityFilter {
    pub fn field<F, V>(field: F, op: FilterOp, value: V) -> Self
    where
        F: Into<String>,
        V: Into<Value>,
    {
        EntityFilter::Field {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn child<F>(field: F, filter: EntityFilter) -> Self
    where
        F: Into<String>,
    {
        EntityFilter::Child {
            field: field.into(),
            filter: Box::new(filter),
        }
    }
}

/// Convert the `where` argument of a collection field into a filter.
///
/// Returns `None` for an absent or empty `where`. Keys at the same level are
/// combined with AND.
pub fn filter_from_input(
    entity_type: &EntityType,
    schema: &EntitySchema,
    input: &GraphqlValue,
) -> Result<Option<EntityFilter>> {
    let object = match input {
        GraphqlValue::Null => return Ok(None),
        GraphqlValue::Object(object) => object,
        _ => {
            return Err(StoreError::InvalidFilter(format!(
                "filter for `{}` must be an object",
                entity_type.name
            )));
        },
    };

    let has_or = object.contains_key("or");
    let mut filters = Vec::with_capacity(object.len());

    for (key, value) in object {
        let key = key.as_str();

        let resolved = entity_type
            .filter_key(key, schema)
            .ok_or_else(|| StoreError::InvalidFilterKey {
                entity_type: entity_type.name.clone(),
                key: key.to_string(),
            })?;

        if has_or && matches!(resolved, FilterKey::Attribute { .. } | FilterKey::Child { .. }) {
            return Err(StoreError::InvalidFilter(format!(
                "cannot mix column filters with `or` at the same level, found `{key}` alongside `or`"
            )));
        }

        let filter = match resolved {
            FilterKey::Attribute { field, op } => {
                let value = if matches!(value, GraphqlValue::Null) {
                    Value::Null
                } else if field.ty.list || op.takes_list() {
                    let GraphqlValue::List(items) = value else {
                        return Err(StoreError::InvalidValue {
                            field: key.to_string(),
                            reason: format!("expected a list, found `{value}`"),
                        });
                    };

                    Value::List(
                        items
                            .iter()
                            .map(|item| Value::coerce_item(field, item, schema))
                            .collect::<Result<_>>()?,
                    )
                } else {
                    Value::coerce_item(field, value, schema)?
                };

                EntityFilter::Field {
                    field: field.name.clone(),
                    op,
                    value,
                }
            },
            FilterKey::Child { field } => {
                let target = schema
                    .entity(&field.ty.name)
                    .ok_or_else(|| StoreError::UnknownEntityType(field.ty.name.clone()))?;

                match filter_from_input(target, schema, value)? {
                    Some(filter) => EntityFilter::child(&field.name, filter),
                    None => continue,
                }
            },
            FilterKey::ChangeBlock => {
                let number = match value {
                    GraphqlValue::Null => continue,
                    GraphqlValue::Object(object) => object
                        .get("number_gte")
                        .and_then(|number| match number {
                            GraphqlValue::Number(n) => n.as_i64(),
                            _ => None,
                        })
                        .and_then(|n| BlockNumber::try_from(n).ok()),
                    _ => None,
                };

                let number = number.ok_or_else(|| {
                    StoreError::InvalidFilter(format!(
                        "`_change_block` expects `{{ number_gte: Int! }}`, found `{value}`"
                    ))
                })?;

                EntityFilter::ChangeBlockGte(number)
            },
            FilterKey::And | FilterKey::Or => {
                let items = match value {
                    GraphqlValue::Null => continue,
                    GraphqlValue::List(items) => items,
                    _ => {
                        return Err(StoreError::InvalidFilter(format!(
                            "`{key}` expects a list of filters, found `{value}`"
                        )));
                    },
                };

                let mut nested = Vec::with_capacity(items.len());

                for item in items {
                    // An empty filter inside `or` matches everything.
                    nested.push(
                        filter_from_input(entity_type, schema, item)?
                            .unwrap_or(EntityFilter::And(vec![])),
                    );
                }

                if matches!(resolved, FilterKey::And) {
                    EntityFilter::And(nested)
                } else {
                    EntityFilter::Or(nested)
                }
            },
        };

        filters.push(filter);
    }

    Ok(match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(EntityFilter::And(filters)),
    })
}

/// Evaluate a single attribute comparison.
///
/// Comparisons never match a null attribute, except `field: null` and
/// `field_not: null`, which test for nullness.
pub fn matches_op(attribute: &Value, op: FilterOp, value: &Value) -> bool {
    let (positive, negated) = op.positive();

    if value.is_null() {
        return match positive {
            FilterOp::Equal => attribute.is_null() != negated,
            _ => false,
        };
    }

    if attribute.is_null() {
        return false;
    }

    let nocase = op.is_nocase();

    let matched = match positive {
        FilterOp::Equal => attribute == value,
        FilterOp::Gt => attribute.compare(value) == Some(Ordering::Greater),
        FilterOp::Lt => attribute.compare(value) == Some(Ordering::Less),
        FilterOp::Gte => matches!(
            attribute.compare(value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lte => matches!(
            attribute.compare(value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::In => value
            .as_list()
            .is_some_and(|candidates| candidates.contains(attribute)),
        FilterOp::Contains | FilterOp::ContainsNocase => contains(attribute, value, nocase),
        FilterOp::StartsWith | FilterOp::StartsWithNocase => {
            text_pair(attribute, value, nocase).is_some_and(|(a, v)| a.starts_with(&v))
        },
        FilterOp::EndsWith | FilterOp::EndsWithNocase => {
            text_pair(attribute, value, nocase).is_some_and(|(a, v)| a.ends_with(&v))
        },
        // `positive` never returns a negated operator.
        _ => false,
    };

    matched != negated
}

fn text_pair(attribute: &Value, value: &Value, nocase: bool) -> Option<(String, String)> {
    let (attribute, value) = (attribute.as_str()?, value.as_str()?);

    if nocase {
        Some((attribute.to_lowercase(), value.to_lowercase()))
    } else {
        Some((attribute.to_string(), value.to_string()))
    }
}

/// Substring for strings, subsequence for bytes, and for lists: the
/// attribute contains every given value.
fn contains(attribute: &Value, value: &Value, nocase: bool) -> bool {
    match (attribute, value) {
        (Value::String(_), Value::String(_)) => {
            text_pair(attribute, value, nocase).is_some_and(|(a, v)| a.contains(&v))
        },
        (Value::Bytes(haystack), Value::Bytes(needle)) => {
            needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
        },
        (Value::List(haystack), Value::List(needles)) => needles.iter().all(|needle| {
            haystack.iter().any(|item| match (item, needle) {
                (Value::String(a), Value::String(b)) if nocase => a.to_lowercase() == b.to_lowercase(),
                _ => item == needle,
            })
        }),
        _ => false,
    }
}

// --------------------------------- ordering ----------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOrder {
    pub field: String,
    pub direction: OrderDirection,
}

impl Default for EntityOrder {
    fn default() -> Self {
        Self {
            field: "id".to_string(),
            direction: OrderDirection::Asc,
        }
    }
}

impl EntityOrder {
    /// Compare two entities. Nulls sort last ascending and first descending;
    /// ties are broken by ascending id.
    pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
        let by_attribute = compare_nullable(a.value(&self.field), b.value(&self.field));

        let by_attribute = match self.direction {
            OrderDirection::Asc => by_attribute,
            OrderDirection::Desc => by_attribute.reverse(),
        };

        by_attribute.then_with(|| compare_nullable(a.value("id"), b.value("id")))
    }
}

fn compare_nullable(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::List(a), Value::List(b)) => a
            .iter()
            .zip(b)
            .map(|(a, b)| compare_nullable(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (a, b) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

// ---------------------------------- paging -----------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRange {
    pub skip: u32,
    pub first: u32,
}

impl Default for EntityRange {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP as u32,
            first: DEFAULT_FIRST as u32,
        }
    }
}

// ---------------------------------- queries ----------------------------------

/// A collection query against one entity type at one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQuery {
    pub entity_type: String,
    pub filter: Option<EntityFilter>,
    pub order: EntityOrder,
    pub range: EntityRange,
    pub block: BlockNumber,
}

impl EntityQuery {
    pub fn new<T>(entity_type: T, block: BlockNumber) -> Self
    where
        T: Into<String>,
    {
        Self {
            entity_type: entity_type.into(),
            filter: None,
            order: EntityOrder::default(),
            range: EntityRange::default(),
            block,
        }
    }

    pub fn with_filter(mut self, filter: Option<EntityFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_order(mut self, order: EntityOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_range(mut self, range: EntityRange) -> Self {
        self.range = range;
        self
    }
}
