use {
    crate::context::QueryLimits,
    async_graphql::{Error, Result, Value as GraphqlValue, dynamic::ObjectAccessor},
    std::{collections::BTreeMap, str::FromStr},
    subgraph_schema::{
        EntitySchema, EntityType, ScalarKind,
        builtins::{DEFAULT_FIRST, DEFAULT_SKIP},
    },
    subgraph_store::{
        BlockConstraint, BlockNumber, EntityFilter, EntityOrder, EntityRange, OrderDirection,
        Value, filter_from_input,
    },
};

static NULL: GraphqlValue = GraphqlValue::Null;

/// What to do when the subgraph has run into indexing errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    Allow,
    #[default]
    Deny,
}

/// The arguments of a field, detached from the resolver context so they can
/// outlive it in subscription streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(BTreeMap<String, GraphqlValue>);

impl Arguments {
    pub fn from_accessor(args: &ObjectAccessor<'_>) -> Self {
        Self(
            args.iter()
                .map(|(name, value)| (name.to_string(), value.as_value().clone()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> &GraphqlValue {
        self.0.get(name).unwrap_or(&NULL)
    }

    fn int(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            GraphqlValue::Null => Ok(None),
            GraphqlValue::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::new(format!("`{name}` must be an integer"))),
            value => Err(Error::new(format!("`{name}` must be an integer, found `{value}`"))),
        }
    }

    /// Enum arguments arrive as enum literals, or as strings when passed in
    /// variables.
    fn enum_name(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            GraphqlValue::Enum(value) => Some(value.as_str()),
            GraphqlValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn id(&self) -> Result<String> {
        match self.get("id") {
            GraphqlValue::String(id) => Ok(id.clone()),
            GraphqlValue::Number(id) => Ok(id.to_string()),
            value => Err(Error::new(format!("`id` must be an ID, found `{value}`"))),
        }
    }

    pub fn error_policy(&self) -> Result<ErrorPolicy> {
        match self.enum_name("subgraphError") {
            None | Some("deny") => Ok(ErrorPolicy::Deny),
            Some("allow") => Ok(ErrorPolicy::Allow),
            Some(other) => Err(Error::new(format!("invalid `subgraphError` value `{other}`"))),
        }
    }

    /// The `block` argument. A hash takes precedence over a number, and a
    /// number over a minimum number.
    pub fn block(&self) -> Result<BlockConstraint> {
        let block = match self.get("block") {
            GraphqlValue::Null => return Ok(BlockConstraint::Latest),
            GraphqlValue::Object(block) => block,
            value => return Err(Error::new(format!("`block` must be an object, found `{value}`"))),
        };

        let number = |key: &str| -> Result<Option<BlockNumber>> {
            match block.get(key) {
                None | Some(GraphqlValue::Null) => Ok(None),
                Some(GraphqlValue::Number(n)) => n
                    .as_i64()
                    .and_then(|n| BlockNumber::try_from(n).ok())
                    .filter(|n| *n >= 0)
                    .map(Some)
                    .ok_or_else(|| Error::new(format!("invalid block number `{n}`"))),
                Some(value) => Err(Error::new(format!("invalid block number `{value}`"))),
            }
        };

        match block.get("hash") {
            None | Some(GraphqlValue::Null) => {},
            Some(hash) => {
                let Value::Bytes(hash) = Value::coerce_scalar(ScalarKind::Bytes, hash, "hash")? else {
                    return Err(Error::new("`block.hash` must be bytes"));
                };

                return Ok(BlockConstraint::Hash(hash));
            },
        }

        if let Some(number) = number("number")? {
            return Ok(BlockConstraint::Number(number));
        }

        if let Some(number) = number("number_gte")? {
            return Ok(BlockConstraint::NumberGte(number));
        }

        Ok(BlockConstraint::Latest)
    }

    /// `skip` and `first`, checked against the limits.
    pub fn range(&self, limits: QueryLimits) -> Result<EntityRange> {
        let bounded = |name: &str, default: i32, max: u32| -> Result<u32> {
            let value = self.int(name)?.unwrap_or(default as i64);

            u32::try_from(value)
                .ok()
                .filter(|value| *value <= max)
                .ok_or_else(|| {
                    Error::new(format!("Value of \"{name}\" must be between 0 and {max}"))
                })
        };

        Ok(EntityRange {
            skip: bounded("skip", DEFAULT_SKIP, limits.max_skip)?,
            first: bounded("first", DEFAULT_FIRST, limits.max_first)?,
        })
    }

    /// `orderBy` and `orderDirection`. Without `orderBy`, entities are ordered
    /// by id in the requested direction.
    pub fn order(&self, entity_type: &EntityType) -> Result<EntityOrder> {
        let mut order = EntityOrder::default();

        if let Some(field) = self.enum_name("orderBy") {
            if entity_type.field(field).is_none() {
                return Err(Error::new(format!(
                    "`{field}` is not a valid `orderBy` value for `{}`",
                    entity_type.name
                )));
            }

            order.field = field.to_string();
        }

        if let Some(direction) = self.enum_name("orderDirection") {
            order.direction = OrderDirection::from_str(direction)
                .map_err(|_| Error::new(format!("invalid `orderDirection` value `{direction}`")))?;
        }

        Ok(order)
    }

    pub fn filter(
        &self,
        entity_type: &EntityType,
        schema: &EntitySchema,
    ) -> Result<Option<EntityFilter>> {
        Ok(filter_from_input(entity_type, schema, self.get("where"))?)
    }
}

impl<const N: usize> From<[(&str, GraphqlValue); N]> for Arguments {
    fn from(entries: [(&str, GraphqlValue); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        assertor::*,
        async_graphql::Name,
    };

    fn object<const N: usize>(entries: [(&str, GraphqlValue); N]) -> GraphqlValue {
        GraphqlValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (Name::new(key), value))
                .collect(),
        )
    }

    #[test]
    fn paging_defaults_and_limits() {
        let limits = QueryLimits::default();

        assert_eq!(
            Arguments::default().range(limits).unwrap(),
            EntityRange { skip: 0, first: 100 }
        );

        let err = Arguments::from([("first", GraphqlValue::from(1001))])
            .range(limits)
            .unwrap_err();
        assert_eq!(err.message, "Value of \"first\" must be between 0 and 1000");

        let err = Arguments::from([("skip", GraphqlValue::from(-1))])
            .range(limits)
            .unwrap_err();
        assert_eq!(err.message, "Value of \"skip\" must be between 0 and 5000");

        assert_that!(
            Arguments::from([("skip", GraphqlValue::from(5000))]).range(limits)
        )
        .is_ok();
    }

    #[test]
    fn block_constraints() {
        let block = |value| Arguments::from([("block", value)]).block().unwrap();

        assert_eq!(block(GraphqlValue::Null), BlockConstraint::Latest);
        assert_eq!(
            block(object([("number", GraphqlValue::from(12))])),
            BlockConstraint::Number(12)
        );
        assert_eq!(
            block(object([("number_gte", GraphqlValue::from(3))])),
            BlockConstraint::NumberGte(3)
        );
        assert_eq!(
            block(object([
                ("hash", GraphqlValue::from("0xabcd")),
                ("number", GraphqlValue::from(12)),
            ])),
            BlockConstraint::Hash(vec![0xab, 0xcd])
        );

        assert_that!(
            Arguments::from([("block", object([("number", GraphqlValue::from(-1))]))]).block()
        )
        .is_err();
    }

    #[test]
    fn error_policy_accepts_enums_and_strings() {
        assert_eq!(Arguments::default().error_policy().unwrap(), ErrorPolicy::Deny);
        assert_eq!(
            Arguments::from([("subgraphError", GraphqlValue::Enum(Name::new("allow")))])
                .error_policy()
                .unwrap(),
            ErrorPolicy::Allow
        );
        assert_eq!(
            Arguments::from([("subgraphError", GraphqlValue::from("deny"))])
                .error_policy()
                .unwrap(),
            ErrorPolicy::Deny
        );
    }
}
