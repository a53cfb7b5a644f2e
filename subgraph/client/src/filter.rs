use {
    serde::Serialize,
    serde_json::{Map, Value as JsonValue, json},
    subgraph_schema::{FilterOp, builtins::CHANGE_BLOCK_FILTER},
};

/// Builder for the `where` argument of a collection field.
///
/// ```
/// use subgraph_client::Filter;
///
/// let filter = Filter::new()
///     .eq("status", "Active")
///     .child("vehicle", Filter::new().eq("make", "Tesla"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter(Map<String, JsonValue>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare an attribute using any operator, e.g. `amount_gte`.
    pub fn op<F, V>(mut self, field: F, op: FilterOp, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.0
            .insert(format!("{}{}", field.as_ref(), op.suffix()), value.into());
        self
    }

    pub fn eq<F, V>(self, field: F, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.op(field, FilterOp::Equal, value)
    }

    pub fn not<F, V>(self, field: F, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.op(field, FilterOp::Not, value)
    }

    pub fn gt<F, V>(self, field: F, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.op(field, FilterOp::Gt, value)
    }

    pub fn gte<F, V>(self, field: F, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.op(field, FilterOp::Gte, value)
    }

    pub fn lt<F, V>(self, field: F, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.op(field, FilterOp::Lt, value)
    }

    pub fn lte<F, V>(self, field: F, value: V) -> Self
    where
        F: AsRef<str>,
        V: Into<JsonValue>,
    {
        self.op(field, FilterOp::Lte, value)
    }

    pub fn is_in<F, I, V>(self, field: F, values: I) -> Self
    where
        F: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        let values = values.into_iter().map(Into::into).collect::<Vec<_>>();

        self.op(field, FilterOp::In, values)
    }

    /// Entities changed at or after the block.
    pub fn changed_since(mut self, block: i32) -> Self {
        self.0
            .insert(CHANGE_BLOCK_FILTER.to_string(), json!({ "number_gte": block }));
        self
    }

    /// Filter on the entity a reference points to, or on the entities
    /// pointing back for derived fields.
    pub fn child<F>(mut self, field: F, filter: Filter) -> Self
    where
        F: AsRef<str>,
    {
        self.0
            .insert(format!("{}_", field.as_ref()), filter.into_json());
        self
    }

    pub fn and<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        self.0.insert("and".to_string(), Self::list(filters));
        self
    }

    pub fn or<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        self.0.insert("or".to_string(), Self::list(filters));
        self
    }

    fn list<I>(filters: I) -> JsonValue
    where
        I: IntoIterator<Item = Filter>,
    {
        JsonValue::Array(filters.into_iter().map(Filter::into_json).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl TryFrom<JsonValue> for Filter {
    type Error = serde_json::Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Ok(Self(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert_json_diff::assert_json_eq};

    #[test]
    fn building_a_nested_filter() {
        let filter = Filter::new()
            .op("vin", FilterOp::StartsWithNocase, "5yj")
            .is_in("year", ["2022", "2023"])
            .child("partner", Filter::new().eq("isAuthorized", true))
            .changed_since(20);

        assert_json_eq!(
            filter.into_json(),
            json!({
                "vin_starts_with_nocase": "5yj",
                "year_in": ["2022", "2023"],
                "partner_": { "isAuthorized": true },
                "_change_block": { "number_gte": 20 },
            })
        );
    }

    #[test]
    fn or_takes_a_list_of_filters() {
        let filter = Filter::new().or([
            Filter::new().eq("status", "Active"),
            Filter::new().lt("expiresAt", "1735689600"),
        ]);

        assert_json_eq!(
            filter.into_json(),
            json!({
                "or": [
                    { "status": "Active" },
                    { "expiresAt_lt": "1735689600" },
                ]
            })
        );
    }

    #[test]
    fn parsing_a_filter_from_json() {
        let filter = Filter::try_from(json!({ "make": "Tesla" })).unwrap();
        assert_eq!(filter, Filter::new().eq("make", "Tesla"));

        assert!(Filter::try_from(json!(["make"])).is_err());
    }
}
