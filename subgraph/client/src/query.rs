use {
    crate::{BlockHeight, Filter, OrderDirection, SubgraphErrorPolicy},
    serde::Serialize,
    serde_json::{Map, Value as JsonValue, json},
    subgraph_schema::{
        builtins::{
            BLOCK_HEIGHT, DEFAULT_FIRST, DEFAULT_SKIP, ERROR_POLICY, META_FIELD, ORDER_DIRECTION,
        },
        naming::{plural_field_name, singular_field_name},
    },
};

/// The body of a GraphQL POST request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Map<String, JsonValue>,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

/// A query against one root field of the subgraph.
pub trait SubgraphQuery {
    /// Key of the response's `data` object holding the result.
    fn root_field(&self) -> String;

    fn to_request(&self) -> GraphqlRequest;
}

// ----------------------------------- render ----------------------------------

struct Variable {
    argument: &'static str,
    ty: String,
    value: JsonValue,
}

impl Variable {
    fn new<T>(argument: &'static str, ty: T, value: JsonValue) -> Self
    where
        T: Into<String>,
    {
        Self {
            argument,
            ty: ty.into(),
            value,
        }
    }
}

fn render(
    operation: String,
    field: &str,
    variables: Vec<Variable>,
    selection: &str,
) -> GraphqlRequest {
    let declarations = variables
        .iter()
        .map(|var| format!("${}: {}", var.argument, var.ty))
        .collect::<Vec<_>>();
    let arguments = variables
        .iter()
        .map(|var| format!("{}: ${}", var.argument, var.argument))
        .collect::<Vec<_>>();

    let mut query = format!("query {operation}");
    if !declarations.is_empty() {
        query.push_str(&format!("({})", declarations.join(", ")));
    }

    query.push_str(&format!(" {{\n  {field}"));
    if !arguments.is_empty() {
        query.push_str(&format!("({})", arguments.join(", ")));
    }

    query.push_str(&format!(" {{\n    {selection}\n  }}\n}}"));

    GraphqlRequest {
        query,
        variables: variables
            .into_iter()
            .map(|var| (var.argument.to_string(), var.value))
            .collect(),
        operation_name: Some(operation),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn common_variables(
    block: &Option<BlockHeight>,
    subgraph_error: SubgraphErrorPolicy,
) -> Vec<Variable> {
    let mut variables = Vec::new();

    if let Some(block) = block {
        variables.push(Variable::new("block", BLOCK_HEIGHT, json!(block)));
    }

    if subgraph_error != SubgraphErrorPolicy::default() {
        variables.push(Variable::new(
            "subgraphError",
            format!("{ERROR_POLICY}!"),
            json!(subgraph_error),
        ));
    }

    variables
}

// ------------------------------ collection query -----------------------------

/// Query the collection field of an entity type, e.g. `vehicles`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionQuery {
    entity: String,
    selection: Vec<String>,
    skip: i32,
    first: i32,
    order_by: Option<String>,
    order_direction: Option<OrderDirection>,
    filter: Filter,
    block: Option<BlockHeight>,
    subgraph_error: SubgraphErrorPolicy,
}

impl CollectionQuery {
    pub fn new<E>(entity: E) -> Self
    where
        E: Into<String>,
    {
        Self {
            entity: entity.into(),
            selection: vec!["id".to_string()],
            skip: DEFAULT_SKIP,
            first: DEFAULT_FIRST,
            order_by: None,
            order_direction: None,
            filter: Filter::new(),
            block: None,
            subgraph_error: SubgraphErrorPolicy::default(),
        }
    }

    /// Replace the selection set. Items may contain nested selections, e.g.
    /// `partner { name }`.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip(mut self, skip: i32) -> Self {
        self.skip = skip;
        self
    }

    pub fn first(mut self, first: i32) -> Self {
        self.first = first;
        self
    }

    pub fn order_by<F>(mut self, field: F, direction: OrderDirection) -> Self
    where
        F: Into<String>,
    {
        self.order_by = Some(field.into());
        self.order_direction = Some(direction);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn block(mut self, block: BlockHeight) -> Self {
        self.block = Some(block);
        self
    }

    pub fn subgraph_error(mut self, policy: SubgraphErrorPolicy) -> Self {
        self.subgraph_error = policy;
        self
    }
}

impl SubgraphQuery for CollectionQuery {
    fn root_field(&self) -> String {
        plural_field_name(&self.entity)
    }

    fn to_request(&self) -> GraphqlRequest {
        let mut variables = Vec::new();

        if self.skip != DEFAULT_SKIP {
            variables.push(Variable::new("skip", "Int", json!(self.skip)));
        }

        if self.first != DEFAULT_FIRST {
            variables.push(Variable::new("first", "Int", json!(self.first)));
        }

        if let Some(order_by) = &self.order_by {
            variables.push(Variable::new(
                "orderBy",
                format!("{}_orderBy", self.entity),
                json!(order_by),
            ));
        }

        if let Some(direction) = self.order_direction {
            variables.push(Variable::new("orderDirection", ORDER_DIRECTION, json!(direction)));
        }

        if !self.filter.is_empty() {
            variables.push(Variable::new(
                "where",
                format!("{}_filter", self.entity),
                self.filter.clone().into_json(),
            ));
        }

        variables.extend(common_variables(&self.block, self.subgraph_error));

        let field = self.root_field();

        render(capitalize(&field), &field, variables, &self.selection.join("\n    "))
    }
}

// -------------------------------- entity query -------------------------------

/// Look up a single entity by ID, e.g. `vehicle(id: "1")`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    entity: String,
    id: String,
    selection: Vec<String>,
    block: Option<BlockHeight>,
    subgraph_error: SubgraphErrorPolicy,
}

impl EntityQuery {
    pub fn new<E, I>(entity: E, id: I) -> Self
    where
        E: Into<String>,
        I: Into<String>,
    {
        Self {
            entity: entity.into(),
            id: id.into(),
            selection: vec!["id".to_string()],
            block: None,
            subgraph_error: SubgraphErrorPolicy::default(),
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn block(mut self, block: BlockHeight) -> Self {
        self.block = Some(block);
        self
    }

    pub fn subgraph_error(mut self, policy: SubgraphErrorPolicy) -> Self {
        self.subgraph_error = policy;
        self
    }
}

impl SubgraphQuery for EntityQuery {
    fn root_field(&self) -> String {
        singular_field_name(&self.entity)
    }

    fn to_request(&self) -> GraphqlRequest {
        let mut variables = vec![Variable::new("id", "ID!", json!(self.id))];
        variables.extend(common_variables(&self.block, self.subgraph_error));

        let field = self.root_field();

        render(capitalize(&field), &field, variables, &self.selection.join("\n    "))
    }
}

// --------------------------------- meta query --------------------------------

const META_SELECTION: &str =
    "deployment\n    hasIndexingErrors\n    block { number hash timestamp parentHash }";

/// Query the `_meta` field for the indexing status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaQuery {
    block: Option<BlockHeight>,
}

impl MetaQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, block: BlockHeight) -> Self {
        self.block = Some(block);
        self
    }
}

impl SubgraphQuery for MetaQuery {
    fn root_field(&self) -> String {
        META_FIELD.to_string()
    }

    fn to_request(&self) -> GraphqlRequest {
        let variables = common_variables(&self.block, SubgraphErrorPolicy::default());

        render("Meta".to_string(), META_FIELD, variables, META_SELECTION)
    }
}
