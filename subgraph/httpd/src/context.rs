use {
    serde::{Deserialize, Serialize},
    std::sync::Arc,
    subgraph_schema::ApiSchema,
    subgraph_store::EntitySource,
};

/// Bounds on the paging arguments of collection fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub max_first: u32,
    pub max_skip: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_first: 1000,
            max_skip: 5000,
        }
    }
}

#[derive(Clone)]
pub struct Context {
    pub source: Arc<dyn EntitySource>,
    pub limits: QueryLimits,
}

impl Context {
    pub fn new(source: Arc<dyn EntitySource>) -> Self {
        Self {
            source,
            limits: QueryLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn schema(&self) -> &Arc<ApiSchema> {
        self.source.schema()
    }
}
