use {
    crate::config::Config,
    clap::{Parser, Subcommand},
    colored_json::ToColoredJson,
    serde::Serialize,
    serde_json::Value as JsonValue,
    subgraph_client::{
        BlockHeight, CollectionQuery, EntityQuery, Filter, HttpClient, OrderDirection,
        SubgraphClient, SubgraphErrorPolicy,
    },
};

#[derive(Parser)]
pub struct QueryCmd {
    /// GraphQL endpoint of the subgraph [default: config `client.endpoint`]
    #[arg(long)]
    endpoint: Option<String>,

    /// Block number at which to perform queries [default: latest]
    #[arg(long, conflicts_with = "block_hash")]
    height: Option<i32>,

    /// Block hash at which to perform queries
    #[arg(long)]
    block_hash: Option<String>,

    /// Return data even if the subgraph has failed with an indexing error
    #[arg(long)]
    allow_errors: bool,

    #[command(subcommand)]
    subcmd: SubCmd,
}

#[derive(Subcommand)]
enum SubCmd {
    /// Indexing status of the subgraph
    Meta,
    /// Get a single entity by ID
    Entity {
        /// Entity type, e.g. `Vehicle`
        entity: String,
        /// Entity ID
        id: String,
        /// Fields to select, comma separated
        #[arg(long, value_delimiter = ',', default_value = "id")]
        select: Vec<String>,
    },
    /// List entities of a type
    List {
        /// Entity type, e.g. `Listing`
        entity: String,
        /// Fields to select, comma separated
        #[arg(long, value_delimiter = ',', default_value = "id")]
        select: Vec<String>,
        /// Maximum number of entities to return [default: 100]
        #[arg(long)]
        first: Option<i32>,
        /// Number of entities to skip
        #[arg(long)]
        skip: Option<i32>,
        /// Field to sort by
        #[arg(long)]
        order_by: Option<String>,
        /// Sort in descending order
        #[arg(long, requires = "order_by")]
        desc: bool,
        /// Filter as a JSON object, e.g. `{"status": "Active"}`
        #[arg(long, value_name = "JSON")]
        filter: Option<String>,
    },
}

impl QueryCmd {
    pub async fn run(self, cfg: &Config) -> anyhow::Result<()> {
        let client = HttpClient::new(self.endpoint.unwrap_or_else(|| cfg.client.endpoint.clone()));

        let block = match (self.height, self.block_hash) {
            (Some(height), _) => Some(BlockHeight::Number(height)),
            (None, Some(hash)) => Some(BlockHeight::Hash(hash)),
            (None, None) => None,
        };

        let policy = if self.allow_errors {
            SubgraphErrorPolicy::Allow
        } else {
            SubgraphErrorPolicy::Deny
        };

        match self.subcmd {
            SubCmd::Meta => {
                let meta = client.meta(block).await?;
                print_json_pretty(meta)
            },
            SubCmd::Entity { entity, id, select } => {
                let mut query = EntityQuery::new(entity, id)
                    .select(select)
                    .subgraph_error(policy);
                if let Some(block) = block {
                    query = query.block(block);
                }

                print_json_pretty(client.query(&query).await?)
            },
            SubCmd::List {
                entity,
                select,
                first,
                skip,
                order_by,
                desc,
                filter,
            } => {
                let mut query = CollectionQuery::new(entity)
                    .select(select)
                    .subgraph_error(policy);

                if let Some(first) = first {
                    query = query.first(first);
                }

                if let Some(skip) = skip {
                    query = query.skip(skip);
                }

                if let Some(order_by) = order_by {
                    let direction = if desc {
                        OrderDirection::Desc
                    } else {
                        OrderDirection::Asc
                    };
                    query = query.order_by(order_by, direction);
                }

                if let Some(filter) = filter {
                    let json = serde_json::from_str::<JsonValue>(&filter)?;
                    query = query.filter(Filter::try_from(json)?);
                }

                if let Some(block) = block {
                    query = query.block(block);
                }

                print_json_pretty(client.query(&query).await?)
            },
        }
    }
}

fn print_json_pretty<T>(data: T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let json = serde_json::to_string_pretty(&data)?;
    let colored = json.to_colored_json_auto()?;

    println!("{colored}");

    Ok(())
}
