use {
    crate::{config::Config, schema::SchemaArgs},
    clap::Parser,
    std::{path::PathBuf, sync::Arc},
    subgraph_httpd::{context::Context, server::run_server},
    subgraph_store::{Fixture, MemoryStore},
};

#[derive(Parser)]
pub struct ServeCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Indexing history to serve [default: config `schema.fixture`, or the bundled demo data]
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// IP address to listen on [default: config `httpd.ip`]
    #[arg(long)]
    ip: Option<String>,

    /// Port to listen on [default: config `httpd.port`]
    #[arg(long)]
    port: Option<u16>,
}

impl ServeCmd {
    pub async fn run(self, cfg: Config) -> anyhow::Result<()> {
        let schema = Arc::new(self.schema.load(cfg.schema.sdl.as_deref())?);

        let fixture = match self.fixture.or(cfg.schema.fixture) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading fixture");
                Fixture::from_file(path)?
            },
            None => Fixture::roboshare()?,
        };

        let store = MemoryStore::from_fixture(schema, fixture).await?;
        let context = Context::new(Arc::new(store)).with_limits(cfg.httpd.limits);

        run_server(
            self.ip.unwrap_or(cfg.httpd.ip),
            self.port.unwrap_or(cfg.httpd.port),
            cfg.httpd.cors_allowed_origin,
            context,
        )
        .await?;

        Ok(())
    }
}
