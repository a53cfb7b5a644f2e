use {
    clap::Args,
    std::{fs, path::{Path, PathBuf}},
    subgraph_schema::{ApiSchema, ROBOSHARE_SDL, SchemaOptions},
};

/// Flags choosing and checking the entity definitions.
#[derive(Args)]
pub struct SchemaArgs {
    /// Entity definitions to derive the API from [default: config `schema.sdl`, or the bundled Roboshare schema]
    #[arg(long)]
    pub sdl: Option<PathBuf>,

    /// Skip validating the derived API document
    #[arg(long)]
    pub assume_valid: bool,

    /// Skip the subgraph rules on the entity definitions
    #[arg(long)]
    pub assume_valid_sdl: bool,
}

impl SchemaArgs {
    pub fn options(&self) -> SchemaOptions {
        SchemaOptions {
            assume_valid: self.assume_valid,
            assume_valid_sdl: self.assume_valid_sdl,
        }
    }

    /// Derive the API from the `--sdl` file, falling back to `configured`.
    pub fn load(&self, configured: Option<&Path>) -> anyhow::Result<ApiSchema> {
        load_schema(self.sdl.as_deref().or(configured), self.options())
    }
}

pub fn load_schema(path: Option<&Path>, options: SchemaOptions) -> anyhow::Result<ApiSchema> {
    let schema = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading entity definitions");

            ApiSchema::parse(&fs::read_to_string(path)?, options)?
        },
        None => ApiSchema::parse(ROBOSHARE_SDL, options)?,
    };

    Ok(schema)
}
