use {
    crate::{config::Config, schema::SchemaArgs},
    clap::Parser,
    std::{fs, path::PathBuf},
    subgraph_schema::{ApiDocument, SchemaOptions, validate},
};

#[derive(Parser)]
pub struct SdlCmd {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Write the SDL to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl SdlCmd {
    pub fn run(self, cfg: &Config) -> anyhow::Result<()> {
        let schema = self.schema.load(cfg.schema.sdl.as_deref())?;
        let sdl = schema.document().to_sdl();

        match self.output {
            Some(path) => {
                fs::write(&path, sdl)?;

                tracing::info!(path = %path.display(), "Wrote API schema");
            },
            None => print!("{sdl}"),
        }

        Ok(())
    }
}

#[derive(Parser)]
pub struct CheckCmd {
    #[command(flatten)]
    schema: SchemaArgs,
}

impl CheckCmd {
    /// Derive the API with every check enabled, then make sure the printed
    /// SDL reads back as the same document.
    pub fn run(self, cfg: &Config) -> anyhow::Result<()> {
        let mut options = self.schema.options();
        if options != SchemaOptions::default() {
            tracing::warn!("`check` always validates; ignoring the assume-valid flags");
            options = SchemaOptions::default();
        }

        let path = self.schema.sdl.as_deref().or(cfg.schema.sdl.as_deref());
        let schema = crate::schema::load_schema(path, options)?;

        let printed = schema.document().to_sdl();
        let reparsed = ApiDocument::parse(&printed)?;
        validate(&reparsed)?;

        anyhow::ensure!(
            &reparsed == schema.document(),
            "printed SDL does not read back as the same document"
        );

        tracing::info!(
            entities = schema.input().entities.len(),
            enums = schema.input().enums.len(),
            types = schema.document().types().count(),
            "Schema is valid"
        );

        Ok(())
    }
}
