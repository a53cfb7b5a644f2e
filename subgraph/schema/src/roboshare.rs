use {
    crate::{ApiSchema, SchemaOptions},
    std::sync::{Arc, LazyLock},
};

/// Entity definitions of the Roboshare marketplace subgraph.
pub const ROBOSHARE_SDL: &str = include_str!("../schemas/roboshare.graphql");

/// Provenance attributes every Roboshare entity records.
pub const PROVENANCE_FIELDS: [&str; 3] = ["blockNumber", "blockTimestamp", "transactionHash"];

/// The Roboshare API, derived once on first use and shared read-only.
///
/// The bundled SDL is trusted the way generated clients trust their
/// generator, so no validation runs. A malformed bundle is a build defect and
/// aborts the process.
pub static ROBOSHARE_SCHEMA: LazyLock<Arc<ApiSchema>> = LazyLock::new(|| {
    match ApiSchema::parse(ROBOSHARE_SDL, SchemaOptions::GENERATED) {
        Ok(schema) => Arc::new(schema),
        Err(err) => panic!("bundled Roboshare schema is malformed: {err}"),
    }
});
