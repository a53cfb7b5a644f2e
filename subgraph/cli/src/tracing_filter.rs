use {
    std::str::FromStr,
    tracing::{
        Level, Metadata, Subscriber, level_filters::LevelFilter,
        metadata::ParseLevelFilterError,
    },
    tracing_subscriber::{Layer, layer::Context},
};

/// Crates logging every request at `INFO`.
const NOISY_TARGETS: [&str; 3] = ["actix_web", "async_graphql", "tracing_actix_web"];

/// A level filter that demotes per-request messages of the HTTP and GraphQL
/// libraries to `DEBUG`, so the log at `INFO` shows what the subgraph does
/// rather than every request it serves.
pub struct RequestNoiseFilter {
    max_level: LevelFilter,
}

impl RequestNoiseFilter {
    fn is_noisy(target: &str) -> bool {
        NOISY_TARGETS.iter().any(|prefix| target.starts_with(prefix))
    }
}

impl<S> Layer<S> for RequestNoiseFilter
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        let level = *metadata.level();

        if Self::is_noisy(metadata.target()) && level < Level::DEBUG {
            Level::DEBUG <= self.max_level
        } else {
            level <= self.max_level
        }
    }
}

impl FromStr for RequestNoiseFilter {
    type Err = ParseLevelFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let max_level = s.parse()?;

        Ok(Self { max_level })
    }
}
