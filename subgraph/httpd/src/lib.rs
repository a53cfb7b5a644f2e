pub mod context;
pub mod error;
pub mod graphql;
pub mod routes;
pub mod server;
