pub mod graphql;
pub mod index;
