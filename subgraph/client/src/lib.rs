mod client;
mod error;
mod filter;
mod query;
mod types;

pub use {client::*, error::*, filter::*, query::*, types::*};
