mod block;
mod entity;
pub mod error;
mod fixtures;
pub mod query;
mod source;
mod store;
mod value;

pub use {
    block::*,
    entity::*,
    error::*,
    fixtures::*,
    query::{
        EntityFilter, EntityOrder, EntityQuery, EntityRange, OrderDirection, filter_from_input,
        matches_op,
    },
    source::*,
    store::*,
    value::*,
};
