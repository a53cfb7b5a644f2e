mod api;
pub mod builtins;
mod document;
mod entity;
mod error;
pub mod filter;
pub mod naming;
mod order_by;
mod parser;
mod roboshare;
mod sdl;
mod validation;

pub use {
    api::*, document::*, entity::*, error::*, filter::FilterOp, order_by::*, roboshare::*,
    validation::*,
};
