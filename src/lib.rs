pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod expr;
pub mod fantasy;
pub mod fixtures;
pub mod form;
pub mod match_info;
pub mod metrics;
pub mod position;
pub mod roster;
pub mod schema;
pub mod scope;
pub mod sheet;
pub mod store;
pub mod table;
pub mod team;
