//! HTTP and GraphQL surface of the talent catalog.

pub mod config;
pub mod graphql;
pub mod http;
