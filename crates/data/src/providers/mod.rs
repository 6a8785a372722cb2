//! Indexer provider implementations.

mod graphql;

pub use graphql::GraphqlIndexer;
