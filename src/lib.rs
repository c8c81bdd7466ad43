//! paperbrief - PubMed paper fetching and summarization with a biotech
//! newsletter generator.
//!
//! The library is organized around trait seams for every external
//! collaborator (literature API, chat model, persistence store, SMTP)
//! so that services can be exercised with test doubles.

pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod feeds;
pub mod llm;
pub mod metrics;
pub mod pubmed;
pub mod routes;
pub mod services;
pub mod xml;
