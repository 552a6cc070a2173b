//! Google Books catalog access and the search session built on top of it.
//!
//! [`GoogleBooksClient`] talks to the volumes API and normalizes records into
//! [`Book`](bookfinder_core::Book)s. [`SearchSession`] drives queries and
//! pagination over any [`CatalogSource`], and [`BookFinder`] wires a session,
//! the collection store and persistent storage into one application instance.

pub mod app;
pub mod client;
pub mod error;
pub mod http;
pub mod normalize;
pub mod query;
pub mod session;

pub use app::BookFinder;
pub use client::{CatalogSource, GoogleBooksClient};
pub use error::{CatalogError, Result};
pub use http::CatalogHttpClient;
pub use session::{FetchOutcome, SearchSession, SessionPhase, SessionState};
