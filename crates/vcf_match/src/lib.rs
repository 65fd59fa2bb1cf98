//! Filtering layer for VCF.
//!
//! Compiles the user's hierarchy and facet selections into a
//! [`CompiledFilter`] (a pure local predicate over normalized vehicle views
//! plus the equivalent remote query-parameter mapping) and hosts the
//! [`FilterEngine`] that decides between filtering an already-fetched
//! collection and issuing a remote re-fetch, discarding stale asynchronous
//! responses via generation tickets.

mod compile;
mod engine;
mod types;

pub use compile::{CompiledFilter, compile};
pub use engine::{CatalogClient, EngineConfig, FilterEngine};
pub use types::{
    ClientError, FetchOutcome, FetchTicket, FilterError, PageInfo, TEXT_ONLY_FACETS, VehiclePage,
    is_text_only_facet,
};
