//! Async fan-out of accepted feed events.
//!
//! Events flow from feed → FeedBus → FeedBatcher → sink:
//! - `FeedBus`: broadcast channel fed by a feed observer, stamps each event
//!   with an id, a sequence number and a timestamp
//! - `FeedBatcher`: buffers envelopes (100ms/50 envelopes) before handing
//!   them to a sink, so slow consumers see batches instead of single events

mod batcher;
mod event_bus;

pub use batcher::FeedBatcher;
pub use event_bus::{FeedBus, FeedEnvelope};
