//! External-lookup rules - archetype (b).
//!
//! These rules call third-party read-only APIs with a per-request timeout,
//! filter the response for topical relevance before scoring (raw hit counts
//! would reward unrelated same-named entities), and degrade to a zero score
//! with error evidence when the API is unreachable. They never return `Err`:
//! "found nothing" is a defined state for a lookup.

mod wikipedia;

pub use wikipedia::WikipediaPresenceRule;
