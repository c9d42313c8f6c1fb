//! Heuristic rules - archetype (a).
//!
//! Deterministic string/DOM analysis, no I/O, no suspension points: the
//! whole evaluation is synchronous and bit-for-bit idempotent. Each rule
//! builds a score breakdown as it goes and closes the trail with the
//! calculation evidence item.
//!
//! Thresholds are strict inequalities on pre-declared numeric bands; there
//! is no interpolation between bands.

mod https;
mod image_alt;
mod meta_description;
mod subheadings;

pub use https::HttpsRule;
pub use image_alt::ImageAltRule;
pub use meta_description::MetaDescriptionRule;
pub use subheadings::SubheadingDensityRule;
