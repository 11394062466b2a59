//! Indicator schema registry.
//!
//! Each culture gets an ordered list of indicator groups. Inputs carry
//! required/range metadata for entry screens; computed indicators are never
//! stored and are derived from their sibling inputs at read time.

pub mod definition;
pub mod keys;
pub mod registry;
pub mod validate;

pub use definition::{IndicatorDef, IndicatorGroup, IndicatorKind, IndicatorSchema};
pub use registry::{CULTURES, culture_label, get_indicator_schema};
pub use validate::{validate_trial_values, validate_values};
