//! Measurement math
//!
//! Integer helpers shared by the scanning core:
//! - Rounded linear domain mapping (frequency span to bin index and back)
//! - Step-grid rounding
//! - Small order statistics over level samples
//!
//! Everything here is pure and allocation-free.

pub mod scale;
pub mod stats;
