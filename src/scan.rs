//! Spectrum scanning engine
//!
//! The algorithmic core of the firmware:
//! - Scan spans and the zoom range stack
//! - Adaptive squelch calibration
//! - Spectrum binning with cursor-driven zoom selection
//! - The bounded loot catalog of discovered signals
//! - The cooperative scan state machine tying them together
//! - Frequency-catcher debouncing for the hardware frequency counter

pub mod band;
pub mod catcher;
pub mod controller;
pub mod loot;
pub mod spectrum;
pub mod squelch;
