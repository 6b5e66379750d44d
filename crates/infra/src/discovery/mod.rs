//! Target discovery backed by the system audio graph
//!
//! The PipeWire implementation shells out to `wpctl status` and parses its
//! tree output into a [`volmix_core::domain::TargetDirectory`].

pub mod wpctl;

pub use wpctl::*;
