//! Tax calculation modules

pub mod gst;

pub use gst::*;
