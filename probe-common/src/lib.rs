//! Shared pieces for the store connectivity probes: connection
//! configuration, the error taxonomy, the fixed invocation response, and
//! the demo data the probes write.

pub mod config;
pub mod demo;
pub mod error;
pub mod response;
