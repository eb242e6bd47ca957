//! Core library components.
//!
//! Secret reference detection, token acquisition, the HTTP transport seam
//! and the enrichment itself.

pub mod constants;
pub mod enrich;
pub mod env;
pub mod reference;
pub mod token;
pub mod transport;
pub mod types;
pub mod validation;
