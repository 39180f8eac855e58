//! Static per-(variable, source) retrieval configuration: input feature lists,
//! offsets/scales, ensemble sizes, domain-code allow-lists, and output ranges.
//! Built once at process start into an immutable [`Registry`] and passed by
//! reference into every retrieval.
pub mod registry;
pub mod tables;

pub use registry::{Registry, VariableConfig};
