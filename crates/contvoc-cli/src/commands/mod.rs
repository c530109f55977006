//! CLI command implementations

pub mod codebook;
pub mod excite;

mod json_output;
