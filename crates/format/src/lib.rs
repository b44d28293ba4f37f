//! File formats for phylevo.
//!
//! Alignment input (line format and FASTA), configuration files (JSON and
//! the properties layout) and Newick rendering of trees.

mod error;

pub mod alignment;
pub mod config;
pub mod newick;

pub use alignment::{parse_alignment, read_alignment};
pub use config::{parse_properties, read_config, to_properties, write_config, write_config_json};
pub use error::FormatError;
pub use newick::to_newick;
