//! Registered names of the default stages.

pub const PLANNING: &str = "planning";
pub const RESEARCH: &str = "research";
pub const WRITING: &str = "writing";
pub const METADATA: &str = "metadata";
pub const EXPORT: &str = "export";
