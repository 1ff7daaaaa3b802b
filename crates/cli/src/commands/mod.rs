// CLI command implementations

pub mod run;
pub mod validate;
