pub mod prepare_env;
pub mod sinks;
