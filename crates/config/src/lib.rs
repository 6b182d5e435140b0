//! Configuration for the portico gateway.
//!
//! Settings come from two layers: an optional `portico.{toml,yaml,yml,json}`
//! file (with `${ENV_VAR}` placeholder substitution) and environment
//! variables, which always win. Secrets carry no embedded defaults and are
//! checked at startup via [`PorticoConfig::validate`].

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config, set_config_dir},
    schema::{ConfigError, PorticoConfig},
};
