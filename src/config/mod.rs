mod env_overrides;
mod loader;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_env;

pub use schema::{
    Config, ConstraintsConfig, DEFAULT_MAX_REFINEMENT_ATTEMPTS, DEFAULT_MAX_WORD_COUNT,
    DEFAULT_STYLISTIC_QUALIFIER, ProviderConfig, RefinementConfig,
};
