//! Per-session state.
//!
//! Sessions carry string-keyed variables that steer planning. The only
//! variable the engine currently interprets is
//! `vector_index_match_method`; unknown variables are stored but ignored.

use std::collections::HashMap;

use crate::config::Config;

/// Session variable controlling vector index selection (see the optimizer).
pub const VECTOR_INDEX_MATCH_METHOD: &str = "vector_index_match_method";

#[derive(Debug, Clone, Default)]
pub struct Session {
    vars: HashMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed session defaults from engine configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new();
        session.set_variable(
            VECTOR_INDEX_MATCH_METHOD,
            config.session.vector_index_match_method.clone(),
        );
        session
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get_variable(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// The index match method; unset behaves as `"default"`.
    pub fn vector_index_match_method(&self) -> &str {
        self.get_variable(VECTOR_INDEX_MATCH_METHOD).unwrap_or("")
    }
}
