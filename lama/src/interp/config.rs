//! Interpreter configuration

/// Default limit on nested closure calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100_000;

/// Runtime limits and builtin behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Calls nested deeper than this fail with a stack overflow error
    pub max_call_depth: usize,
    /// Printed by `read()` before each line; `None` reads silently
    pub read_prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            read_prompt: Some("> ".to_string()),
        }
    }
}

impl Config {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn without_prompt(mut self) -> Self {
        self.read_prompt = None;
        self
    }
}
