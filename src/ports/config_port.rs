//! Configuration access port trait.

/// Key lookup over `[section] key = value` configuration.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
