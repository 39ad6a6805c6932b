//! Configuration access port trait.
//!
//! Values come back as raw strings; typed parsing and defaults live in
//! `domain::config_validation`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Names of all sections, sorted.
    fn sections(&self) -> Vec<String>;
}
