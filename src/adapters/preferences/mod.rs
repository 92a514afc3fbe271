//! Preference store adapters.

mod in_memory;
mod yaml_file;

pub use in_memory::InMemoryPreferenceStore;
pub use yaml_file::YamlPreferenceStore;
