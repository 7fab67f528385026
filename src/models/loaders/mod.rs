pub mod toml_loader;

pub use toml_loader::{load_all_criteria, load_criteria_file};
