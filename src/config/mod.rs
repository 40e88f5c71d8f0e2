//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{load_config_file, load_default_config, save_config, save_default_config};
pub use paths::{config_dir, config_file_path, output_dir};
pub use types::{Config, DefaultsConfig, LabelColor, ModelConfig, OutputConfig, OverlayConfig};
pub use validate::{validate_config, validate_model_config};
