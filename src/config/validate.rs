//! Configuration validation.

use crate::config::{Config, ModelConfig};
use crate::constants::{confidence, frame_skip};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_defaults(config)?;
    validate_model_settings(&config.model)?;
    validate_overlay(config)?;
    Ok(())
}

/// Validate default run settings.
fn validate_defaults(config: &Config) -> Result<()> {
    let defaults = &config.defaults;

    if !(confidence::MIN..=confidence::MAX).contains(&defaults.confidence_threshold) {
        return Err(Error::ConfigValidation {
            message: format!(
                "confidence_threshold must be between {} and {}, got {}",
                confidence::MIN,
                confidence::MAX,
                defaults.confidence_threshold
            ),
        });
    }

    if defaults.frame_skip < frame_skip::MIN {
        return Err(Error::ConfigValidation {
            message: format!(
                "frame_skip must be at least {}, got {}",
                frame_skip::MIN,
                defaults.frame_skip
            ),
        });
    }

    Ok(())
}

/// Validate numeric model settings (file existence is checked separately).
fn validate_model_settings(model: &ModelConfig) -> Result<()> {
    if model.input_size == 0 {
        return Err(Error::ConfigValidation {
            message: "model.input_size must be positive".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&model.iou_threshold) {
        return Err(Error::ConfigValidation {
            message: format!(
                "model.iou_threshold must be between 0 and 1, got {}",
                model.iou_threshold
            ),
        });
    }

    if model.threads == 0 {
        return Err(Error::ConfigValidation {
            message: "model.threads must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Validate overlay settings.
fn validate_overlay(config: &Config) -> Result<()> {
    let overlay = &config.overlay;

    if overlay.labels.is_empty() {
        return Err(Error::ConfigValidation {
            message: "overlay.labels must name at least one watched label".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for label in &overlay.labels {
        if label.name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "overlay.labels entries need a non-empty name".to_string(),
            });
        }
        if !seen.insert(label.name.as_str()) {
            return Err(Error::ConfigValidation {
                message: format!("overlay label '{}' is listed twice", label.name),
            });
        }
    }

    if overlay.box_thickness == 0 {
        return Err(Error::ConfigValidation {
            message: "overlay.box_thickness must be at least 1".to_string(),
        });
    }

    if !overlay.text_scale.is_finite() || overlay.text_scale <= 0.0 {
        return Err(Error::ConfigValidation {
            message: format!(
                "overlay.text_scale must be positive, got {}",
                overlay.text_scale
            ),
        });
    }

    Ok(())
}

/// Check that the model and labels files exist.
pub fn validate_model_config(model: &ModelConfig) -> Result<()> {
    if !model.path.exists() {
        return Err(Error::ModelFileNotFound {
            path: model.path.clone(),
        });
    }

    if !model.labels.exists() {
        return Err(Error::LabelsFileNotFound {
            path: model.labels.clone(),
        });
    }

    Ok(())
}
