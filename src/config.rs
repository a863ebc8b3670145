//! Engine configuration: the recognized options from the external
//! interfaces contract, all with defaults, loadable from a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Bindless resource manager growth policy and descriptor heap sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    pub initial_bindless_capacity: u32,
    pub max_bindless_capacity: u32,
    pub growth_factor: u32,
    pub rtv_heap_capacity: u32,
    pub dsv_heap_capacity: u32,
    pub sampler_heap_capacity: u32,
    pub base_color_texture_count: u32,
    pub shadow_color_count: u32,
    pub shadow_resolution: u32,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            initial_bindless_capacity: crate::constants::bindless_defaults::INITIAL_CAPACITY,
            max_bindless_capacity: crate::constants::bindless_defaults::MAX_CAPACITY,
            growth_factor: crate::constants::bindless_defaults::GROWTH_FACTOR,
            rtv_heap_capacity: crate::constants::descriptor_heap_defaults::RTV_CAPACITY,
            dsv_heap_capacity: crate::constants::descriptor_heap_defaults::DSV_CAPACITY,
            sampler_heap_capacity: crate::constants::descriptor_heap_defaults::SAMPLER_CAPACITY,
            base_color_texture_count: 16,
            shadow_color_count: crate::constants::SHADOW_FLIP_COUNT as u32,
            shadow_resolution: crate::constants::DEFAULT_SHADOW_RESOLUTION,
        }
    }
}

impl GpuConfig {
    fn validate(&self) -> EngineResult<()> {
        if !matches!(self.shadow_resolution, 1024 | 2048 | 4096) {
            return Err(EngineError::InvalidConfig {
                field: "shadow_resolution".to_string(),
                value: self.shadow_resolution.to_string(),
                reason: "must be one of 1024, 2048, 4096".to_string(),
            });
        }
        if self.max_bindless_capacity < self.initial_bindless_capacity {
            return Err(EngineError::InvalidConfig {
                field: "max_bindless_capacity".to_string(),
                value: self.max_bindless_capacity.to_string(),
                reason: "must be >= initial_bindless_capacity".to_string(),
            });
        }
        if self.growth_factor < 2 {
            return Err(EngineError::InvalidConfig {
                field: "growth_factor".to_string(),
                value: self.growth_factor.to_string(),
                reason: "must be >= 2".to_string(),
            });
        }
        Ok(())
    }
}

/// Worker pool sizing for mesh and chunk-gen jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// 0 means "use all available cores", matching `default_worker_pool`.
    pub worker_pool_size: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { worker_pool_size: 0 }
    }
}

/// Top-level engine configuration, loadable from TOML. All fields have
/// engine-sane defaults so an empty file is valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gpu: GpuConfig,
    pub worker_pool: WorkerPoolConfig,
    pub min_ambient_skylight: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gpu: GpuConfig::default(),
            worker_pool: WorkerPoolConfig::default(),
            min_ambient_skylight: crate::constants::MIN_AMBIENT_SKYLIGHT,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.gpu.validate()?;
        if !(0.0..=1.0).contains(&self.min_ambient_skylight) {
            return Err(EngineError::InvalidConfig {
                field: "min_ambient_skylight".to_string(),
                value: self.min_ambient_skylight.to_string(),
                reason: "must be in 0.0..=1.0".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(text).map_err(|e| EngineError::InvalidConfig {
            field: "<root>".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| EngineError::IoError {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn rejects_non_standard_shadow_resolution() {
        let config = EngineConfig {
            gpu: GpuConfig {
                shadow_resolution: 777,
                ..GpuConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str("min_ambient_skylight = 0.1\n").unwrap();
        assert_eq!(config.min_ambient_skylight, 0.1);
        assert_eq!(config.gpu, GpuConfig::default());
    }
}
