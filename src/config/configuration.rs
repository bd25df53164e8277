use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MIN_GRAM: usize = 1;
pub const DEFAULT_MAX_GRAM: usize = 2;
// 4kb, one linux memory page worth of chars
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Raw, unvalidated gram settings as a host hands them over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GramSettings {
    pub min_gram: usize,
    pub max_gram: usize,
    pub buffer_size: usize,
}

impl Default for GramSettings {
    fn default() -> Self {
        GramSettings {
            min_gram: DEFAULT_MIN_GRAM,
            max_gram: DEFAULT_MAX_GRAM,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Validated gram bounds plus the size of the segmenter's char buffer.
///
/// A `GramConfig` always satisfies `1 <= min_gram < max_gram <= buffer_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GramSettings")]
pub struct GramConfig {
    min_gram: usize,
    max_gram: usize,
    buffer_size: usize,
}

impl Default for GramConfig {
    fn default() -> Self {
        GramConfig {
            min_gram: DEFAULT_MIN_GRAM,
            max_gram: DEFAULT_MAX_GRAM,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl GramConfig {
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self, ConfigError> {
        Self::with_buffer_size(min_gram, max_gram, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(
        min_gram: usize,
        max_gram: usize,
        buffer_size: usize,
    ) -> Result<Self, ConfigError> {
        if min_gram == 0 {
            return Err(ConfigError::ZeroMinGram { min_gram });
        }
        if min_gram >= max_gram {
            return Err(ConfigError::InvalidGramRange { min_gram, max_gram });
        }
        if buffer_size < max_gram {
            return Err(ConfigError::BufferTooSmall {
                buffer_size,
                max_gram,
            });
        }
        Ok(GramConfig {
            min_gram,
            max_gram,
            buffer_size,
        })
    }

    /// Parse yaml settings, e.g. `min_gram: 2\nmax_gram: 3`.
    /// Missing keys fall back to the defaults.
    pub fn from_yaml(settings: &str) -> Result<Self, ConfigError> {
        let settings: GramSettings = serde_yaml::from_str(settings)?;
        Self::try_from(settings)
    }

    pub fn min_gram(&self) -> usize {
        self.min_gram
    }

    pub fn max_gram(&self) -> usize {
        self.max_gram
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl TryFrom<GramSettings> for GramConfig {
    type Error = ConfigError;

    fn try_from(settings: GramSettings) -> Result<Self, Self::Error> {
        GramConfig::with_buffer_size(
            settings.min_gram,
            settings.max_gram,
            settings.buffer_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_two_gram() {
        let cfg = GramConfig::default();
        assert_eq!(cfg.min_gram(), 1);
        assert_eq!(cfg.max_gram(), 2);
        assert_eq!(cfg.buffer_size(), 4096);
        assert_eq!(GramConfig::try_from(GramSettings::default()).unwrap(), cfg);
    }

    #[test]
    fn rejects_invalid_bounds() {
        assert!(matches!(
            GramConfig::new(2, 2),
            Err(ConfigError::InvalidGramRange {
                min_gram: 2,
                max_gram: 2
            })
        ));
        assert!(matches!(
            GramConfig::new(3, 1),
            Err(ConfigError::InvalidGramRange { .. })
        ));
        assert!(matches!(
            GramConfig::new(0, 2),
            Err(ConfigError::ZeroMinGram { .. })
        ));
        assert!(matches!(
            GramConfig::with_buffer_size(1, 8, 7),
            Err(ConfigError::BufferTooSmall {
                buffer_size: 7,
                max_gram: 8
            })
        ));
        assert!(GramConfig::with_buffer_size(1, 8, 8).is_ok());
    }

    #[test]
    fn yaml_keys_are_not_swapped() {
        let cfg = GramConfig::from_yaml("min_gram: 2\nmax_gram: 5\n").unwrap();
        assert_eq!(cfg.min_gram(), 2);
        assert_eq!(cfg.max_gram(), 5);
        assert_eq!(cfg.buffer_size(), DEFAULT_BUFFER_SIZE);

        let cfg = GramConfig::from_yaml("max_gram: 3").unwrap();
        assert_eq!((cfg.min_gram(), cfg.max_gram()), (1, 3));
    }

    #[test]
    fn yaml_validation() {
        assert!(matches!(
            GramConfig::from_yaml("min_gram: 4\nmax_gram: 2"),
            Err(ConfigError::InvalidGramRange { .. })
        ));
        assert!(matches!(
            GramConfig::from_yaml("min: 1"),
            Err(ConfigError::Settings(_))
        ));
        // deserializing the config directly goes through the same checks
        assert!(serde_yaml::from_str::<GramConfig>("min_gram: 3\nmax_gram: 3").is_err());
        let cfg: GramConfig = serde_yaml::from_str("buffer_size: 16").unwrap();
        assert_eq!(cfg.buffer_size(), 16);
    }
}
