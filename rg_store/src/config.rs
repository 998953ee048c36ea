use serde::Deserialize;

///
/// World sizing hints. None of these are hard limits.
///
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity directory slots reserved up front
    pub capacity_hint: usize,
    /// Rows reserved in every newly created archetype
    pub archetype_capacity: usize,
    pub removal_queue_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            capacity_hint: 1024,
            archetype_capacity: 0,
            removal_queue_capacity: 64,
        }
    }
}

impl WorldConfig {
    pub fn with_capacity_hint(capacity_hint: usize) -> Self {
        WorldConfig {
            capacity_hint,
            ..Default::default()
        }
    }

    /// Parses config from TOML, missing keys take default values
    pub fn from_toml_str(value: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(value)
    }
}
