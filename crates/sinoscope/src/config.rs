use crate::error::SinoscopeError;

/// Parameters of the generated field.
#[derive(Debug, Clone, PartialEq)]
pub struct SinoscopeConfig {
    /// Image size in pixels.
    pub width: u32,
    pub height: u32,
    /// Highest term of the series; only odd terms contribute.
    pub order: u32,
    /// Field values per colour band.
    pub interval: u32,
    /// Time added to the field on every frame.
    pub time_step: f32,
    pub phase0: f32,
    pub phase1: f32,
}

impl Default for SinoscopeConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            order: 3,
            interval: 50,
            time_step: 1.0 / 20.0,
            phase0: 0.5,
            phase1: 0.75,
        }
    }
}

impl SinoscopeConfig {
    pub(crate) fn validate(&self) -> Result<(), SinoscopeError> {
        if self.width == 0 || self.height == 0 {
            return Err(SinoscopeError::InvalidConfig(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.order == 0 {
            return Err(SinoscopeError::InvalidConfig(
                "order must be at least 1".to_string(),
            ));
        }
        if self.interval == 0 {
            return Err(SinoscopeError::InvalidConfig(
                "colour interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
