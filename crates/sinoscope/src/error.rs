#[derive(Debug, thiserror::Error)]
pub enum SinoscopeError {
    #[error("invalid sinoscope configuration: {0}")]
    InvalidConfig(String),
    #[error("GPU unavailable: {0}")]
    GpuUnavailable(String),
    #[error("GPU compute failed: {0}")]
    Gpu(String),
}

impl SinoscopeError {
    /// A failed dispatch or readback can leave the readback buffer with a map
    /// still pending, so the kernel that produced it must not run again.
    pub(crate) fn invalidates_kernel(&self) -> bool {
        matches!(self, SinoscopeError::Gpu(_))
    }
}
