use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::ViewerError;
use crate::generator::Generator;
use crate::types::{TextureHandle, WindowId};

static INSTANCE_LIVE: AtomicBool = AtomicBool::new(false);

/// Claim on the single viewer slot of the process; released on drop.
pub(crate) struct InstanceGuard(());

impl InstanceGuard {
    pub(crate) fn acquire() -> Result<Self, ViewerError> {
        INSTANCE_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(()))
            .map_err(|_| ViewerError::AlreadyInitialized)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_LIVE.store(false, Ordering::Release);
    }
}

/// Mutable record shared by the frame pipeline, the input handler and the
/// instrumentation callback.
///
/// The generator is borrowed for the lifetime of the viewer and outlives it.
pub struct ViewerState<'g, G: Generator> {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) window: Option<WindowId>,
    pub(crate) generator: &'g mut G,
    pub(crate) texture: Option<TextureHandle>,
    pub(crate) rendering_enabled: bool,
    pub(crate) frame_count: u64,
    pub(crate) timing_anchor: Instant,
}

impl<'g, G: Generator> ViewerState<'g, G> {
    pub(crate) fn new(generator: &'g mut G, timing_anchor: Instant) -> Result<Self, ViewerError> {
        let (width, height) = (generator.width(), generator.height());
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            window: None,
            generator,
            texture: None,
            rendering_enabled: true,
            frame_count: 0,
            timing_anchor,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    pub fn generator(&self) -> &G {
        &*self.generator
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn rendering_enabled(&self) -> bool {
        self.rendering_enabled
    }

    /// Frames produced since the last instrumentation reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn timing_anchor(&self) -> Instant {
        self.timing_anchor
    }
}

impl<G: Generator> fmt::Debug for ViewerState<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerState")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("window", &self.window)
            .field("generator", &self.generator.name())
            .field("order", &self.generator.order())
            .field("texture", &self.texture)
            .field("rendering_enabled", &self.rendering_enabled)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

/// Serialises unit tests that claim the process-wide viewer slot.
#[cfg(test)]
pub(crate) fn instance_test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_second_claim_until_released() {
        let _lock = instance_test_lock();
        let first = InstanceGuard::acquire().expect("first claim");
        assert!(matches!(
            InstanceGuard::acquire(),
            Err(ViewerError::AlreadyInitialized)
        ));
        drop(first);
        let again = InstanceGuard::acquire().expect("claim after release");
        drop(again);
    }
}
