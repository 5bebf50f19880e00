use std::time::Duration;

use crate::error::{BackendError, ViewerError};
use crate::types::{Filter, TextureHandle, TexturedVertex, WindowId, WindowSpec};

/// Immediate-mode drawing operations the frame pipeline relies on.
///
/// Every call reports its own failure so the pipeline can abort the rest of
/// the frame at the first broken step.
pub trait GraphicsBackend {
    fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Maps the unit square `0..1 x 0..1` onto the viewport.
    fn load_unit_projection(&mut self) -> Result<(), BackendError>;

    fn clear(&mut self, color: [f32; 4]) -> Result<(), BackendError>;

    fn create_texture(&mut self) -> Result<TextureHandle, BackendError>;

    /// Replaces the texture contents with a row-major RGB image.
    fn upload_rgb(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        pixels: &[u8],
        filter: Filter,
    ) -> Result<(), BackendError>;

    fn draw_quad(
        &mut self,
        texture: TextureHandle,
        vertices: &[TexturedVertex; 4],
    ) -> Result<(), BackendError>;
}

/// Events the run loop dispatches, strictly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// The loop has nothing else pending.
    Idle,
    /// The window contents should be redrawn.
    Redraw,
    /// A timer armed with `schedule_timer` elapsed.
    Timer,
    /// A key producing this character was pressed.
    Key(char),
    /// The window system reports a new window size.
    Resized { width: u32, height: u32 },
    /// The user asked to close the window.
    CloseRequested,
}

/// Window-system facilities available while an event is being handled.
pub trait WindowContext {
    fn graphics(&mut self) -> &mut dyn GraphicsBackend;

    /// Presents the back buffer.
    fn swap_buffers(&mut self) -> Result<(), BackendError>;

    fn request_redraw(&mut self, window: WindowId);

    fn request_resize(&mut self, window: WindowId, width: u32, height: u32);

    /// Arms a one-shot [`LoopEvent::Timer`] after `delay`.
    fn schedule_timer(&mut self, delay: Duration);

    /// Leaves the run loop once the current event has been handled.
    fn exit(&mut self);
}

/// Receiver of loop events.
pub trait EventHandler {
    fn handle(&mut self, event: LoopEvent, ctx: &mut dyn WindowContext);
}

/// Owner of the OS window and the blocking event loop.
pub trait WindowSystem {
    /// Available screen dimensions in pixels.
    fn screen_size(&self) -> Result<(u32, u32), ViewerError>;

    fn open_window(&mut self, spec: &WindowSpec) -> Result<WindowId, ViewerError>;

    /// Arms a one-shot timer before the loop starts.
    fn schedule_timer(&mut self, delay: Duration);

    /// Runs the loop until an exit is requested.
    fn run(&mut self, handler: &mut dyn EventHandler) -> Result<(), ViewerError>;
}
