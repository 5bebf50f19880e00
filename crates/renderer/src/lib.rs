//! Desktop backend for the [`viewer`] crate.
//!
//! [`WinitWindowSystem`] implements [`viewer::WindowSystem`] on top of a
//! winit event loop. The window it opens carries a wgpu surface that
//! implements [`viewer::GraphicsBackend`]: the generator's RGB image is
//! uploaded into a texture and drawn across a full-viewport quad, then the
//! swapchain image is presented.

mod gpu;
mod window;

pub use window::WinitWindowSystem;
