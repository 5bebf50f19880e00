//! wgpu plumbing behind the viewer's graphics calls.
//!
//! - `context` owns the instance, device and surface and rebuilds the
//!   swapchain when the window resizes or the surface is lost.
//! - `pipeline` builds the textured-quad render pipeline.
//! - `state` records the calls of one frame and encodes them into a single
//!   render pass when the frame is presented.

mod context;
mod pipeline;
mod state;

pub(crate) use state::GpuState;
