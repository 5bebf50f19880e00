//! Runtime core of the sinoscope viewer.
//!
//! The crate owns the state machine that sits between an image generator and
//! a window: it decides when a frame is produced, how the pixel buffer reaches
//! the screen, how often throughput is reported, and how key presses
//! reconfigure the generator while the loop is running. The overall flow is:
//!
//! ```text
//!   Viewer::initialize(&mut generator)
//!          │
//!          ▼
//!   Viewer::open ──▶ WindowSystem::run ──▶ LoopEvent ──▶ Viewer (EventHandler)
//!                                                          │
//!          ┌───────────────┬──────────────┬────────────────┼──────────────┐
//!          ▼               ▼              ▼                ▼              ▼
//!     frame pipeline   instrumentation  commands        resize        close/quit
//!     setup ─▶ generate ─▶ upload/draw ─▶ present
//! ```
//!
//! Platform concerns stay behind three traits so the state machine can be
//! driven by a real winit/wgpu backend or by scripted fakes in tests:
//! [`Generator`] fills the pixel buffer, [`GraphicsBackend`] uploads and draws
//! it, and [`WindowSystem`] owns the window and dispatches [`LoopEvent`]s one
//! at a time to an [`EventHandler`].

mod backend;
mod command;
mod error;
mod frame;
mod generator;
mod instrument;
mod state;
mod timing;
mod types;
mod viewer;

pub use backend::{EventHandler, GraphicsBackend, LoopEvent, WindowContext, WindowSystem};
pub use command::{Command, CommandEffect};
pub use error::{BackendError, ViewerError};
pub use frame::{FrameOutcome, FrameStage};
pub use generator::{Generator, GeneratorError, Variant};
pub use instrument::FpsReport;
pub use state::ViewerState;
pub use timing::{elapsed_seconds, BoxedClock, Clock, MonotonicClock};
pub use types::{
    centered_position, Filter, TextureHandle, TexturedVertex, ViewerConfig, WindowId, WindowSpec,
    UNIT_QUAD,
};
pub use viewer::Viewer;
