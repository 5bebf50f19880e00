use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{debug, info, trace, warn};
use viewer::{
    BackendError, EventHandler, GraphicsBackend, LoopEvent, ViewerError, WindowContext, WindowId,
    WindowSpec, WindowSystem,
};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use winit::keyboard::{Key, NamedKey};
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;

/// Window system backed by a winit event loop and a wgpu surface.
///
/// The loop polls: every idle turn is reported to the handler, which asks
/// for a redraw, so frames are produced back to back.
pub struct WinitWindowSystem {
    // Declared before `window` so the surface is released first.
    gpu: Option<GpuState>,
    window: Option<Arc<Window>>,
    event_loop: EventLoop<()>,
    timer: Option<Instant>,
}

impl WinitWindowSystem {
    pub fn new() -> anyhow::Result<Self> {
        let event_loop = EventLoopBuilder::new()
            .build()
            .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
        Ok(Self {
            gpu: None,
            window: None,
            event_loop,
            timer: None,
        })
    }
}

impl WindowSystem for WinitWindowSystem {
    fn screen_size(&self) -> Result<(u32, u32), ViewerError> {
        let monitor = self
            .event_loop
            .primary_monitor()
            .or_else(|| self.event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available to place the window on"))?;
        let size = monitor.size();
        Ok((size.width, size.height))
    }

    fn open_window(&mut self, spec: &WindowSpec) -> Result<WindowId, ViewerError> {
        let size = PhysicalSize::new(spec.size.0, spec.size.1);
        let window = WindowBuilder::new()
            .with_title(spec.title.clone())
            .with_inner_size(size)
            .with_position(PhysicalPosition::new(spec.position.0, spec.position.1))
            .build(&self.event_loop)
            .map_err(|err| anyhow!("failed to create viewer window: {err}"))?;
        let window = Arc::new(window);

        let gpu = GpuState::new(window.clone(), size, spec.vsync)
            .map_err(|err| err.context("failed to initialise window renderer"))?;
        let id = WindowId(u64::from(window.id()));
        debug!(?id, title = %spec.title, "window created");

        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(id)
    }

    fn schedule_timer(&mut self, delay: Duration) {
        self.timer = Some(Instant::now() + delay);
    }

    fn run(&mut self, handler: &mut dyn EventHandler) -> Result<(), ViewerError> {
        let Self {
            gpu,
            window,
            event_loop,
            timer,
        } = self;
        let (Some(gpu), Some(window)) = (gpu.as_mut(), window.as_ref()) else {
            return Err(anyhow!("run called before a window was opened").into());
        };
        let window_id = WindowId(u64::from(window.id()));

        event_loop
            .run_on_demand(|event, elwt| {
                elwt.set_control_flow(ControlFlow::Poll);
                let mut ctx = LoopContext {
                    gpu: &mut *gpu,
                    window: window.as_ref(),
                    window_id,
                    timer: &mut *timer,
                    exit: false,
                };

                match event {
                    Event::WindowEvent { window_id: id, event } if id == window.id() => {
                        match event {
                            WindowEvent::CloseRequested => {
                                handler.handle(LoopEvent::CloseRequested, &mut ctx);
                            }
                            WindowEvent::Resized(size) => {
                                ctx.gpu.resize(size);
                                handler.handle(
                                    LoopEvent::Resized {
                                        width: size.width,
                                        height: size.height,
                                    },
                                    &mut ctx,
                                );
                            }
                            WindowEvent::KeyboardInput { event, .. } => {
                                if event.state == ElementState::Pressed && !event.repeat {
                                    if let Some(key) = key_char(&event.logical_key) {
                                        handler.handle(LoopEvent::Key(key), &mut ctx);
                                    }
                                }
                            }
                            WindowEvent::RedrawRequested => {
                                handler.handle(LoopEvent::Redraw, &mut ctx);
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        let now = Instant::now();
                        if ctx.timer.is_some_and(|deadline| deadline <= now) {
                            *ctx.timer = None;
                            trace!("timer elapsed");
                            handler.handle(LoopEvent::Timer, &mut ctx);
                        }
                        if !ctx.exit {
                            handler.handle(LoopEvent::Idle, &mut ctx);
                        }
                    }
                    _ => {}
                }

                if ctx.exit {
                    elwt.exit();
                }
            })
            .map_err(|err| anyhow!("window event loop error: {err}"))?;

        info!("window event loop finished");
        Ok(())
    }
}

/// Context handed to the handler for the duration of one event.
struct LoopContext<'a> {
    gpu: &'a mut GpuState,
    window: &'a Window,
    window_id: WindowId,
    timer: &'a mut Option<Instant>,
    exit: bool,
}

impl WindowContext for LoopContext<'_> {
    fn graphics(&mut self) -> &mut dyn GraphicsBackend {
        &mut *self.gpu
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.gpu.present()
    }

    fn request_redraw(&mut self, window: WindowId) {
        if window == self.window_id {
            self.window.request_redraw();
        }
    }

    fn request_resize(&mut self, window: WindowId, width: u32, height: u32) {
        if window != self.window_id {
            return;
        }
        let requested = PhysicalSize::new(width, height);
        if self.window.inner_size() != requested
            && self.window.request_inner_size(requested).is_none()
        {
            trace!(width, height, "resize will be applied asynchronously");
        }
    }

    fn schedule_timer(&mut self, delay: Duration) {
        *self.timer = Some(Instant::now() + delay);
    }

    fn exit(&mut self) {
        self.exit = true;
    }
}

/// Character produced by a key press, for keys the viewer can bind.
fn key_char(key: &Key) -> Option<char> {
    match key {
        Key::Character(value) => {
            let mut chars = value.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                warn!(%value, "ignoring multi-character key");
                return None;
            }
            Some(ch)
        }
        Key::Named(NamedKey::Space) => Some(' '),
        _ => None,
    }
}
