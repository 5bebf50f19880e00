use tracing::{debug, error, info, trace, warn};

use crate::backend::{EventHandler, LoopEvent, WindowContext, WindowSystem};
use crate::command::{self, Command, CommandEffect};
use crate::error::ViewerError;
use crate::frame::{self, FrameOutcome};
use crate::generator::Generator;
use crate::instrument::{self, FpsReport};
use crate::state::{InstanceGuard, ViewerState};
use crate::timing::{BoxedClock, MonotonicClock};
use crate::types::{centered_position, ViewerConfig, WindowSpec};

/// The single live viewer of the process.
///
/// Constructed by [`Viewer::initialize`], driven by [`Viewer::open`], and
/// released by [`Viewer::shutdown`] or by dropping it. A second viewer cannot
/// be created while one is alive.
pub struct Viewer<'g, G: Generator> {
    state: ViewerState<'g, G>,
    config: ViewerConfig,
    clock: BoxedClock,
    _instance: InstanceGuard,
}

impl<'g, G: Generator> Viewer<'g, G> {
    /// Creates the viewer with the default configuration and the monotonic
    /// system clock.
    pub fn initialize(generator: &'g mut G) -> Result<Self, ViewerError> {
        Self::with_config(generator, ViewerConfig::default(), Box::new(MonotonicClock::new()))
    }

    /// Creates the viewer, failing with [`ViewerError::AlreadyInitialized`]
    /// while another viewer is alive.
    pub fn with_config(
        generator: &'g mut G,
        config: ViewerConfig,
        clock: BoxedClock,
    ) -> Result<Self, ViewerError> {
        let instance = InstanceGuard::acquire()?;
        let anchor = clock.now()?;
        let state = ViewerState::new(generator, anchor)?;
        debug!(
            width = state.width,
            height = state.height,
            generator = state.generator.name(),
            order = state.generator.order(),
            "viewer initialised"
        );
        Ok(Self {
            state,
            config,
            clock,
            _instance: instance,
        })
    }

    /// Releases the viewer. The generator is left untouched.
    pub fn shutdown(self) {
        debug!("viewer shut down");
    }

    pub fn state(&self) -> &ViewerState<'g, G> {
        &self.state
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Creates the centred window, arms the FPS report and blocks in the
    /// window system's event loop until the user quits.
    pub fn open<W>(&mut self, system: &mut W) -> Result<(), ViewerError>
    where
        W: WindowSystem + ?Sized,
    {
        let screen = system.screen_size()?;
        let size = (self.state.width, self.state.height);
        let spec = WindowSpec {
            title: self.config.title.clone(),
            position: centered_position(screen, size),
            size,
            vsync: self.config.vsync,
        };
        let window = system.open_window(&spec)?;
        self.state.window = Some(window);
        info!(
            ?window,
            width = size.0,
            height = size.1,
            x = spec.position.0,
            y = spec.position.1,
            "viewer window opened"
        );

        system.schedule_timer(self.config.report_interval);
        system.run(self)?;
        info!("viewer event loop exited");
        Ok(())
    }

    /// Runs one pass of the frame pipeline and presents the result.
    pub fn render_frame(&mut self, ctx: &mut dyn WindowContext) -> FrameOutcome {
        let outcome = frame::run_frame(&mut self.state, ctx, self.config.clear_color);
        trace!(?outcome, frame_count = self.state.frame_count, "frame finished");
        outcome
    }

    /// Instrumentation callback: re-arms itself, then reports and resets the
    /// frame counter.
    pub fn report_fps(&mut self, ctx: &mut dyn WindowContext) -> Option<FpsReport> {
        ctx.schedule_timer(self.config.report_interval);
        let now = match self.clock.now() {
            Ok(now) => now,
            Err(err) => {
                error!(error = %err, "skipping FPS report");
                return None;
            }
        };
        let report = instrument::close_interval(&mut self.state, now);
        if report.fps().is_none() {
            warn!(frames = report.frames, "FPS interval had zero elapsed time");
        }
        println!("{report}");
        Some(report)
    }

    /// Applies a command and prints its status line.
    pub fn execute(&mut self, command: Command, ctx: &mut dyn WindowContext) -> CommandEffect {
        let effect = command::apply(&mut self.state, command);
        println!("{effect}");
        debug!(?command, ?effect, "command applied");
        if effect == CommandEffect::Exit {
            ctx.exit();
        }
        effect
    }

    /// Input handler: unbound keys are ignored.
    pub fn handle_key(&mut self, key: char, ctx: &mut dyn WindowContext) -> Option<CommandEffect> {
        match Command::from_key(key) {
            Some(command) => Some(self.execute(command, ctx)),
            None => {
                trace!(?key, "ignoring unbound key");
                None
            }
        }
    }

    /// Resize handler: asks the window system for the new size and records
    /// it without waiting for confirmation.
    pub fn handle_resize(&mut self, width: u32, height: u32, ctx: &mut dyn WindowContext) {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring degenerate resize");
            return;
        }
        match self.state.window {
            Some(window) => ctx.request_resize(window, width, height),
            None => warn!("resize received before the window was opened"),
        }
        self.state.width = width;
        self.state.height = height;
    }
}

impl<G: Generator> EventHandler for Viewer<'_, G> {
    fn handle(&mut self, event: LoopEvent, ctx: &mut dyn WindowContext) {
        match event {
            LoopEvent::Idle => {
                if let Some(window) = self.state.window {
                    ctx.request_redraw(window);
                }
            }
            LoopEvent::Redraw => {
                self.render_frame(ctx);
            }
            LoopEvent::Timer => {
                self.report_fps(ctx);
            }
            LoopEvent::Key(key) => {
                self.handle_key(key, ctx);
            }
            LoopEvent::Resized { width, height } => self.handle_resize(width, height, ctx),
            LoopEvent::CloseRequested => {
                self.execute(Command::Quit, ctx);
            }
        }
    }
}
