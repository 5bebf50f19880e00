#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use viewer::{
    BackendError, Clock, EventHandler, Filter, Generator, GeneratorError, GraphicsBackend,
    LoopEvent, TextureHandle, TexturedVertex, ViewerError, Variant, WindowContext, WindowId,
    WindowSpec, WindowSystem,
};

/// Only one viewer may be alive per process, so tests take turns.
pub fn lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct CountingGenerator {
    pub width: u32,
    pub height: u32,
    pub name: &'static str,
    pub variant: Variant,
    pub order: u32,
    pub buffer: Vec<u8>,
    pub bounds_calls: usize,
    pub runs: Vec<Variant>,
    pub fail_variant: Option<Variant>,
}

impl CountingGenerator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            name: "serial",
            variant: Variant::Serial,
            order: 3,
            buffer: vec![0; (width * height * 3) as usize],
            bounds_calls: 0,
            runs: Vec::new(),
            fail_variant: None,
        }
    }
}

impl Generator for CountingGenerator {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn name(&self) -> &str {
        self.name
    }
    fn set_name(&mut self, name: &'static str) {
        self.name = name;
    }
    fn variant(&self) -> Variant {
        self.variant
    }
    fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
    fn recompute_bounds(&mut self) -> Result<(), GeneratorError> {
        self.bounds_calls += 1;
        Ok(())
    }
    fn generate(&mut self) -> Result<(), GeneratorError> {
        if self.fail_variant == Some(self.variant) {
            return Err(format!("{} variant unavailable", self.variant).into());
        }
        self.runs.push(self.variant);
        let shade = (self.runs.len() % 256) as u8;
        self.buffer.fill(shade);
        Ok(())
    }
    fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub texture: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub filter: Filter,
}

#[derive(Default)]
pub struct RecordingGraphics {
    pub viewports: Vec<(u32, u32)>,
    pub clears: Vec<[f32; 4]>,
    pub textures_created: u32,
    pub uploads: Vec<Upload>,
    pub draws: Vec<(TextureHandle, [TexturedVertex; 4])>,
    pub fail_call: Option<&'static str>,
}

impl RecordingGraphics {
    fn check(&self, call: &'static str) -> Result<(), BackendError> {
        if self.fail_call == Some(call) {
            Err(BackendError::new(call, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl GraphicsBackend for RecordingGraphics {
    fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.check("set_viewport")?;
        self.viewports.push((width, height));
        Ok(())
    }

    fn load_unit_projection(&mut self) -> Result<(), BackendError> {
        self.check("load_unit_projection")
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), BackendError> {
        self.check("clear")?;
        self.clears.push(color);
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureHandle, BackendError> {
        self.check("create_texture")?;
        self.textures_created += 1;
        Ok(TextureHandle(self.textures_created))
    }

    fn upload_rgb(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        pixels: &[u8],
        filter: Filter,
    ) -> Result<(), BackendError> {
        self.check("upload_rgb")?;
        self.uploads.push(Upload {
            texture,
            width,
            height,
            bytes: pixels.len(),
            filter,
        });
        Ok(())
    }

    fn draw_quad(
        &mut self,
        texture: TextureHandle,
        vertices: &[TexturedVertex; 4],
    ) -> Result<(), BackendError> {
        self.check("draw_quad")?;
        self.draws.push((texture, *vertices));
        Ok(())
    }
}

/// Window system that replays a fixed queue of events.
pub struct ScriptedSystem {
    pub screen: (u32, u32),
    pub events: VecDeque<LoopEvent>,
    pub graphics: RecordingGraphics,
    pub opened: Vec<WindowSpec>,
    pub timers: Vec<Duration>,
    pub swaps: usize,
    pub redraws: Vec<WindowId>,
    pub resizes: Vec<(WindowId, u32, u32)>,
    pub exited: bool,
    pub dispatched: usize,
}

impl ScriptedSystem {
    pub fn new(events: impl IntoIterator<Item = LoopEvent>) -> Self {
        Self {
            screen: (1920, 1080),
            events: events.into_iter().collect(),
            graphics: RecordingGraphics::default(),
            opened: Vec::new(),
            timers: Vec::new(),
            swaps: 0,
            redraws: Vec::new(),
            resizes: Vec::new(),
            exited: false,
            dispatched: 0,
        }
    }
}

impl WindowContext for ScriptedSystem {
    fn graphics(&mut self) -> &mut dyn GraphicsBackend {
        &mut self.graphics
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.swaps += 1;
        Ok(())
    }

    fn request_redraw(&mut self, window: WindowId) {
        self.redraws.push(window);
    }

    fn request_resize(&mut self, window: WindowId, width: u32, height: u32) {
        self.resizes.push((window, width, height));
    }

    fn schedule_timer(&mut self, delay: Duration) {
        self.timers.push(delay);
    }

    fn exit(&mut self) {
        self.exited = true;
    }
}

impl WindowSystem for ScriptedSystem {
    fn screen_size(&self) -> Result<(u32, u32), ViewerError> {
        Ok(self.screen)
    }

    fn open_window(&mut self, spec: &WindowSpec) -> Result<WindowId, ViewerError> {
        self.opened.push(spec.clone());
        Ok(WindowId(7))
    }

    fn schedule_timer(&mut self, delay: Duration) {
        self.timers.push(delay);
    }

    fn run(&mut self, handler: &mut dyn EventHandler) -> Result<(), ViewerError> {
        while !self.exited {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            self.dispatched += 1;
            handler.handle(event, self);
        }
        Ok(())
    }
}

/// Clock whose time only moves when a test says so.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<Option<Instant>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Some(Instant::now()))),
        }
    }

    pub fn advance(&self, by: Duration) {
        let now = self.now.get().expect("clock available");
        self.now.set(Some(now + by));
    }

    pub fn current(&self) -> Instant {
        self.now.get().expect("clock available")
    }

    pub fn set_available(&self, available: bool, at: Instant) {
        self.now.set(if available { Some(at) } else { None });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<Instant, ViewerError> {
        self.now.get().ok_or(ViewerError::ClockUnavailable)
    }
}
