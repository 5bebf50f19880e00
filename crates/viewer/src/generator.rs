use std::fmt;

/// Error returned by a generator variant that failed to fill its buffer.
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The fixed family of pixel-filling algorithms a generator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    /// Single-threaded reference implementation.
    #[default]
    Serial,
    /// Data-parallel implementation across CPU cores.
    ParallelCpu,
    /// GPU-accelerated implementation.
    ParallelGpu,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Serial, Variant::ParallelCpu, Variant::ParallelGpu];

    /// Display label written to the generator when the variant is selected.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Serial => "serial",
            Variant::ParallelCpu => "openmp",
            Variant::ParallelGpu => "opencl",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contract the viewer consumes from the image generator.
///
/// The generator owns its pixel buffer: row-major RGB, three bytes per pixel,
/// `width * height * 3` bytes, valid for reading right after
/// [`generate`](Generator::generate) succeeds.
pub trait Generator {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn name(&self) -> &str;
    fn set_name(&mut self, name: &'static str);

    /// The algorithm [`generate`](Generator::generate) runs.
    fn variant(&self) -> Variant;
    fn set_variant(&mut self, variant: Variant);

    /// Tuning parameter controlling computational detail; always >= 1.
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);

    /// Refreshes the field bounds ahead of the next
    /// [`generate`](Generator::generate) call.
    fn recompute_bounds(&mut self) -> Result<(), GeneratorError>;

    /// Runs the currently selected variant into the pixel buffer.
    fn generate(&mut self) -> Result<(), GeneratorError>;

    fn buffer(&self) -> &[u8];
}
