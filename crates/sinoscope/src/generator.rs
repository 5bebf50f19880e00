use std::f32::consts::PI;
use std::fmt;

use tracing::{debug, warn};
use viewer::{Generator, GeneratorError, Variant};

use crate::config::SinoscopeConfig;
use crate::cpu;
use crate::error::SinoscopeError;
use crate::field::FieldParams;
use crate::gpu::GpuKernel;

enum GpuSlot {
    Pending,
    Ready(Box<GpuKernel>),
    Unavailable(String),
}

/// The sinusoidal-field generator driven by the viewer.
pub struct Sinoscope {
    params: FieldParams,
    time_step: f32,
    name: &'static str,
    variant: Variant,
    buffer: Vec<u8>,
    gpu: GpuSlot,
}

impl Sinoscope {
    pub fn new(config: SinoscopeConfig) -> Result<Self, SinoscopeError> {
        config.validate()?;
        let len = config.width as usize * config.height as usize * 3;
        let params = FieldParams {
            width: config.width,
            height: config.height,
            order: config.order,
            interval: config.interval,
            dx: 0.0,
            dy: 0.0,
            phase0: config.phase0,
            phase1: config.phase1,
            time: 0.0,
            _padding: [0.0; 3],
        };
        debug!(
            width = config.width,
            height = config.height,
            order = config.order,
            "sinoscope created"
        );
        Ok(Self {
            params,
            time_step: config.time_step,
            name: Variant::Serial.label(),
            variant: Variant::Serial,
            buffer: vec![0; len],
            gpu: GpuSlot::Pending,
        })
    }

    fn gpu_kernel(&mut self) -> Result<&GpuKernel, SinoscopeError> {
        if let GpuSlot::Pending = self.gpu {
            self.gpu = match GpuKernel::new(self.params.width, self.params.height) {
                Ok(kernel) => GpuSlot::Ready(Box::new(kernel)),
                Err(err) => {
                    warn!(error = %err, "GPU variant unavailable");
                    GpuSlot::Unavailable(err.to_string())
                }
            };
        }
        match &self.gpu {
            GpuSlot::Ready(kernel) => Ok(kernel),
            GpuSlot::Unavailable(reason) => Err(SinoscopeError::GpuUnavailable(reason.clone())),
            GpuSlot::Pending => Err(SinoscopeError::GpuUnavailable(
                "GPU kernel was not initialised".to_string(),
            )),
        }
    }
}

impl Sinoscope {
    /// Drops the kernel and its buffers; later GPU frames fail fast.
    fn disable_gpu(&mut self, err: &SinoscopeError) {
        warn!(error = %err, "disabling GPU variant after a failed dispatch");
        self.gpu = GpuSlot::Unavailable(err.to_string());
    }
}

impl fmt::Debug for Sinoscope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gpu = match &self.gpu {
            GpuSlot::Pending => "pending",
            GpuSlot::Ready(_) => "ready",
            GpuSlot::Unavailable(_) => "unavailable",
        };
        f.debug_struct("Sinoscope")
            .field("params", &self.params)
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("gpu", &gpu)
            .finish_non_exhaustive()
    }
}

impl Generator for Sinoscope {
    fn width(&self) -> u32 {
        self.params.width
    }

    fn height(&self) -> u32 {
        self.params.height
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
        self.params.order
    }

    fn set_order(&mut self, order: u32) {
        self.params.order = order.max(1);
    }

    fn recompute_bounds(&mut self) -> Result<(), GeneratorError> {
        self.params.dx = 4.0 * PI / self.params.width as f32;
        self.params.dy = 4.0 * PI / self.params.height as f32;
        self.params.time += self.time_step;
        Ok(())
    }

    fn generate(&mut self) -> Result<(), GeneratorError> {
        match self.variant {
            Variant::Serial => cpu::fill_serial(&self.params, &mut self.buffer),
            Variant::ParallelCpu => cpu::fill_parallel(&self.params, &mut self.buffer),
            Variant::ParallelGpu => {
                let params = self.params;
                let mut buffer = std::mem::take(&mut self.buffer);
                let result = self
                    .gpu_kernel()
                    .and_then(|kernel| kernel.run(&params, &mut buffer));
                self.buffer = buffer;
                if let Err(err) = &result {
                    if err.invalidates_kernel() {
                        self.disable_gpu(err);
                    }
                }
                result?;
            }
        }
        Ok(())
    }

    fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Sinoscope {
        Sinoscope::new(SinoscopeConfig {
            width: 16,
            height: 12,
            ..SinoscopeConfig::default()
        })
        .expect("valid config")
    }

    #[test]
    fn rejects_invalid_config() {
        let err = Sinoscope::new(SinoscopeConfig {
            order: 0,
            ..SinoscopeConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SinoscopeError::InvalidConfig(_)));
    }

    #[test]
    fn starts_serial_with_sized_buffer() {
        let sinoscope = small();
        assert_eq!(sinoscope.variant(), Variant::Serial);
        assert_eq!(sinoscope.name(), "serial");
        assert_eq!(sinoscope.buffer().len(), 16 * 12 * 3);
    }

    #[test]
    fn bounds_advance_time() {
        let mut sinoscope = small();
        sinoscope.recompute_bounds().unwrap();
        sinoscope.recompute_bounds().unwrap();
        let params = &sinoscope.params;
        assert!((params.dx - 4.0 * PI / 16.0).abs() < f32::EPSILON);
        assert!((params.time - 2.0 / 20.0).abs() < 1e-6);
    }

    #[test]
    fn order_is_clamped_to_one() {
        let mut sinoscope = small();
        sinoscope.set_order(0);
        assert_eq!(sinoscope.order(), 1);
    }

    #[test]
    fn disabled_gpu_fails_fast_and_leaves_cpu_variants_working() {
        let mut sinoscope = small();
        sinoscope.disable_gpu(&SinoscopeError::Gpu("readback mapping failed".into()));
        assert!(matches!(sinoscope.gpu, GpuSlot::Unavailable(_)));

        sinoscope.set_variant(Variant::ParallelGpu);
        sinoscope.recompute_bounds().unwrap();
        let err = sinoscope.generate().unwrap_err();
        assert!(err.to_string().contains("readback mapping failed"), "{err}");
        assert!(matches!(sinoscope.gpu, GpuSlot::Unavailable(_)));
        assert_eq!(sinoscope.buffer().len(), 16 * 12 * 3);

        sinoscope.set_variant(Variant::Serial);
        sinoscope.generate().unwrap();
        assert!(sinoscope.buffer().iter().any(|&byte| byte != 0));
    }

    #[test]
    fn cpu_variants_produce_the_same_image() {
        let mut sinoscope = small();
        sinoscope.recompute_bounds().unwrap();
        sinoscope.generate().unwrap();
        let serial = sinoscope.buffer().to_vec();

        sinoscope.set_variant(Variant::ParallelCpu);
        sinoscope.generate().unwrap();
        assert_eq!(sinoscope.buffer(), serial.as_slice());
    }
}
