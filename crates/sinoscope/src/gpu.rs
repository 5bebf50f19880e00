use std::borrow::Cow;

use tracing::debug;

use crate::error::SinoscopeError;
use crate::field::FieldParams;

const WORKGROUP_SIZE: u32 = 16;

const FIELD_SHADER: &str = r#"
struct Params {
    width: u32,
    height: u32,
    order: u32,
    interval: u32,
    dx: f32,
    dy: f32,
    phase0: f32,
    phase1: f32,
    time: f32,
    pad0: f32,
    pad1: f32,
    pad2: f32,
};

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read_write> pixels: array<u32>;

const PI: f32 = 3.14159265358979;
const VALUE_RANGE: f32 = 200.0;

fn palette(value: f32) -> vec3<u32> {
    let interval = max(params.interval, 1u);
    let v = u32(clamp(value, 0.0, VALUE_RANGE));
    let x = ((v % interval) * 255u) / interval;
    switch (v / interval) {
        case 0u: { return vec3<u32>(0u, x, 255u); }
        case 1u: { return vec3<u32>(0u, 255u, 255u - x); }
        case 2u: { return vec3<u32>(x, 255u, 0u); }
        case 3u: { return vec3<u32>(255u, 255u - x, 0u); }
        default: { return vec3<u32>(255u, 0u, x); }
    }
}

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if (id.x >= params.width || id.y >= params.height) {
        return;
    }
    let px = params.dx * f32(id.x) - 2.0 * PI;
    let py = params.dy * f32(id.y) - 2.0 * PI;

    var value = 0.0;
    for (var k = 1u; k <= params.order; k = k + 2u) {
        let kf = f32(k);
        value = value + sin(px * kf * params.phase1 + params.time) / kf;
        value = value + cos(py * kf * params.phase0) / kf;
    }
    value = (atan(value) - atan(-value)) / PI;
    value = (value + 1.0) * (VALUE_RANGE / 2.0);

    let rgb = palette(value);
    pixels[id.y * params.width + id.x] = rgb.x | (rgb.y << 8u) | (rgb.z << 16u);
}
"#;

/// Compute pipeline that evaluates the field on the GPU for a fixed image
/// size.
pub(crate) struct GpuKernel {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    params: wgpu::Buffer,
    output: wgpu::Buffer,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl GpuKernel {
    pub(crate) fn new(width: u32, height: u32) -> Result<Self, SinoscopeError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|err| SinoscopeError::GpuUnavailable(err.to_string()))?;

        let info = adapter.get_info();
        debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected compute adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("sinoscope compute device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| SinoscopeError::GpuUnavailable(err.to_string()))?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sinoscope field"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(FIELD_SHADER)),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("sinoscope field pipeline"),
            layout: None,
            module: &module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sinoscope params"),
            size: std::mem::size_of::<FieldParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pixel_bytes = u64::from(width) * u64::from(height) * 4;
        let output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sinoscope pixels"),
            size: pixel_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sinoscope readback"),
            size: pixel_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sinoscope bind group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.as_entire_binding(),
                },
            ],
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group,
            params,
            output,
            readback,
            width,
            height,
        })
    }

    /// Evaluates the field and copies the result into the RGB `buffer`.
    pub(crate) fn run(&self, params: &FieldParams, buffer: &mut [u8]) -> Result<(), SinoscopeError> {
        if params.width != self.width || params.height != self.height {
            return Err(SinoscopeError::Gpu(format!(
                "kernel sized for {}x{}, asked for {}x{}",
                self.width, self.height, params.width, params.height
            )));
        }
        self.queue
            .write_buffer(&self.params, 0, bytemuck::bytes_of(params));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sinoscope encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("sinoscope field pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(
                self.width.div_ceil(WORKGROUP_SIZE),
                self.height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }
        encoder.copy_buffer_to_buffer(&self.output, 0, &self.readback, 0, self.output.size());
        self.queue.submit(Some(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| SinoscopeError::Gpu(format!("device poll failed: {err}")))?;
        rx.recv()
            .map_err(|err| SinoscopeError::Gpu(format!("readback channel closed: {err}")))?
            .map_err(|err| SinoscopeError::Gpu(format!("readback mapping failed: {err}")))?;

        {
            let mapped = slice.get_mapped_range();
            copy_rgb(&mapped, buffer);
        }
        self.readback.unmap();
        Ok(())
    }
}

/// Drops the padding byte of each packed RGBA pixel.
fn copy_rgb(rgba: &[u8], rgb: &mut [u8]) {
    for (dst, src) in rgb.chunks_exact_mut(3).zip(rgba.chunks_exact(4)) {
        dst.copy_from_slice(&src[..3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_rgb_strips_padding() {
        let rgba = [1, 2, 3, 0, 4, 5, 6, 0];
        let mut rgb = [0u8; 6];
        copy_rgb(&rgba, &mut rgb);
        assert_eq!(rgb, [1, 2, 3, 4, 5, 6]);
    }
}
