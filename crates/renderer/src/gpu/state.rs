use std::sync::Arc;

use anyhow::Result;
use viewer::{BackendError, Filter, GraphicsBackend, TextureHandle, TexturedVertex};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::context::GpuContext;
use super::pipeline::{quad_vertices, QuadPipeline, QuadVertex, QUAD_INDICES};

/// A texture slot handed out by `create_texture`; storage is allocated on the
/// first upload and re-created whenever the image size changes.
struct FrameTexture {
    storage: Option<TextureStorage>,
}

struct TextureStorage {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
    filter: Filter,
}

/// Commands recorded between two presents.
#[derive(Debug, Default)]
struct FrameRecord {
    viewport: Option<(u32, u32)>,
    unit_projection: bool,
    clear: Option<[f32; 4]>,
    quad: Option<(TextureHandle, [QuadVertex; 4])>,
}

/// wgpu implementation of the viewer's graphics calls.
///
/// Calls only record state; the single render pass is encoded and submitted
/// by [`GpuState::present`].
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: QuadPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    textures: Vec<FrameTexture>,
    frame: FrameRecord,
}

impl GpuState {
    pub(crate) fn new(window: Arc<Window>, size: PhysicalSize<u32>, vsync: bool) -> Result<Self> {
        let context = GpuContext::new(window, size, vsync)?;
        let pipeline = QuadPipeline::new(&context.device, context.surface_format);
        let vertex_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad vertices"),
            size: std::mem::size_of::<[QuadVertex; 4]>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad indices"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(Self {
            context,
            pipeline,
            vertex_buffer,
            index_buffer,
            textures: Vec::new(),
            frame: FrameRecord::default(),
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Encodes the recorded frame, submits it and presents the swapchain
    /// image. The record is cleared whether or not presenting succeeds.
    pub(crate) fn present(&mut self) -> Result<(), BackendError> {
        let frame = std::mem::take(&mut self.frame);
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::debug!(error = %err, "surface lost; reconfiguring");
                self.context.reconfigure();
                return Err(BackendError::new("swap_buffers", err.to_string()));
            }
            Err(err) => return Err(BackendError::new("swap_buffers", err.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let quad = match frame.quad {
            Some((handle, vertices)) => {
                self.context.queue.write_buffer(
                    &self.vertex_buffer,
                    0,
                    bytemuck::cast_slice(&vertices),
                );
                self.storage(handle).map(|storage| &storage.bind_group)
            }
            None => None,
        };

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let [r, g, b, a] = frame.clear.unwrap_or([0.0, 0.0, 0.0, 1.0]);
            let load = if frame.clear.is_some() {
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: f64::from(r),
                    g: f64::from(g),
                    b: f64::from(b),
                    a: f64::from(a),
                })
            } else {
                wgpu::LoadOp::Load
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let (Some(bind_group), true) = (quad, frame.unit_projection) {
                let surface = (self.context.config.width, self.context.config.height);
                let (width, height) = clamp_viewport(frame.viewport.unwrap_or(surface), surface);
                render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                render_pass.set_pipeline(&self.pipeline.pipeline);
                render_pass.set_bind_group(0, bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn storage(&self, handle: TextureHandle) -> Option<&TextureStorage> {
        self.textures
            .get(handle.0 as usize)
            .and_then(|slot| slot.storage.as_ref())
    }

    fn allocate_storage(&self, width: u32, height: u32, filter: Filter) -> TextureStorage {
        let device = &self.context.device;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let filter_mode = match filter {
            Filter::Nearest => wgpu::FilterMode::Nearest,
            Filter::Linear => wgpu::FilterMode::Linear,
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame texture bind group"),
            layout: &self.pipeline.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        tracing::debug!(width, height, ?filter, "allocated frame texture storage");
        TextureStorage {
            texture,
            bind_group,
            size: (width, height),
            filter,
        }
    }
}

impl GraphicsBackend for GpuState {
    fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::new(
                "set_viewport",
                format!("viewport must be positive, got {width}x{height}"),
            ));
        }
        self.frame.viewport = Some((width, height));
        Ok(())
    }

    fn load_unit_projection(&mut self) -> Result<(), BackendError> {
        self.frame.unit_projection = true;
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), BackendError> {
        self.frame.clear = Some(color);
        self.frame.quad = None;
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureHandle, BackendError> {
        let index = u32::try_from(self.textures.len())
            .map_err(|_| BackendError::new("create_texture", "texture handles exhausted"))?;
        self.textures.push(FrameTexture { storage: None });
        Ok(TextureHandle(index))
    }

    fn upload_rgb(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        pixels: &[u8],
        filter: Filter,
    ) -> Result<(), BackendError> {
        if texture.0 as usize >= self.textures.len() {
            return Err(BackendError::new(
                "upload_rgb",
                format!("unknown texture {}", texture.0),
            ));
        }
        let max = self.context.max_texture_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(BackendError::new(
                "upload_rgb",
                format!("texture size {width}x{height} outside 1..={max}"),
            ));
        }
        let rgba = expand_rgb(pixels, width, height).ok_or_else(|| {
            BackendError::new(
                "upload_rgb",
                format!(
                    "expected {} bytes for {width}x{height} RGB, got {}",
                    width as usize * height as usize * 3,
                    pixels.len()
                ),
            )
        })?;

        let reusable = self
            .storage(texture)
            .is_some_and(|storage| storage.size == (width, height) && storage.filter == filter);
        if !reusable {
            let storage = self.allocate_storage(width, height, filter);
            self.textures[texture.0 as usize].storage = Some(storage);
        }
        let Some(storage) = self.storage(texture) else {
            return Err(BackendError::new("upload_rgb", "texture storage missing"));
        };

        self.context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &storage.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn draw_quad(
        &mut self,
        texture: TextureHandle,
        vertices: &[TexturedVertex; 4],
    ) -> Result<(), BackendError> {
        if self.storage(texture).is_none() {
            return Err(BackendError::new(
                "draw_quad",
                format!("texture {} has no uploaded image", texture.0),
            ));
        }
        self.frame.quad = Some((texture, quad_vertices(vertices)));
        Ok(())
    }
}

/// Pads tightly packed RGB to RGBA with an opaque alpha channel. Returns
/// `None` when `pixels` does not hold exactly `width * height` pixels.
fn expand_rgb(pixels: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let count = width as usize * height as usize;
    if pixels.len() != count * 3 {
        return None;
    }
    let mut rgba = Vec::with_capacity(count * 4);
    for pixel in pixels.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(u8::MAX);
    }
    Some(rgba)
}

fn clamp_viewport(requested: (u32, u32), surface: (u32, u32)) -> (u32, u32) {
    (
        requested.0.clamp(1, surface.0.max(1)),
        requested.1.clamp(1, surface.1.max(1)),
    )
}
