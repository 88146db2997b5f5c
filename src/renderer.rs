use std::sync::Arc;

use pollster::FutureExt;
use wgpu::{util::DeviceExt, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration};
use winit::window::Window;

use crate::{
    error::{ShaderError, ViewerError},
    model::{chair_vertices, marker_cube_vertices, Mesh, Texture, TextureImage},
    scene::{FramePlan, SceneObject},
    shader::{self, LinkedProgram, ProgramSource, FRAGMENT_ENTRY, VERTEX_ENTRY},
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_position: [f32; 4],
}

impl FrameUniform {
    fn from_plan(plan: &FramePlan) -> Self {
        let pos = plan.view_position;
        Self {
            view: plan.view.to_cols_array_2d(),
            projection: plan.projection.to_cols_array_2d(),
            view_position: [pos.x, pos.y, pos.z, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LightingUniform {
    key_color: [f32; 4],
    fill_color: [f32; 4],
    key_position: [f32; 4],
    fill_position: [f32; 4],
}

impl LightingUniform {
    fn from_plan(plan: &FramePlan) -> Self {
        let lights = &plan.lights;
        Self {
            key_color: lights.key.color.extend(1.0).to_array(),
            fill_color: lights.fill.color.extend(1.0).to_array(),
            key_position: lights.key.position.extend(1.0).to_array(),
            fill_position: lights.fill.position.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model_matrix: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
}

impl ModelUniform {
    fn new(matrix: glam::Mat4) -> Self {
        Self {
            model_matrix: matrix.to_cols_array_2d(),
            normal_matrix: matrix.inverse().transpose().to_cols_array_2d(),
        }
    }
}

fn uniform_layout_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind group layouts shared by the three programs.
pub struct BindGroupLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub lighting: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_layout_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let lighting = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Bind Group Layout"),
            entries: &[uniform_layout_entry(wgpu::ShaderStages::FRAGMENT)],
        });

        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX)],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            frame,
            lighting,
            model,
            material,
        }
    }
}

/// One render pipeline per shader program.
pub struct Pipelines {
    pub chair: RenderPipeline,
    pub key_light: RenderPipeline,
    pub fill_light: RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &Device,
        layouts: &BindGroupLayouts,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let chair_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chair Pipeline Layout"),
            bind_group_layouts: &[
                &layouts.frame,
                &layouts.lighting,
                &layouts.model,
                &layouts.material,
            ],
            push_constant_ranges: &[],
        });

        let marker_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Light Marker Pipeline Layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.model],
            push_constant_ranges: &[],
        });

        Ok(Self {
            chair: create_program(device, &shader::CHAIR, &chair_layout, color_format)?,
            key_light: create_program(device, &shader::KEY_LIGHT, &marker_layout, color_format)?,
            fill_light: create_program(device, &shader::FILL_LIGHT, &marker_layout, color_format)?,
        })
    }

    pub fn get(&self, object: SceneObject) -> &RenderPipeline {
        match object {
            SceneObject::Chair => &self.chair,
            SceneObject::KeyLight => &self.key_light,
            SceneObject::FillLight => &self.fill_light,
        }
    }
}

/// Compiles, links and builds one program. Driver-side rejections are
/// caught in a validation error scope and reported as link failures.
fn create_program(
    device: &Device,
    source: &ProgramSource,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
) -> Result<RenderPipeline, ShaderError> {
    let linked: LinkedProgram = source.compile_and_link()?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} Vertex Shader", linked.label)),
        source: wgpu::ShaderSource::Wgsl(linked.vertex.source.as_str().into()),
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} Fragment Shader", linked.label)),
        source: wgpu::ShaderSource::Wgsl(linked.fragment.source.as_str().into()),
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{} Pipeline", linked.label)),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[linked.layout.buffer_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    if let Some(error) = device.pop_error_scope().block_on() {
        return Err(ShaderError::Link {
            label: linked.label,
            reason: error.to_string(),
        });
    }

    log::info!("Created program '{}'", linked.label);
    Ok(pipeline)
}

fn create_depth_view(device: &Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// A uniform buffer together with the bind group exposing it.
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new<T: bytemuck::Pod>(
        device: &Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        initial: T,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Buffer", label)),
            contents: bytemuck::cast_slice(&[initial]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

pub struct Renderer {
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    surface: Surface<'static>,
    pipelines: Pipelines,
    frame: UniformSlot,
    lighting: UniformSlot,
    // One per draw so the three draws of a frame never share a transform.
    models: [UniformSlot; 3],
    material_bind_group: wgpu::BindGroup,
    chair_mesh: Mesh,
    marker_mesh: Mesh,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    pub fn new(window: Arc<Window>, texture_image: &TextureImage) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(ViewerError::graphics_init)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .block_on()
            .ok_or_else(|| ViewerError::graphics_init("no compatible graphics adapter"))?;

        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Primary Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .block_on()
            .map_err(ViewerError::graphics_init)?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Colors are written as-is, without an sRGB encode on store.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| ViewerError::graphics_init("surface reports no formats"))?;
        log::debug!("Selected surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let layouts = BindGroupLayouts::new(&device);
        let pipelines = Pipelines::new(&device, &layouts, config.format)?;

        let identity = ModelUniform::new(glam::Mat4::IDENTITY);
        let frame = UniformSlot::new(&device, &layouts.frame, "Frame", FrameUniform {
            view: glam::Mat4::IDENTITY.to_cols_array_2d(),
            projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            view_position: [0.0; 4],
        });
        let lighting = UniformSlot::new(&device, &layouts.lighting, "Lighting", LightingUniform {
            key_color: [0.0; 4],
            fill_color: [0.0; 4],
            key_position: [0.0; 4],
            fill_position: [0.0; 4],
        });
        let models = [
            UniformSlot::new(&device, &layouts.model, "Chair Model", identity),
            UniformSlot::new(&device, &layouts.model, "Key Light Model", identity),
            UniformSlot::new(&device, &layouts.model, "Fill Light Model", identity),
        ];

        let fitted = texture_image.fit_within(device.limits().max_texture_dimension_2d);
        let texture = Texture::from_image(
            &device,
            &queue,
            fitted.as_ref().unwrap_or(texture_image),
            Some("Chair Texture"),
        );
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Chair Material Bind Group"),
            layout: &layouts.material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let chair_mesh = Mesh::new(&device, "Chair", &chair_vertices());
        // Key and fill markers draw from the same buffer.
        let marker_mesh = Mesh::new(&device, "Light Marker", &marker_cube_vertices());

        let depth_view = create_depth_view(&device, config.width, config.height);

        Ok(Self {
            device,
            queue,
            config,
            surface,
            pipelines,
            frame,
            lighting,
            models,
            material_bind_group,
            chair_mesh,
            marker_mesh,
            depth_view,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, width, height);
        }
    }

    /// Reconfigures the surface with the current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn render(&mut self, plan: &FramePlan) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.frame.buffer,
            0,
            bytemuck::cast_slice(&[FrameUniform::from_plan(plan)]),
        );
        self.queue.write_buffer(
            &self.lighting.buffer,
            0,
            bytemuck::cast_slice(&[LightingUniform::from_plan(plan)]),
        );
        for (slot, draw) in self.models.iter().zip(plan.draws.iter()) {
            self.queue.write_buffer(
                &slot.buffer,
                0,
                bytemuck::cast_slice(&[ModelUniform::new(draw.model)]),
            );
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for (slot, draw) in self.models.iter().zip(plan.draws.iter()) {
                render_pass.set_pipeline(self.pipelines.get(draw.object));
                render_pass.set_bind_group(0, &self.frame.bind_group, &[]);

                let mesh = match draw.object {
                    SceneObject::Chair => {
                        render_pass.set_bind_group(1, &self.lighting.bind_group, &[]);
                        render_pass.set_bind_group(2, &slot.bind_group, &[]);
                        render_pass.set_bind_group(3, &self.material_bind_group, &[]);
                        &self.chair_mesh
                    }
                    SceneObject::KeyLight | SceneObject::FillLight => {
                        render_pass.set_bind_group(1, &slot.bind_group, &[]);
                        &self.marker_mesh
                    }
                };

                debug_assert_eq!(mesh.num_vertices, draw.vertex_count);
                mesh.draw(&mut render_pass);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneState;

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .block_on()?;
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .block_on()
            .ok()
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 144);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 64);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 128);
    }

    #[test]
    fn test_uniforms_from_plan() {
        let plan = SceneState::new(800, 600).frame();

        let frame = FrameUniform::from_plan(&plan);
        assert_eq!(frame.view_position, [10.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.projection, plan.projection.to_cols_array_2d());

        let lighting = LightingUniform::from_plan(&plan);
        assert_eq!(lighting.key_color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(lighting.fill_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(lighting.key_position, [-1.0, 1.0, -6.0, 1.0]);
        assert_eq!(lighting.fill_position, [3.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = glam::Mat4::from_scale(glam::Vec3::new(2.0, 1.0, 1.0));
        let uniform = ModelUniform::new(model);
        let normal = glam::Mat4::from_cols_array_2d(&uniform.normal_matrix);
        let n = normal.transform_vector3(glam::Vec3::X);
        assert_eq!(n, glam::Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_pipeline_creation() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("no GPU adapter available, skipping");
            return;
        };

        let layouts = BindGroupLayouts::new(&device);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let result = Pipelines::new(&device, &layouts, wgpu::TextureFormat::Bgra8Unorm);
        let leaked = device.pop_error_scope().block_on();

        if let Err(e) = &result {
            panic!("built-in programs failed to build: {}", e);
        }
        assert!(leaked.is_none(), "unexpected validation error: {:?}", leaked);
    }

    #[test]
    fn test_each_program_builds_against_its_layout() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("no GPU adapter available, skipping");
            return;
        };

        let layouts = BindGroupLayouts::new(&device);
        let chair_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chair"),
            bind_group_layouts: &[
                &layouts.frame,
                &layouts.lighting,
                &layouts.model,
                &layouts.material,
            ],
            push_constant_ranges: &[],
        });
        let marker_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Marker"),
            bind_group_layouts: &[&layouts.frame, &layouts.model],
            push_constant_ranges: &[],
        });

        let format = wgpu::TextureFormat::Bgra8Unorm;
        for (source, layout) in [
            (&shader::CHAIR, &chair_layout),
            (&shader::KEY_LIGHT, &marker_layout),
            (&shader::FILL_LIGHT, &marker_layout),
        ] {
            if let Err(e) = create_program(&device, source, layout, format) {
                panic!("program '{}' failed: {}", source.label, e);
            }
        }

        // Marker programs do not fit the chair's bind groups and vice versa.
        assert!(create_program(&device, &shader::KEY_LIGHT, &chair_layout, format).is_err());
        assert!(create_program(&device, &shader::CHAIR, &marker_layout, format).is_err());
    }

    #[test]
    fn test_gpu_rejection_is_a_link_error() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("no GPU adapter available, skipping");
            return;
        };

        // The chair program needs four bind groups; give it only one.
        let layouts = BindGroupLayouts::new(&device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Too Small"),
            bind_group_layouts: &[&layouts.frame],
            push_constant_ranges: &[],
        });

        let err = create_program(
            &device,
            &shader::CHAIR,
            &layout,
            wgpu::TextureFormat::Bgra8Unorm,
        )
        .unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(!err.log().is_empty());
    }
}
