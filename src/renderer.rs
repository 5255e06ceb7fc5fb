use anyhow::{Context, Result};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::ViewerConfig;
use crate::loaders::SceneAsset;
use crate::math::Rgb;
use crate::scene::{FrameSnapshot, Overlay};
use crate::types::{MeshVertex, ObjectUniform, PointInstance, SceneUniform};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Lights, fog and background, fixed for the life of the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    pub background: Rgb,
    pub ambient: [f32; 3],
    pub light_position: [f32; 3],
    pub light_color: [f32; 3],
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub particle_color: [f32; 3],
    pub particle_size: f32,
}

impl SceneLighting {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let lighting = &config.lighting;
        let scale = |c: [f32; 3], k: f32| [c[0] * k, c[1] * k, c[2] * k];

        Self {
            background: config.background,
            ambient: [lighting.ambient_intensity; 3],
            light_position: lighting.point_position,
            light_color: scale(lighting.point_color.to_linear(), lighting.point_intensity),
            fog_color: config.fog.color.to_linear(),
            fog_near: config.fog.near,
            fog_far: config.fog.far,
            particle_color: config.particles.color.to_linear(),
            particle_size: config.particles.size,
        }
    }

    /// Combine the fixed lighting with this frame's camera
    pub fn scene_uniform(&self, snapshot: &FrameSnapshot) -> SceneUniform {
        SceneUniform {
            view_proj: snapshot.view_proj.to_cols_array_2d(),
            camera_position: snapshot.camera_position.to_array(),
            fog_near: self.fog_near,
            fog_color: self.fog_color,
            fog_far: self.fog_far,
            ambient: self.ambient,
            _pad0: 0.0,
            light_position: self.light_position,
            _pad1: 0.0,
            light_color: self.light_color,
            _pad2: 0.0,
            camera_right: snapshot.camera_right.to_array(),
            _pad3: 0.0,
            camera_up: snapshot.camera_up.to_array(),
            _pad4: 0.0,
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu render surface for the viewport: lit model, particle billboards,
/// and an egui overlay for the loading placeholder
pub struct SceneRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    points_buffer: wgpu::Buffer,
    points_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    particle_instances: Option<(wgpu::Buffer, u32)>,
    lighting: SceneLighting,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    show_ui: bool,
}

impl SceneRenderer {
    pub async fn new(window: Arc<Window>, config: &ViewerConfig, show_ui: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create render surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Viewport Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &surface_config);
        let depth_view = Self::create_depth_view(&device, &surface_config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let uniform_layout = |label: &str| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            })
        };
        let scene_layout = uniform_layout("scene_bind_group_layout");
        let object_layout = uniform_layout("object_bind_group_layout");

        let lighting = SceneLighting::from_config(config);

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(&<SceneUniform as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_buffer = Self::create_object_buffer(&device, "Model Uniform Buffer");
        let points_buffer = Self::create_object_buffer(&device, "Particle Uniform Buffer");

        let bind = |layout: &wgpu::BindGroupLayout, buffer: &wgpu::Buffer, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let scene_bind_group = bind(&scene_layout, &scene_buffer, "scene_bind_group");
        let model_bind_group = bind(&object_layout, &model_buffer, "model_bind_group");
        let points_bind_group = bind(&object_layout, &points_buffer, "particle_bind_group");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineKind::Mesh,
        );
        let points_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineKind::Points,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        log::info!(
            "Render surface ready: {}x{} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            depth_view,
            mesh_pipeline,
            points_pipeline,
            scene_buffer,
            scene_bind_group,
            model_buffer,
            model_bind_group,
            points_buffer,
            points_bind_group,
            meshes: Vec::new(),
            particle_instances: None,
            lighting,
            egui_renderer,
            egui_state,
            egui_ctx,
            show_ui,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_object_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[ObjectUniform::mesh(glam::Mat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        kind: PipelineKind,
    ) -> wgpu::RenderPipeline {
        let (label, vs, fs, buffers, blend, depth_write) = match kind {
            PipelineKind::Mesh => (
                "Mesh Pipeline",
                "vs_mesh",
                "fs_mesh",
                [MeshVertex::layout()],
                wgpu::BlendState::REPLACE,
                true,
            ),
            PipelineKind::Points => (
                "Particle Pipeline",
                "vs_points",
                "fs_points",
                [PointInstance::layout()],
                wgpu::BlendState::ALPHA_BLENDING,
                false,
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(vs),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fs),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
                depth_write_enabled: depth_write,
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
        })
    }

    /// Upload a freshly loaded model, replacing any previous one
    pub fn upload_model(&mut self, asset: &SceneAsset) {
        self.meshes = asset
            .meshes()
            .iter()
            .map(|mesh| GpuMesh {
                vertex_buffer: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Model Vertex Buffer"),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                index_buffer: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Model Index Buffer"),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                index_count: mesh.indices.len() as u32,
            })
            .collect();
        log::debug!("Uploaded {} meshes to the GPU", self.meshes.len());
    }

    pub fn clear_model(&mut self) {
        self.meshes.clear();
    }

    /// Upload the particle positions once; only the cloud transform changes later
    pub fn upload_particles(&mut self, positions: &[Vec3]) {
        if positions.is_empty() {
            self.particle_instances = None;
            return;
        }

        let instances: Vec<PointInstance> = positions.iter().copied().map(Into::into).collect();
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Instance Buffer"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.particle_instances = Some((buffer, instances.len() as u32));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = Self::create_depth_view(&self.device, &self.surface_config);
    }

    /// Reconfigure after the surface was lost or went stale
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn render(
        &mut self,
        window: &Window,
        snapshot: &FrameSnapshot,
        overlay: Overlay,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let scene_uniform = self.lighting.scene_uniform(snapshot);
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[scene_uniform]));

        if let Some(model) = snapshot.model {
            self.queue.write_buffer(
                &self.model_buffer,
                0,
                bytemuck::cast_slice(&[ObjectUniform::mesh(model)]),
            );
        }
        self.queue.write_buffer(
            &self.points_buffer,
            0,
            bytemuck::cast_slice(&[ObjectUniform::points(
                snapshot.particles,
                self.lighting.particle_color,
                self.lighting.particle_size,
            )]),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        // Scene pass - model then particles
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.lighting.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

            if snapshot.model.is_some() && !self.meshes.is_empty() {
                render_pass.set_pipeline(&self.mesh_pipeline);
                render_pass.set_bind_group(1, &self.model_bind_group, &[]);
                for mesh in &self.meshes {
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }

            if let Some((instances, count)) = &self.particle_instances {
                render_pass.set_pipeline(&self.points_pipeline);
                render_pass.set_bind_group(1, &self.points_bind_group, &[]);
                render_pass.set_vertex_buffer(0, instances.slice(..));
                render_pass.draw(0..6, 0..*count);
            }
        }

        // egui pass - loading placeholder and FPS readout
        let show_ui = self.show_ui;
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if overlay == Overlay::Loading {
                egui::Area::new(egui::Id::new("loading_placeholder"))
                    .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                    .show(ctx, |ui| {
                        ui.label(
                            egui::RichText::new("Loading...")
                                .size(20.0)
                                .color(egui::Color32::WHITE),
                        );
                    });
            }

            if show_ui {
                egui::Window::new("FPS")
                    .title_bar(false)
                    .resizable(false)
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| {
                        ui.label(
                            egui::RichText::new(format!("{:.0}", fps))
                                .size(32.0)
                                .color(egui::Color32::from_rgb(0x88, 0xff, 0x88)),
                        );
                        ui.label(
                            egui::RichText::new("FPS")
                                .size(12.0)
                                .color(egui::Color32::GRAY),
                        );
                    });
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Let egui see the event first; true if it consumed it
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

#[derive(Debug, Clone, Copy)]
enum PipelineKind {
    Mesh,
    Points,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot {
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::new(0.0, 0.0, 8.0),
            camera_right: Vec3::X,
            camera_up: Vec3::Y,
            model: None,
            particles: Mat4::IDENTITY,
            particle_count: 0,
        }
    }

    #[test]
    fn lighting_follows_config() {
        let lighting = SceneLighting::from_config(&ViewerConfig::default());

        assert_eq!(lighting.ambient, [0.5; 3]);
        assert_eq!(lighting.light_position, [10.0, 10.0, 10.0]);
        assert!(lighting.light_color.iter().all(|&c| (c - 1.5).abs() < 1e-5));
        assert_eq!(lighting.fog_near, 8.0);
        assert_eq!(lighting.fog_far, 20.0);
        assert_eq!(lighting.particle_size, 0.05);
    }

    #[test]
    fn scene_uniform_carries_camera() {
        let lighting = SceneLighting::from_config(&ViewerConfig::default());
        let uniform = lighting.scene_uniform(&snapshot());

        assert_eq!(uniform.camera_position, [0.0, 0.0, 8.0]);
        assert_eq!(uniform.camera_right, [1.0, 0.0, 0.0]);
        assert_eq!(uniform.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }
}
