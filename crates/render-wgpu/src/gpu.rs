use crate::mesh::{self, MeshData, Vertex, WireVertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use stagelight_render::{RenderView, Renderer};
use stagelight_scene::{Fog, Geometry, HelperNode, LightNode, NodeKind, SceneGraph};
use wgpu::util::DeviceExt;

const SHADOW_MAP_SIZE: u32 = 1024;
const MAX_INSTANCES: usize = 1024;
const MAX_HELPER_VERTICES: usize = 4096;

const FOG_MODE_NONE: f32 = 0.0;
const FOG_MODE_LINEAR: f32 = 1.0;
const FOG_MODE_EXP2: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    spot_pos: [f32; 4],
    spot_dir: [f32; 4],
    spot_color: [f32; 4],
    fog_color: [f32; 4],
    fog_params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Index into the per-primitive buffer arrays.
const PRIM_CUBE: usize = 0;
const PRIM_SPHERE: usize = 1;
const PRIM_PLANE: usize = 2;
const PRIM_COUNT: usize = 3;

/// A contiguous run of instances drawn with one primitive's buffers.
struct Batch {
    primitive: usize,
    range: std::ops::Range<u32>,
}

#[derive(Default)]
struct FrameBatches {
    instances: Vec<InstanceData>,
    fill: Vec<Batch>,
    wire: Vec<Batch>,
    shadow: Vec<Batch>,
}

/// wgpu-based scene renderer.
pub struct WgpuSceneRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,
    vertex_buffers: [wgpu::Buffer; PRIM_COUNT],
    index_buffers: [wgpu::Buffer; PRIM_COUNT],
    index_counts: [u32; PRIM_COUNT],
    wire_buffers: [wgpu::Buffer; PRIM_COUNT],
    wire_counts: [u32; PRIM_COUNT],
    instance_buffer: wgpu::Buffer,
    helper_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuSceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
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
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        // Shadow map resources: depth texture rendered from the light,
        // sampled with a comparison sampler in the main pass.
        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_texture"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&Default::default());

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout: &shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &shadow_layout],
            push_constant_ranges: &[],
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pipeline_layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
            ],
        };
        let wire_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<WireVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
            ],
        };
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                2 => Float32x4,
                3 => Float32x4,
                4 => Float32x4,
                5 => Float32x4,
                6 => Float32x4,
                7 => Float32x4,
            ],
        };
        let line_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x4,
            ],
        };

        let depth_state = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        };

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&mesh_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout.clone(), instance_layout.clone()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_state.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&line_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout.clone(), instance_layout.clone()],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let wire_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("wire_pipeline"),
            layout: Some(&line_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_wire"),
                compilation_options: Default::default(),
                buffers: &[wire_vertex_layout, instance_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&line_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[line_vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Unit primitive meshes, scaled per instance by the model matrix.
        let cube = mesh::unit_cube();
        let sphere = mesh::unit_sphere(mesh::SPHERE_RINGS, mesh::SPHERE_SEGMENTS);
        let plane = mesh::unit_plane();
        let make_mesh = |data: &MeshData, name: &str| {
            let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name}_vertex_buffer")),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name}_index_buffer")),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vb, ib, data.indices.len() as u32)
        };
        let (cube_vb, cube_ib, cube_n) = make_mesh(&cube, "cube");
        let (sphere_vb, sphere_ib, sphere_n) = make_mesh(&sphere, "sphere");
        let (plane_vb, plane_ib, plane_n) = make_mesh(&plane, "plane");

        let cube_wire = mesh::cube_wire();
        let sphere_wire = mesh::sphere_wire(6, 8, 24);
        let plane_wire = mesh::plane_wire();
        let make_wire = |data: &[WireVertex], name: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name}_wire_buffer")),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let helper_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("helper_buffer"),
            size: (MAX_HELPER_VERTICES * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            mesh_pipeline,
            wire_pipeline,
            line_pipeline,
            shadow_pipeline,
            frame_uniform_buffer,
            frame_bind_group,
            shadow_bind_group,
            shadow_view,
            vertex_buffers: [cube_vb, sphere_vb, plane_vb],
            index_buffers: [cube_ib, sphere_ib, plane_ib],
            index_counts: [cube_n, sphere_n, plane_n],
            wire_buffers: [
                make_wire(&cube_wire, "cube"),
                make_wire(&sphere_wire, "sphere"),
                make_wire(&plane_wire, "plane"),
            ],
            wire_counts: [
                cube_wire.len() as u32,
                sphere_wire.len() as u32,
                plane_wire.len() as u32,
            ],
            instance_buffer,
            helper_buffer,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: shadow depth pass, then meshes, wireframes, and
    /// helper lines.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &SceneGraph,
        render_view: &RenderView,
    ) {
        let uniforms = build_frame_uniforms(scene, render_view);
        queue.write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let batches = collect_batches(scene);
        if !batches.instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&batches.instances),
            );
        }

        let mut helper_lines = build_helper_lines(scene);
        if helper_lines.len() > MAX_HELPER_VERTICES {
            tracing::warn!(
                dropped = helper_lines.len() - MAX_HELPER_VERTICES,
                "helper line budget exceeded"
            );
            helper_lines.truncate(MAX_HELPER_VERTICES);
        }
        if !helper_lines.is_empty() {
            queue.write_buffer(&self.helper_buffer, 0, bytemuck::cast_slice(&helper_lines));
        }

        let shadows_on = uniforms.fog_params[3] > 0.5;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        // Shadow depth pass. Always clears so a disabled pass leaves the
        // map fully lit.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if shadows_on && !batches.shadow.is_empty() {
                pass.set_pipeline(&self.shadow_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for batch in &batches.shadow {
                    pass.set_vertex_buffer(0, self.vertex_buffers[batch.primitive].slice(..));
                    pass.set_index_buffer(
                        self.index_buffers[batch.primitive].slice(..),
                        wgpu::IndexFormat::Uint16,
                    );
                    pass.draw_indexed(
                        0..self.index_counts[batch.primitive],
                        0,
                        batch.range.clone(),
                    );
                }
            }
        }

        // Main pass.
        {
            let bg = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !batches.fill.is_empty() {
                pass.set_pipeline(&self.mesh_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_bind_group(1, &self.shadow_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for batch in &batches.fill {
                    pass.set_vertex_buffer(0, self.vertex_buffers[batch.primitive].slice(..));
                    pass.set_index_buffer(
                        self.index_buffers[batch.primitive].slice(..),
                        wgpu::IndexFormat::Uint16,
                    );
                    pass.draw_indexed(
                        0..self.index_counts[batch.primitive],
                        0,
                        batch.range.clone(),
                    );
                }
            }

            if !batches.wire.is_empty() {
                pass.set_pipeline(&self.wire_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for batch in &batches.wire {
                    pass.set_vertex_buffer(0, self.wire_buffers[batch.primitive].slice(..));
                    pass.draw(0..self.wire_counts[batch.primitive], batch.range.clone());
                }
            }

            if !helper_lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_vertex_buffer(0, self.helper_buffer.slice(..));
                pass.draw(0..helper_lines.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Borrow bundle implementing the renderer seam for one acquired surface
/// frame, so the frame driver can issue its single render call against the
/// GPU backend.
pub struct SceneFramePass<'a> {
    pub renderer: &'a WgpuSceneRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for SceneFramePass<'_> {
    type Output = ();

    fn render(&mut self, scene: &SceneGraph, view: &RenderView) {
        self.renderer
            .render(self.device, self.queue, self.view, scene, view);
    }
}

/// Geometry scale folded into the instance model matrix so all meshes share
/// the unit primitives.
fn geometry_scale(geometry: &Geometry) -> (usize, Vec3) {
    match *geometry {
        Geometry::Cuboid { size } => (PRIM_CUBE, size),
        Geometry::Sphere { radius } => (PRIM_SPHERE, Vec3::splat(radius)),
        Geometry::Plane { width, depth } => (PRIM_PLANE, Vec3::new(width, 1.0, depth)),
    }
}

fn collect_batches(scene: &SceneGraph) -> FrameBatches {
    let mut fill: [Vec<InstanceData>; PRIM_COUNT] = Default::default();
    let mut wire: [Vec<InstanceData>; PRIM_COUNT] = Default::default();
    let mut shadow: [Vec<InstanceData>; PRIM_COUNT] = Default::default();

    for node in scene.nodes() {
        let NodeKind::Mesh(mesh) = &node.kind else {
            continue;
        };
        let (primitive, geo_scale) = geometry_scale(&mesh.geometry);
        let t = node.transform;
        let model =
            Mat4::from_scale_rotation_translation(t.scale * geo_scale, t.rotation, t.position);
        let cols = model.to_cols_array_2d();
        let c = mesh.material.color;
        let instance = InstanceData {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [c.r, c.g, c.b, 1.0],
            params: [
                if mesh.material.lit { 1.0 } else { 0.0 },
                if mesh.receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        };
        if mesh.material.wireframe {
            wire[primitive].push(instance);
        } else {
            fill[primitive].push(instance);
        }
        if mesh.cast_shadow {
            // Shadow casters are rendered solid even in wireframe mode.
            shadow[primitive].push(instance);
        }
    }

    let mut batches = FrameBatches::default();
    let mut push_group =
        |groups: [Vec<InstanceData>; PRIM_COUNT], instances: &mut Vec<InstanceData>| {
            let mut out = Vec::new();
            for (primitive, group) in groups.into_iter().enumerate() {
                if group.is_empty() {
                    continue;
                }
                let start = instances.len();
                let end = start + group.len();
                if end > MAX_INSTANCES {
                    tracing::warn!(dropped = end - MAX_INSTANCES, "instance budget exceeded");
                    break;
                }
                instances.extend(group);
                out.push(Batch {
                    primitive,
                    range: start as u32..end as u32,
                });
            }
            out
        };

    batches.fill = push_group(fill, &mut batches.instances);
    batches.wire = push_group(wire, &mut batches.instances);
    batches.shadow = push_group(shadow, &mut batches.instances);
    batches
}

fn line(out: &mut Vec<LineVertex>, a: Vec3, b: Vec3, color: [f32; 4]) {
    out.push(LineVertex {
        position: a.to_array(),
        color,
    });
    out.push(LineVertex {
        position: b.to_array(),
        color,
    });
}

/// World-space line batches for the scene's helper nodes.
fn build_helper_lines(scene: &SceneGraph) -> Vec<LineVertex> {
    let mut verts = Vec::new();

    for node in scene.nodes() {
        let NodeKind::Helper(helper) = &node.kind else {
            continue;
        };
        let origin = node.transform.position;
        match *helper {
            HelperNode::Axes { length } => {
                line(
                    &mut verts,
                    origin,
                    origin + Vec3::X * length,
                    [1.0, 0.2, 0.2, 1.0],
                );
                line(
                    &mut verts,
                    origin,
                    origin + Vec3::Y * length,
                    [0.2, 1.0, 0.2, 1.0],
                );
                line(
                    &mut verts,
                    origin,
                    origin + Vec3::Z * length,
                    [0.2, 0.2, 1.0, 1.0],
                );
            }
            HelperNode::GridFloor { size, divisions } => {
                let color = [0.4, 0.4, 0.4, 1.0];
                let half = size / 2.0;
                let step = size / divisions.max(1) as f32;
                for i in 0..=divisions.max(1) {
                    let offset = -half + i as f32 * step;
                    // Lines along X
                    line(
                        &mut verts,
                        origin + Vec3::new(-half, 0.0, offset),
                        origin + Vec3::new(half, 0.0, offset),
                        color,
                    );
                    // Lines along Z
                    line(
                        &mut verts,
                        origin + Vec3::new(offset, 0.0, -half),
                        origin + Vec3::new(offset, 0.0, half),
                        color,
                    );
                }
            }
            HelperNode::SpotCone {
                light,
                angle,
                range,
            } => {
                let Some(light_node) = scene.get(light) else {
                    continue;
                };
                let color = match scene.light(light) {
                    Some(LightNode::Spot { color, .. }) => [color.r, color.g, color.b, 1.0],
                    _ => [1.0, 1.0, 1.0, 1.0],
                };
                let apex = light_node.transform.position;
                let dir = if apex.length() > f32::EPSILON {
                    -apex.normalize()
                } else {
                    Vec3::NEG_Y
                };
                let u = if dir.cross(Vec3::Y).length() > 1e-3 {
                    dir.cross(Vec3::Y).normalize()
                } else {
                    Vec3::X
                };
                let v = dir.cross(u);
                let center = apex + dir * range;
                let radius = range * angle.tan();

                const CIRCLE_STEPS: u32 = 24;
                let point = |i: u32| {
                    let t = std::f32::consts::TAU * i as f32 / CIRCLE_STEPS as f32;
                    center + (u * t.cos() + v * t.sin()) * radius
                };
                for i in 0..CIRCLE_STEPS {
                    line(&mut verts, point(i), point(i + 1), color);
                }
                for i in (0..CIRCLE_STEPS).step_by((CIRCLE_STEPS / 4) as usize) {
                    line(&mut verts, apex, point(i), color);
                }
            }
        }
    }

    verts
}

/// Per-frame uniform block: camera, lights, shadow projection, fog.
pub(crate) fn build_frame_uniforms(scene: &SceneGraph, view: &RenderView) -> FrameUniforms {
    let mut uniforms = FrameUniforms::zeroed();
    uniforms.view_proj = view.view_projection().to_cols_array_2d();
    uniforms.camera_pos = view.eye.extend(0.0).to_array();

    let mut ambient = Vec3::ZERO;
    let mut sun: Option<(Vec3, Vec3, bool, f32)> = None;
    let mut spot: Option<(Vec3, Vec3, f32, f32, bool)> = None;

    for node in scene.nodes() {
        let NodeKind::Light(light) = &node.kind else {
            continue;
        };
        let position = node.transform.position;
        match *light {
            LightNode::Ambient { color, intensity } => {
                ambient += Vec3::from(color.scaled(intensity).to_array());
            }
            LightNode::Directional {
                color,
                intensity,
                cast_shadow,
                shadow_extent,
            } => {
                if sun.is_none() && position.length() > f32::EPSILON {
                    sun = Some((
                        position.normalize(),
                        Vec3::from(color.scaled(intensity).to_array()),
                        cast_shadow,
                        shadow_extent,
                    ));
                }
            }
            LightNode::Spot {
                color,
                intensity,
                angle,
                penumbra,
                cast_shadow,
            } => {
                if spot.is_none() && position.length() > f32::EPSILON {
                    spot = Some((
                        position,
                        Vec3::from(color.scaled(intensity).to_array()),
                        angle,
                        penumbra,
                        cast_shadow,
                    ));
                }
            }
        }
    }

    uniforms.ambient = ambient.extend(0.0).to_array();

    if let Some((dir, color, _, _)) = sun {
        uniforms.sun_dir = dir.extend(1.0).to_array();
        uniforms.sun_color = color.extend(0.0).to_array();
    }

    let mut shadow_vp = None;
    if let Some((position, color, angle, penumbra, cast_shadow)) = spot {
        let cos_outer = angle.cos();
        let cos_inner = (angle * (1.0 - penumbra)).cos().max(cos_outer + 1e-4);
        let dir = -position.normalize();
        uniforms.spot_pos = position.extend(1.0).to_array();
        uniforms.spot_dir = dir.extend(cos_outer).to_array();
        uniforms.spot_color = color.extend(cos_inner).to_array();

        if cast_shadow {
            let distance = position.length();
            let up = if dir.cross(Vec3::Y).length() > 1e-3 {
                Vec3::Y
            } else {
                Vec3::Z
            };
            let light_view = Mat4::look_at_rh(position, Vec3::ZERO, up);
            let fov = (2.0 * angle).clamp(0.2, 3.0);
            let light_proj = Mat4::perspective_rh(fov, 1.0, 1.0, distance * 2.0 + 1.0);
            shadow_vp = Some(light_proj * light_view);
        }
    }
    if shadow_vp.is_none() {
        if let Some((dir, _, true, extent)) = sun {
            let position = dir * extent.max(1.0) * 4.0;
            let up = if dir.cross(Vec3::Y).length() > 1e-3 {
                Vec3::Y
            } else {
                Vec3::Z
            };
            let light_view = Mat4::look_at_rh(position, Vec3::ZERO, up);
            let light_proj = Mat4::orthographic_rh(
                -extent,
                extent,
                -extent,
                extent,
                1.0,
                position.length() * 2.0,
            );
            shadow_vp = Some(light_proj * light_view);
        }
    }

    let shadows_on = scene.shadows && shadow_vp.is_some();
    uniforms.light_view_proj = shadow_vp.unwrap_or(Mat4::IDENTITY).to_cols_array_2d();

    let (fog_color, fog_mode) = match scene.fog {
        None => ([0.0, 0.0, 0.0, 0.0], FOG_MODE_NONE),
        Some(Fog::Linear { color, near, far }) => {
            uniforms.fog_params[0] = near;
            uniforms.fog_params[1] = far;
            ([color.r, color.g, color.b, 0.0], FOG_MODE_LINEAR)
        }
        Some(Fog::Exp2 { color, density }) => {
            ([color.r, color.g, color.b, density], FOG_MODE_EXP2)
        }
    };
    uniforms.fog_color = fog_color;
    uniforms.fog_params[2] = fog_mode;
    uniforms.fog_params[3] = if shadows_on { 1.0 } else { 0.0 };

    uniforms
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagelight_scene::ScenePreset;

    #[test]
    fn studio_uniforms_carry_lights_fog_shadows() {
        let built = ScenePreset::Studio.build();
        let u = build_frame_uniforms(&built.scene, &RenderView::default());

        // Ambient 0x333333 at intensity 1.
        assert!((u.ambient[0] - 51.0 / 255.0).abs() < 1e-4);
        // Spot enabled with cos(0.2) outer angle.
        assert_eq!(u.spot_pos[3], 1.0);
        assert!((u.spot_dir[3] - 0.2_f32.cos()).abs() < 1e-5);
        // Penumbra 0 still leaves a nonzero smoothstep window.
        assert!(u.spot_color[3] > u.spot_dir[3]);
        // Linear fog 0..200, shadows on.
        assert_eq!(u.fog_params[0], 0.0);
        assert_eq!(u.fog_params[1], 200.0);
        assert_eq!(u.fog_params[2], FOG_MODE_LINEAR);
        assert_eq!(u.fog_params[3], 1.0);
    }

    #[test]
    fn bare_scene_disables_lights_and_fog() {
        let built = ScenePreset::SpinningBox.build();
        let u = build_frame_uniforms(&built.scene, &RenderView::default());
        assert_eq!(u.spot_pos[3], 0.0);
        assert_eq!(u.sun_dir[3], 0.0);
        assert_eq!(u.fog_params[2], FOG_MODE_NONE);
        assert_eq!(u.fog_params[3], 0.0);
    }

    #[test]
    fn batches_split_fill_and_wire() {
        let built = ScenePreset::Studio.build();
        let mut scene = built.scene;
        let batches = collect_batches(&scene);
        // box + plane + sphere, all filled.
        let filled: u32 = batches.fill.iter().map(|b| b.range.len() as u32).sum();
        assert_eq!(filled, 3);
        assert!(batches.wire.is_empty());
        // Only the sphere casts.
        let casting: u32 = batches.shadow.iter().map(|b| b.range.len() as u32).sum();
        assert_eq!(casting, 1);

        // Flip the sphere to wireframe: it moves buckets but keeps casting.
        let sphere = built.bouncer.unwrap();
        scene.mesh_mut(sphere).unwrap().material.wireframe = true;
        let batches = collect_batches(&scene);
        let filled: u32 = batches.fill.iter().map(|b| b.range.len() as u32).sum();
        assert_eq!(filled, 2);
        let wired: u32 = batches.wire.iter().map(|b| b.range.len() as u32).sum();
        assert_eq!(wired, 1);
        let casting: u32 = batches.shadow.iter().map(|b| b.range.len() as u32).sum();
        assert_eq!(casting, 1);
    }

    #[test]
    fn batch_ranges_are_disjoint_and_in_bounds() {
        let built = ScenePreset::Studio.build();
        let batches = collect_batches(&built.scene);
        let total = batches.instances.len() as u32;
        for batch in batches
            .fill
            .iter()
            .chain(batches.wire.iter())
            .chain(batches.shadow.iter())
        {
            assert!(batch.range.end <= total);
            assert!(batch.range.start < batch.range.end);
            assert!(batch.primitive < PRIM_COUNT);
        }
    }

    #[test]
    fn helper_lines_for_axes_only() {
        let built = ScenePreset::Axes.build();
        let lines = build_helper_lines(&built.scene);
        // Three axis arms, two vertices each.
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn helper_lines_include_grid_and_cone() {
        let built = ScenePreset::Studio.build();
        let lines = build_helper_lines(&built.scene);
        assert!(lines.len() % 2 == 0);
        // axes (6) + grid (11 lines each direction = 44 verts... 88) + cone.
        assert!(lines.len() > 100);
        assert!(lines.len() <= MAX_HELPER_VERTICES);
    }
}
