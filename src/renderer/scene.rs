//! Scene pass: instanced boxes plus the player mesh into an offscreen target

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::mesh::{Instance, Vertex, cuboid};
use crate::assets::PlayerModel;
use crate::consts::*;
use crate::paint::hsl_to_rgb;
use crate::settings::Settings;
use crate::sim::GameState;

/// Instance buffer capacity; anything past this is not drawn
pub const MAX_INSTANCES: usize = 1024;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Sunrise sky behind everything
pub fn clear_color() -> wgpu::Color {
    let [r, g, b] = hsl_to_rgb([0.08, 0.7, 0.7]);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

mod palette {
    pub const ASPHALT: [f32; 4] = [0.22, 0.22, 0.24, 1.0];
    pub const SHOULDER: [f32; 4] = [0.55, 0.5, 0.45, 1.0];
    pub const GROUND: [f32; 4] = [0.76, 0.6, 0.42, 1.0];
    pub const LANE_LINE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const DUST: [f32; 3] = [0.85, 0.75, 0.6];
}

const TRAFFIC_SIZE: Vec3 = Vec3::new(1.0, 1.0, 2.0);
const LANE_LINE_SIZE: Vec3 = Vec3::new(0.1, 0.01, 1.0);

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    sun_dir: [f32; 4], // w = intensity
    sky_color: [f32; 4],
    ground_color: [f32; 4],
}

/// Per-frame instance lists, split by blending
#[derive(Debug, Default)]
pub struct SceneInstances {
    pub opaque: Vec<Instance>,
    pub translucent: Vec<Instance>,
}

impl SceneInstances {
    pub fn total(&self) -> usize {
        self.opaque.len() + self.translucent.len()
    }
}

/// Collect every box drawn this frame from the simulation state
pub fn build_instances(state: &GameState, settings: &Settings) -> SceneInstances {
    let mut out = SceneInstances::default();

    // Ground follows the car so it never runs out
    out.opaque.push(Instance::boxed(
        Vec3::new(0.0, -0.15, state.player.pos.z + 150.0),
        Vec3::new(600.0, 0.1, 600.0),
        palette::GROUND,
    ));

    let half_road = ROAD_WIDTH * 0.5;
    for &z in &state.road.segments {
        out.opaque.push(Instance::boxed(
            Vec3::new(0.0, -0.05, z),
            Vec3::new(ROAD_WIDTH, 0.1, ROAD_SEGMENT_LENGTH),
            palette::ASPHALT,
        ));
        for side in [-1.0, 1.0] {
            out.opaque.push(Instance::boxed(
                Vec3::new(side * (half_road + 0.25), -0.04, z),
                Vec3::new(0.5, 0.1, ROAD_SEGMENT_LENGTH),
                palette::SHOULDER,
            ));
        }
    }

    for &line in &state.road.lines {
        out.opaque
            .push(Instance::boxed(line, LANE_LINE_SIZE, palette::LANE_LINE));
    }

    for car in &state.traffic {
        let [r, g, b] = car.color;
        out.opaque.push(Instance::boxed(
            car.pos + Vec3::Y * TRAFFIC_SIZE.y * 0.5,
            TRAFFIC_SIZE,
            [r, g, b, 1.0],
        ));
    }

    if settings.dust {
        let [r, g, b] = palette::DUST;
        for puff in &state.dust {
            let alpha = puff.opacity(state.time, state.tuning.dust_lifetime);
            if alpha <= 0.0 {
                continue;
            }
            out.translucent.push(Instance::boxed(
                puff.pos,
                Vec3::new(puff.scale.x, puff.scale.y, 0.05),
                [r, g, b, alpha],
            ));
        }
    }

    out
}

pub struct ScenePass {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    cube_vertices: wgpu::Buffer,
    cube_indices: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,

    player_vertices: Option<wgpu::Buffer>,
    player_indices: Option<wgpu::Buffer>,
    player_index_count: u32,
    player_instance: wgpu::Buffer,

    pub color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl ScenePass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let make_pipeline = |label: &str, blend: wgpu::BlendState, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc(), Instance::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };
        let opaque_pipeline = make_pipeline("scene_opaque", wgpu::BlendState::REPLACE, true);
        let translucent_pipeline =
            make_pipeline("scene_translucent", wgpu::BlendState::ALPHA_BLENDING, false);

        let (vertices, indices) = cuboid(Vec3::ONE, [1.0; 3]);
        let cube_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_instances"),
            size: (std::mem::size_of::<Instance>() * MAX_INSTANCES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let player_instance = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("player_instance"),
            size: std::mem::size_of::<Instance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (color_view, depth_view) = Self::create_targets(device, format, width, height);

        Self {
            opaque_pipeline,
            translucent_pipeline,
            globals_buffer,
            bind_group,
            cube_vertices,
            cube_indices,
            cube_index_count: indices.len() as u32,
            instance_buffer,
            player_vertices: None,
            player_indices: None,
            player_index_count: 0,
            player_instance,
            color_view,
            depth_view,
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> (wgpu::TextureView, wgpu::TextureView) {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene_color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene_depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        (
            color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth.create_view(&wgpu::TextureViewDescriptor::default()),
        )
    }

    /// Recreate offscreen targets after a surface resize
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) {
        let (color_view, depth_view) = Self::create_targets(device, format, width, height);
        self.color_view = color_view;
        self.depth_view = depth_view;
    }

    /// Upload the player mesh once it has loaded
    pub fn set_player_model(&mut self, device: &wgpu::Device, model: &PlayerModel) {
        self.player_vertices = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("player_vertices"),
            contents: bytemuck::cast_slice(&model.mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.player_indices = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("player_indices"),
            contents: bytemuck::cast_slice(&model.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.player_index_count = model.mesh.indices.len() as u32;
    }

    pub fn has_player_model(&self) -> bool {
        self.player_vertices.is_some()
    }

    /// Upload per-frame data and record the scene pass
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view_proj: glam::Mat4,
        instances: &SceneInstances,
        player: Option<Instance>,
    ) {
        let globals = Globals {
            view_proj: view_proj.to_cols_array_2d(),
            sun_dir: [0.3, 0.4, 1.0, 0.8],
            sky_color: [1.0, 1.0, 1.0, 1.0],
            ground_color: [0.53, 0.73, 1.0, 1.0],
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let opaque_count = instances.opaque.len().min(MAX_INSTANCES);
        let translucent_count = instances
            .translucent
            .len()
            .min(MAX_INSTANCES - opaque_count);
        if instances.total() > MAX_INSTANCES {
            log::warn!(
                "Dropping {} instances over capacity",
                instances.total() - MAX_INSTANCES
            );
        }
        let mut packed = Vec::with_capacity(opaque_count + translucent_count);
        packed.extend_from_slice(&instances.opaque[..opaque_count]);
        packed.extend_from_slice(&instances.translucent[..translucent_count]);
        if !packed.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&packed));
        }
        if let Some(player) = player {
            queue.write_buffer(&self.player_instance, 0, bytemuck::bytes_of(&player));
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_pipeline(&self.opaque_pipeline);

        // Boxes
        pass.set_vertex_buffer(0, self.cube_vertices.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.cube_indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.cube_index_count, 0, 0..opaque_count as u32);

        // Player car
        if let (Some(vertices), Some(indices), Some(_)) =
            (&self.player_vertices, &self.player_indices, player)
        {
            pass.set_vertex_buffer(0, vertices.slice(..));
            pass.set_vertex_buffer(1, self.player_instance.slice(..));
            pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.player_index_count, 0, 0..1);
        }

        // Dust last, over the depth written above
        if translucent_count > 0 {
            pass.set_pipeline(&self.translucent_pipeline);
            pass.set_vertex_buffer(0, self.cube_vertices.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.set_index_buffer(self.cube_indices.slice(..), wgpu::IndexFormat::Uint32);
            let start = opaque_count as u32;
            pass.draw_indexed(
                0..self.cube_index_count,
                0,
                start..start + translucent_count as u32,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DustPuff, TrafficCar};
    use glam::Vec2;

    #[test]
    fn test_fresh_scene_has_road_and_lines() {
        let state = GameState::new(1, 0);
        let instances = build_instances(&state, &Settings::default());
        // ground + 3 segments with two shoulders each + lane lines
        let expected = 1 + ROAD_SEGMENT_COUNT * 3 + state.road.lines.len();
        assert_eq!(instances.opaque.len(), expected);
        assert!(instances.translucent.is_empty());
    }

    #[test]
    fn test_traffic_sits_on_the_road() {
        let mut state = GameState::new(1, 0);
        state.traffic.push(TrafficCar {
            id: 1,
            pos: Vec3::new(2.0, 0.0, 30.0),
            color: [1.0, 0.0, 0.0],
        });
        let instances = build_instances(&state, &Settings::default());
        let car = instances.opaque.last().unwrap();
        assert_eq!(car.color, [1.0, 0.0, 0.0, 1.0]);
        // Translation column
        assert_eq!(car.model[3], [2.0, 0.5, 30.0, 1.0]);
    }

    #[test]
    fn test_dust_respects_setting_and_fades() {
        let mut state = GameState::new(1, 0);
        state.time = 0.25;
        state.dust.push(DustPuff {
            pos: Vec3::new(0.0, 0.1, -11.0),
            scale: Vec2::ONE,
            born_at: 0.0,
        });

        let shown = build_instances(&state, &Settings::default());
        assert_eq!(shown.translucent.len(), 1);
        assert!((shown.translucent[0].color[3] - 0.2).abs() < 1e-5);

        let hidden = build_instances(
            &state,
            &Settings {
                dust: false,
                ..Default::default()
            },
        );
        assert!(hidden.translucent.is_empty());
    }

    #[test]
    fn test_clear_color_is_warm() {
        let c = clear_color();
        assert!(c.r > c.g && c.g > c.b);
    }
}
