//! WebGPU rendering module
//!
//! The scene is drawn into an offscreen target, then composited onto the
//! surface through a full-screen opacity pass.

pub mod camera;
pub mod composite;
pub mod mesh;
pub mod scene;

pub use camera::CameraRig;

use thiserror::Error;

use crate::assets::PlayerModel;
use crate::settings::Settings;
use crate::sim::GameState;
use composite::CompositePass;
use mesh::Instance;
use scene::{ScenePass, build_instances};

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface does not support this adapter")]
    UnsupportedSurface,
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    scene: ScenePass,
    composite: CompositePass,
    camera: CameraRig,
    pub size: (u32, u32),
}

impl Renderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, RendererError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("highway-rush-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RendererError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(RendererError::UnsupportedSurface)?;

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let scene = ScenePass::new(&device, surface_format, width, height);
        let composite = CompositePass::new(&device, surface_format, &scene.color_view);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            scene,
            composite,
            camera: CameraRig::default(),
            size: (width, height),
        })
    }

    /// Create the instance, surface and adapter for a browser canvas
    #[cfg(target_arch = "wasm32")]
    pub async fn for_canvas(
        canvas: web_sys::HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        Self::new(surface, &adapter, width, height).await
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.scene
                .resize(&self.device, self.config.format, new_width, new_height);
            self.composite.rebind(&self.device, &self.scene.color_view);
        }
    }

    /// Reconfigure after the surface was lost
    pub fn reconfigure(&mut self) {
        let (width, height) = self.size;
        self.resize(width, height);
    }

    /// Upload the player mesh (first call only)
    pub fn ensure_player_model(&mut self, model: &PlayerModel) {
        if !self.scene.has_player_model() {
            self.scene.set_player_model(&self.device, model);
        }
    }

    /// Draw one frame of the current state
    pub fn render(
        &mut self,
        state: &GameState,
        model: Option<&PlayerModel>,
        settings: &Settings,
    ) -> Result<(), wgpu::SurfaceError> {
        self.camera.update(state);
        let aspect = self.size.0 as f32 / self.size.1.max(1) as f32;
        let view_proj = self.camera.view_proj(aspect);

        let instances = build_instances(state, settings);
        let player = model.map(|m| {
            Instance::new(m.transform(state.player.pos, state.player.tilt), [1.0; 4])
        });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        self.scene
            .draw(&self.queue, &mut encoder, view_proj, &instances, player);
        self.composite
            .draw(&self.queue, &mut encoder, &view, settings.trail_opacity());

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
