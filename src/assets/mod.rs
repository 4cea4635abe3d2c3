//! Player model loading
//!
//! The car is fetched as a binary glTF. Any failure falls back to a plain
//! green box so gameplay never waits on a broken asset.

pub mod glb;

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};
use thiserror::Error;

use crate::paint::Paintable;
use crate::renderer::mesh::{Vertex, cuboid};

/// Bounding box the loaded model is scaled to fit
pub const TARGET_SIZE: Vec3 = Vec3::new(4.0, 1.0, 8.0);
/// Yaw applied to the loaded model (radians)
pub const MODEL_YAW: f32 = std::f32::consts::FRAC_PI_2;
/// Warm tint applied to the loaded model
pub const MODEL_TINT: (f32, f32, f32) = (0.05, 0.1, 0.1);

const FALLBACK_SIZE: Vec3 = Vec3::new(1.0, 1.0, 2.0);
const FALLBACK_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("primitive has no POSITION attribute")]
    MissingPositions,
    #[error("index {0} out of range")]
    IndexOutOfRange(u32),
    #[error("model contains no triangle mesh")]
    NoMesh,
}

/// Indexed triangle mesh in model space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned bounds `(min, max)`
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    pub fn size(&self) -> Vec3 {
        self.bounds().map_or(Vec3::ZERO, |(lo, hi)| hi - lo)
    }
}

impl Paintable for MeshData {
    fn recolor(&mut self, f: &dyn Fn([f32; 3]) -> [f32; 3]) {
        for vertex in &mut self.vertices {
            vertex.color = f(vertex.color);
        }
    }
}

/// Uniform scale that fits `size` inside `target` on every axis
pub fn fit_scale(size: Vec3, target: Vec3) -> f32 {
    let ratio = |t: f32, s: f32| if s > f32::EPSILON { t / s } else { f32::INFINITY };
    let scale = ratio(target.x, size.x)
        .min(ratio(target.y, size.y))
        .min(ratio(target.z, size.z));
    if scale.is_finite() { scale } else { 1.0 }
}

/// Player car mesh plus its placement relative to the simulated position
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerModel {
    pub mesh: MeshData,
    pub scale: f32,
    pub yaw: f32,
    /// Vertical offset above the road
    pub lift: f32,
}

impl PlayerModel {
    /// Wrap a parsed mesh: fit to the target box, yaw and tint
    pub fn from_mesh(mut mesh: MeshData) -> Self {
        let scale = fit_scale(mesh.size(), TARGET_SIZE);
        let (dh, ds, dl) = MODEL_TINT;
        mesh.offset_hsl(dh, ds, dl);
        Self {
            mesh,
            scale,
            yaw: MODEL_YAW,
            lift: 0.0,
        }
    }

    /// 1 x 1 x 2 green box resting on the road
    pub fn fallback() -> Self {
        let (vertices, indices) = cuboid(FALLBACK_SIZE, FALLBACK_COLOR);
        Self {
            mesh: MeshData { vertices, indices },
            scale: 1.0,
            yaw: 0.0,
            lift: FALLBACK_SIZE.y * 0.5,
        }
    }

    /// Parse GLB bytes, degrading to the fallback on any error
    pub fn from_glb_or_fallback(bytes: &[u8]) -> Self {
        match glb::parse(bytes) {
            Ok(mesh) => Self::from_mesh(mesh),
            Err(e) => {
                log::error!("Failed to load player model ({}). Using fallback box.", e);
                Self::fallback()
            }
        }
    }

    /// World transform for a car at `pos` rolled by `tilt`
    pub fn transform(&self, pos: Vec3, tilt: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_z(tilt) * Quat::from_rotation_y(self.yaw),
            pos + Vec3::Y * self.lift,
        )
    }
}

/// Shared readiness slot filled once by the async loader
#[derive(Debug, Clone, Default)]
pub struct AssetSlot {
    model: Rc<RefCell<Option<Rc<PlayerModel>>>>,
}

impl AssetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.model.borrow().is_some()
    }

    pub fn fill(&self, model: PlayerModel) {
        *self.model.borrow_mut() = Some(Rc::new(model));
    }

    pub fn get(&self) -> Option<Rc<PlayerModel>> {
        self.model.borrow().clone()
    }
}

/// Fetch and parse the player model
#[cfg(target_arch = "wasm32")]
pub async fn fetch_glb(url: &str) -> Result<Vec<u8>, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_err = |e: wasm_bindgen::JsValue| LoadError::Fetch(format!("{:?}", e));

    let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".into()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_err)?
        .dyn_into()
        .map_err(fetch_err)?;
    if !response.ok() {
        return Err(LoadError::Fetch(format!("HTTP {}", response.status())));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_err)?)
        .await
        .map_err(fetch_err)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Load the player model into `slot`; failures still fill it with the fallback
#[cfg(target_arch = "wasm32")]
pub async fn load_player_model(url: &str, slot: AssetSlot) {
    let model = match fetch_glb(url).await {
        Ok(bytes) => PlayerModel::from_glb_or_fallback(&bytes),
        Err(e) => {
            log::error!("Failed to load player model ({}). Using fallback box.", e);
            PlayerModel::fallback()
        }
    };
    slot.fill(model);
    log::info!("Player model ready");
}
