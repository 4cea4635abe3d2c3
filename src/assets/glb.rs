//! Binary glTF mesh extraction
//!
//! Takes what the car model needs: triangle primitives with positions,
//! optional normals and indices, and a flat base colour per material. Node
//! transforms, textures and skins are ignored.

use glam::Vec3;
use gltf::buffer::Source;
use gltf::mesh::Mode;

use super::{LoadError, MeshData};
use crate::renderer::mesh::Vertex;

const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Area-weighted vertex normals for primitives that ship without them
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(positions[a]);
        let n = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// Parse a `.glb` file into a single merged mesh
pub fn parse(bytes: &[u8]) -> Result<MeshData, LoadError> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let blob = gltf.blob.as_deref();

    let mut mesh = MeshData::default();
    for primitive in gltf.meshes().flat_map(|m| m.primitives()) {
        if primitive.mode() != Mode::Triangles {
            log::warn!("Skipping non-triangle primitive");
            continue;
        }

        // Only the embedded BIN chunk is available
        let reader = primitive.reader(|buffer| match buffer.source() {
            Source::Bin => blob,
            Source::Uri(_) => None,
        });

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or(LoadError::MissingPositions)?
            .collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(LoadError::IndexOutOfRange(*bad));
        }
        let normals = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => smooth_normals(&positions, &indices),
        };

        let [r, g, b, _] = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend(
            positions
                .iter()
                .zip(normals.iter().chain(std::iter::repeat(&UP)))
                .map(|(p, n)| Vertex::new(*p, *n, [r, g, b])),
        );
        mesh.indices.extend(indices.iter().map(|i| base + i));
    }

    if mesh.vertices.is_empty() {
        return Err(LoadError::NoMesh);
    }
    log::info!(
        "Parsed GLB: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.indices.len() / 3
    );
    Ok(mesh)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const GLB_MAGIC: &[u8; 4] = b"glTF";
    const CHUNK_JSON: &[u8; 4] = b"JSON";
    const CHUNK_BIN: &[u8; 4] = b"BIN\0";

    fn pad4(mut data: Vec<u8>, fill: u8) -> Vec<u8> {
        while data.len() % 4 != 0 {
            data.push(fill);
        }
        data
    }

    /// Build a GLB container from a JSON document and a binary blob
    pub(crate) fn build_glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let json = pad4(json.as_bytes().to_vec(), b' ');
        let bin = pad4(bin.to_vec(), 0);
        let bin_chunk = if bin.is_empty() { 0 } else { 8 + bin.len() };
        let total = 12 + 8 + json.len() + bin_chunk;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(GLB_MAGIC);
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(CHUNK_JSON);
        out.extend_from_slice(&json);
        if !bin.is_empty() {
            out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
            out.extend_from_slice(CHUNK_BIN);
            out.extend_from_slice(&bin);
        }
        out
    }

    /// One red triangle spanning 2 x 1 x 4 with u16 indices and no normals
    pub(crate) fn triangle_glb() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 4.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let json = r#"{
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 44}],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 6}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0.0, 0.0, 0.0], "max": [2.0, 1.0, 4.0]},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ],
            "materials": [{"pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.0, 0.0, 1.0]}}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1, "material": 0}]}]
        }"#;
        build_glb(json, &bin)
    }

    #[test]
    fn test_parse_triangle() {
        let mesh = parse(&triangle_glb()).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].position, [2.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[0].color, [1.0, 0.0, 0.0]);
        // Generated normal is perpendicular to the triangle
        let n = Vec3::from(mesh.vertices[0].normal);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.dot(Vec3::X).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_non_gltf() {
        assert!(parse(b"definitely not a model").is_err());
    }

    #[test]
    fn test_rejects_truncated() {
        let bytes = triangle_glb();
        assert!(parse(&bytes[..8]).is_err());
        assert!(parse(&bytes[..bytes.len() - 4]).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let bytes = build_glb("{not json", &[]);
        assert!(matches!(parse(&bytes), Err(LoadError::Gltf(_))));
    }

    #[test]
    fn test_empty_document_has_no_mesh() {
        let bytes = build_glb(r#"{"asset": {"version": "2.0"}}"#, &[]);
        assert!(matches!(parse(&bytes), Err(LoadError::NoMesh)));
    }
}
