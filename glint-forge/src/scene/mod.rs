use std::path::Path;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

pub mod blob;
pub mod gltf_loader;
mod meshlet;
mod primitive;
mod vertex;

pub use meshlet::Meshlet;
pub use primitive::Primitive;
pub use vertex::{SkinnedVertex, Vertex};

/// Authoring metadata carried through conversion untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    pub copyright: Option<String>,
    pub generator: Option<String>,
    /// Raw JSON of the source asset's `extras` field, if any.
    pub extras: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    pub local_transform: Mat4,
    pub mesh_index: Option<u32>,
    pub skin_index: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: [f32; 3],
    pub base_color_texture: Option<u32>,
    pub normal_texture: Option<u32>,
    pub metallic_roughness_texture: Option<u32>,
    pub emissive_texture: Option<u32>,
    pub double_sided: bool,
    pub alpha_cutoff: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    pub image_index: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
    R16,
    Rg16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageData {
    pub name: String,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Skin {
    pub name: String,
    /// Joint node indices, in joint order.
    pub joints: Vec<u32>,
    pub inverse_bind_matrices: Vec<Mat4>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetProperty {
    Translation,
    Rotation,
    Scale,
    MorphWeights,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ChannelValues {
    Translations(Vec<[f32; 3]>),
    Rotations(Vec<[f32; 4]>),
    Scales(Vec<[f32; 3]>),
    Weights(Vec<f32>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationChannel {
    pub target_node: u32,
    pub property: TargetProperty,
    pub interpolation: Interpolation,
    pub timestamps: Vec<f32>,
    pub values: ChannelValues,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<AnimationChannel>,
}

/// A loaded scene. The conditioner regenerates the buffer data inside
/// `meshes`; every other section passes through load -> write verbatim.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    pub info: AssetInfo,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub images: Vec<ImageData>,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
}

impl Scene {
    /// Load a scene, dispatching on the file extension: glTF sources go
    /// through the glTF importer, previously conditioned scenes are read
    /// back from the binary blob format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("gltf") | Some("glb") => gltf_loader::load_scene(path),
            Some("gscn") => blob::read_scene_from_file(path),
            _ => Err(SceneError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.meshes.iter().flat_map(|mesh| mesh.primitives.iter())
    }

    pub fn primitives_mut(&mut self) -> impl Iterator<Item = &mut Primitive> {
        self.meshes
            .iter_mut()
            .flat_map(|mesh| mesh.primitives.iter_mut())
    }
}
