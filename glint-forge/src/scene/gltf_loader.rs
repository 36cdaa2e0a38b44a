use std::path::Path;

use glam::Mat4;
use gltf::animation::util::ReadOutputs;

use crate::error::SceneError;

use super::{
    Animation, AnimationChannel, AssetInfo, ChannelValues, ImageData, Interpolation, Material,
    Mesh, Node, PixelFormat, Primitive, Scene, Skin, SkinnedVertex, TargetProperty, Texture,
    Vertex,
};

/// Import a glTF / glb file into the in-memory scene, recording which
/// vertex attributes were actually present on disk.
pub fn load_scene(path: &Path) -> Result<Scene, SceneError> {
    let (document, buffers, image_data) = gltf::import(path)?;

    let mut nodes: Vec<Node> = document
        .nodes()
        .map(|node| {
            log::debug!("loading node \"{}\"", node.name().unwrap_or("<unnamed>"));
            Node {
                name: node.name().unwrap_or("<unnamed>").to_owned(),
                parent: None,
                children: node.children().map(|child| child.index() as u32).collect(),
                local_transform: Mat4::from_cols_array_2d(&node.transform().matrix()),
                mesh_index: node.mesh().map(|mesh| mesh.index() as u32),
                skin_index: node.skin().map(|skin| skin.index() as u32),
            }
        })
        .collect();
    let child_to_parent: Vec<(u32, u32)> = nodes
        .iter()
        .enumerate()
        .flat_map(|(parent, node)| {
            node.children
                .iter()
                .map(move |&child| (child, parent as u32))
        })
        .collect();
    for (child, parent) in child_to_parent {
        nodes[child as usize].parent = Some(parent);
    }

    let meshes = document
        .meshes()
        .map(|mesh| load_mesh(&mesh, &buffers))
        .collect::<Result<Vec<_>, _>>()?;

    let materials = document
        .materials()
        .filter(|material| material.index().is_some())
        .map(|material| load_material(&material))
        .collect();

    let textures = document
        .textures()
        .map(|texture| Texture {
            name: texture.name().unwrap_or("<unnamed>").to_owned(),
            image_index: texture.source().index() as u32,
        })
        .collect();

    let images = document
        .images()
        .zip(image_data)
        .map(|(image, data)| load_image(&image, data))
        .collect();

    let skins = document
        .skins()
        .map(|skin| load_skin(&skin, &buffers))
        .collect();

    let animations = document
        .animations()
        .map(|animation| load_animation(&animation, &buffers))
        .collect::<Result<Vec<_>, _>>()?;

    let root = document.into_json();
    let info = AssetInfo {
        copyright: root.asset.copyright.clone(),
        generator: root.asset.generator.clone(),
        extras: root.asset.extras.as_deref().map(|raw| raw.get().to_owned()),
    };

    Ok(Scene {
        info,
        nodes,
        meshes,
        materials,
        textures,
        images,
        skins,
        animations,
    })
}

fn load_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh, SceneError> {
    let mesh_name = mesh.name().unwrap_or("<unnamed>");
    log::debug!("loading mesh \"{mesh_name}\"");
    let primitive_count = mesh.primitives().count();

    let mut primitives = Vec::with_capacity(primitive_count);
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(SceneError::MalformedScene(format!(
                "primitive {} of mesh \"{mesh_name}\" is not a triangle list",
                primitive.index()
            )));
        }
        let reader = primitive.reader(|buffer| Some(&*buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| {
                SceneError::MalformedScene(format!("mesh \"{mesh_name}\" has no positions"))
            })?
            .collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
        let tangents: Option<Vec<[f32; 4]>> = reader.read_tangents().map(|iter| iter.collect());
        let uvs: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().collect());
        let colors: Option<Vec<[f32; 3]>> = reader
            .read_colors(0)
            .map(|iter| iter.into_rgb_f32().collect());
        let joints: Option<Vec<[u16; 4]>> =
            reader.read_joints(0).map(|iter| iter.into_u16().collect());
        let weights: Option<Vec<[f32; 4]>> =
            reader.read_weights(0).map(|iter| iter.into_f32().collect());

        let name = if primitive_count > 1 {
            format!("{mesh_name}.{}", primitive.index())
        } else {
            mesh_name.to_owned()
        };
        let mut loaded = Primitive {
            name,
            material_index: primitive.material().index().map(|index| index as u32),
            is_skinned: joints.is_some() && weights.is_some(),
            indices,
            had_normals: normals.is_some(),
            had_tangents: tangents.is_some(),
            had_tex_coords: uvs.is_some(),
            ..Default::default()
        };

        let attributes = |i: usize| Vertex {
            position: positions[i],
            normal: normals.as_ref().map_or([0.0; 3], |values| values[i]),
            tangent: tangents.as_ref().map_or([0.0; 4], |values| values[i]),
            color: colors.as_ref().map_or([1.0; 3], |values| values[i]),
            uv: uvs.as_ref().map_or([0.0; 2], |values| values[i]),
        };
        if let (true, Some(joints), Some(weights)) = (loaded.is_skinned, &joints, &weights) {
            loaded.skinned_vertices = (0..positions.len())
                .map(|i| SkinnedVertex {
                    bone_ids: joints[i].map(u32::from),
                    bone_weights: weights[i],
                    ..attributes(i).into()
                })
                .collect();
        } else {
            loaded.vertices = (0..positions.len()).map(attributes).collect();
        }

        primitives.push(loaded);
    }

    Ok(Mesh {
        name: mesh_name.to_owned(),
        primitives,
    })
}

fn load_material(material: &gltf::Material) -> Material {
    log::debug!(
        "loading material \"{}\"",
        material.name().unwrap_or("<unnamed>")
    );
    let pbr = material.pbr_metallic_roughness();
    Material {
        name: material.name().unwrap_or("<unnamed>").to_owned(),
        base_color_factor: pbr.base_color_factor(),
        metallic_factor: pbr.metallic_factor(),
        roughness_factor: pbr.roughness_factor(),
        emissive_factor: material.emissive_factor(),
        base_color_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().index() as u32),
        normal_texture: material
            .normal_texture()
            .map(|info| info.texture().index() as u32),
        metallic_roughness_texture: pbr
            .metallic_roughness_texture()
            .map(|info| info.texture().index() as u32),
        emissive_texture: material
            .emissive_texture()
            .map(|info| info.texture().index() as u32),
        double_sided: material.double_sided(),
        alpha_cutoff: material.alpha_cutoff(),
    }
}

fn load_image(image: &gltf::Image, data: gltf::image::Data) -> ImageData {
    let format = match data.format {
        gltf::image::Format::R8 => PixelFormat::R8,
        gltf::image::Format::R8G8 => PixelFormat::Rg8,
        gltf::image::Format::R8G8B8 => PixelFormat::Rgb8,
        gltf::image::Format::R8G8B8A8 => PixelFormat::Rgba8,
        gltf::image::Format::R16 => PixelFormat::R16,
        gltf::image::Format::R16G16 => PixelFormat::Rg16,
        gltf::image::Format::R16G16B16 => PixelFormat::Rgb16,
        gltf::image::Format::R16G16B16A16 => PixelFormat::Rgba16,
        gltf::image::Format::R32G32B32FLOAT => PixelFormat::Rgb32F,
        gltf::image::Format::R32G32B32A32FLOAT => PixelFormat::Rgba32F,
    };
    ImageData {
        name: image.name().unwrap_or("<unnamed>").to_owned(),
        format,
        width: data.width,
        height: data.height,
        pixels: data.pixels,
    }
}

fn load_skin(skin: &gltf::Skin, buffers: &[gltf::buffer::Data]) -> Skin {
    let reader = skin.reader(|buffer| Some(&*buffers[buffer.index()]));
    let inverse_bind_matrices = reader
        .read_inverse_bind_matrices()
        .map(|matrices| matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect())
        .unwrap_or_default();
    Skin {
        name: skin.name().unwrap_or("<unnamed>").to_owned(),
        joints: skin.joints().map(|joint| joint.index() as u32).collect(),
        inverse_bind_matrices,
    }
}

fn load_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
) -> Result<Animation, SceneError> {
    let name = animation.name().unwrap_or("<unnamed>").to_owned();
    log::debug!("loading animation \"{name}\"");

    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&*buffers[buffer.index()]));
        let timestamps: Vec<f32> = reader
            .read_inputs()
            .ok_or_else(|| {
                SceneError::MalformedScene(format!(
                    "animation \"{name}\" channel has no keyframe times"
                ))
            })?
            .collect();
        let values = match reader.read_outputs().ok_or_else(|| {
            SceneError::MalformedScene(format!("animation \"{name}\" channel has no values"))
        })? {
            ReadOutputs::Translations(iter) => ChannelValues::Translations(iter.collect()),
            ReadOutputs::Rotations(iter) => ChannelValues::Rotations(iter.into_f32().collect()),
            ReadOutputs::Scales(iter) => ChannelValues::Scales(iter.collect()),
            ReadOutputs::MorphTargetWeights(iter) => {
                ChannelValues::Weights(iter.into_f32().collect())
            }
        };
        let property = match channel.target().property() {
            gltf::animation::Property::Translation => TargetProperty::Translation,
            gltf::animation::Property::Rotation => TargetProperty::Rotation,
            gltf::animation::Property::Scale => TargetProperty::Scale,
            gltf::animation::Property::MorphTargetWeights => TargetProperty::MorphWeights,
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };
        channels.push(AnimationChannel {
            target_node: channel.target().node().index() as u32,
            property,
            interpolation,
            timestamps,
            values,
        });
    }

    Ok(Animation { name, channels })
}
