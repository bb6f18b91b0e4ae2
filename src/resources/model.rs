//! glTF / GLB model loading.
//!
//! Each top-level node of the default scene becomes one [`ModelNode`]. The
//! meshes of its whole subtree are uploaded with their world transform
//! applied to the vertex positions, since the room is static.

use cgmath::{Matrix4, SquareMatrix, Vector4};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::model::{GpuMesh, Model, ModelNode, ModelVertex},
    error::PortalError,
    resources::load_binary,
};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
) -> Result<Model<GpuMesh>, PortalError> {
    let asset_error = |source: anyhow::Error| PortalError::AssetLoad {
        path: file_name.to_string(),
        source,
    };

    let bytes = load_binary(file_name).await.map_err(asset_error)?;
    let gltf = gltf::Gltf::from_slice(&bytes).map_err(|e| asset_error(e.into()))?;

    if let Some(extension) = gltf
        .extensions_required()
        .find(|extension| *extension == DRACO_EXTENSION)
    {
        return Err(PortalError::UnsupportedExtension {
            path: file_name.to_string(),
            extension: extension.to_string(),
        });
    }

    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| asset_error(anyhow::anyhow!("GLB has no binary chunk")))?;
                buffer_data.push(blob.into());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await.map_err(asset_error)?;
                buffer_data.push(bin);
            }
        }
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| asset_error(anyhow::anyhow!("file contains no scene")))?;

    let children = scene
        .nodes()
        .map(|node| {
            let name = node.name().unwrap_or_default().to_string();
            let mut meshes = Vec::new();
            collect_meshes(&node, Matrix4::identity(), &buffer_data, device, &mut meshes);
            ModelNode::new(name, meshes)
        })
        .collect::<Vec<_>>();

    log::info!(
        "loaded {file_name}: {} top-level children ({})",
        children.len(),
        children
            .iter()
            .map(|child| child.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(Model::new(children))
}

fn collect_meshes(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[Vec<u8>],
    device: &wgpu::Device,
    out: &mut Vec<GpuMesh>,
) {
    let world = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let name = mesh.name().or(node.name()).unwrap_or("unnamed_mesh");
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                log::warn!("primitive {} of {name} has no positions", primitive.index());
                continue;
            };
            let mut vertices = positions
                .map(|position| {
                    let p = world * Vector4::new(position[0], position[1], position[2], 1.0);
                    ModelVertex {
                        position: [p.x, p.y, p.z],
                        tex_coords: [0.0; 2],
                    }
                })
                .collect::<Vec<_>>();
            if let Some(tex_coords) = reader.read_tex_coords(0) {
                vertices
                    .iter_mut()
                    .zip(tex_coords.into_f32())
                    .for_each(|(vertex, uv)| vertex.tex_coords = uv);
            }
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            out.push(upload_mesh(device, name, &vertices, &indices));
        }
    }
    for child in node.children() {
        collect_meshes(&child, world, buffers, device, out);
    }
}

fn upload_mesh(
    device: &wgpu::Device,
    name: &str,
    vertices: &[ModelVertex],
    indices: &[u32],
) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Vertex Buffer")),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Index Buffer")),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    GpuMesh {
        name: name.to_string(),
        vertex_buffer,
        index_buffer,
        num_elements: indices.len() as u32,
    }
}
