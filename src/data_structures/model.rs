//! Loaded models and their meshes.
//!
//! A [`Model`] is the list of top-level children of a glTF scene. Each
//! [`ModelNode`] carries its name, the material bound to it and the meshes of
//! the whole subtree below it. The mesh payload is generic so the binding
//! logic does not need a GPU.

use crate::materials::MaterialId;

/// Describes how the bytes of a vertex type are laid out in a vertex buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// The scene is unlit: vertices need nothing but a position and a UV.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Mesh uploaded to the GPU. Vertex positions are already in world space.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

#[derive(Debug)]
pub struct ModelNode<M> {
    pub name: String,
    pub material: Option<MaterialId>,
    pub meshes: Vec<M>,
}

impl<M> ModelNode<M> {
    pub fn new(name: impl Into<String>, meshes: Vec<M>) -> Self {
        Self {
            name: name.into(),
            material: None,
            meshes,
        }
    }
}

#[derive(Debug)]
pub struct Model<M> {
    pub children: Vec<ModelNode<M>>,
}

impl<M> Model<M> {
    pub fn new(children: Vec<ModelNode<M>>) -> Self {
        Self { children }
    }

    /// First top-level child whose name matches exactly.
    pub fn child(&self, name: &str) -> Option<&ModelNode<M>> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.name == name)
    }
}

/// Draw a mesh whose pipeline and bind groups are already set.
pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a GpuMesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b GpuMesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }
}
