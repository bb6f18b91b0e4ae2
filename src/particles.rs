//! Firefly particle field.
//!
//! The field is generated once at startup and never changes afterwards. Each
//! firefly is a position inside a 4 x 1.5 x 4 box above the floor plus a
//! scale factor that drives both its size and how far it drifts.

use rand::Rng;

use crate::data_structures::model::Vertex;

/// Half extent of the box on the x and z axes.
const SPREAD: f32 = 4.0;
const HEIGHT: f32 = 1.5;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleField {
    pub positions: Vec<[f32; 3]>,
    pub scales: Vec<f32>,
}

impl ParticleField {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as one flat `x, y, z, x, y, z, ...` slice.
    pub fn position_floats(&self) -> Vec<f32> {
        self.positions.iter().flatten().copied().collect()
    }

    pub fn instances(&self) -> Vec<FireflyInstance> {
        self.positions
            .iter()
            .zip(&self.scales)
            .map(|(&position, &scale)| FireflyInstance { position, scale })
            .collect()
    }
}

/// Generate `count` fireflies from the thread-local random source.
pub fn generate(count: u32) -> ParticleField {
    generate_with(count, &mut rand::rng())
}

pub fn generate_with<R: Rng + ?Sized>(count: u32, rng: &mut R) -> ParticleField {
    let count = count as usize;
    let mut positions = Vec::with_capacity(count);
    let mut scales = Vec::with_capacity(count);
    for _ in 0..count {
        let x = (rng.random::<f32>() - 0.5) * SPREAD;
        let y = rng.random::<f32>() * HEIGHT;
        let z = (rng.random::<f32>() - 0.5) * SPREAD;
        positions.push([x, y, z]);
        scales.push(rng.random::<f32>());
    }
    ParticleField { positions, scales }
}

/// Per-firefly data as stored in the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FireflyInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

impl Vertex for FireflyInstance {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FireflyInstance>() as wgpu::BufferAddress,
            // One quad of six vertices is expanded per instance in the shader
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn positions_stay_inside_the_box() {
        let field = generate(500);
        assert_eq!(field.len(), 500);
        assert_eq!(field.scales.len(), 500);
        for [x, y, z] in &field.positions {
            assert!((-2.0..=2.0).contains(x));
            assert!((0.0..=1.5).contains(y));
            assert!((-2.0..=2.0).contains(z));
        }
        assert!(field.scales.iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn empty_field() {
        let field = generate(0);
        assert!(field.is_empty());
        assert!(field.position_floats().is_empty());
        assert!(field.instances().is_empty());
    }

    #[test]
    fn same_seed_same_field() {
        let a = generate_with(30, &mut StdRng::seed_from_u64(7));
        let b = generate_with(30, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn instances_pair_position_with_scale() {
        let field = generate_with(3, &mut StdRng::seed_from_u64(1));
        let instances = field.instances();
        assert_eq!(instances.len(), 3);
        for (i, instance) in instances.iter().enumerate() {
            assert_eq!(instance.position, field.positions[i]);
            assert_eq!(instance.scale, field.scales[i]);
        }
    }
}
