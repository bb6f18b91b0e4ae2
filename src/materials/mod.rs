//! Material definitions and their uniform slots.
//!
//! Materials live in a [`MaterialSet`] arena and are referenced by
//! [`MaterialId`]. Meshes never own a material, so two meshes holding the same
//! id always see the same uniform values. This is how the portal surface and
//! the portal light stay in sync.
//!
//! Every write through the set bumps the material's revision. The renderer
//! compares revisions to decide which uniform blocks to upload before a draw.

pub mod uniforms;

use crate::{
    color::Color,
    config::{DebugSettings, FireflySettings},
};

pub use uniforms::{LampUniform, ParticleUniform, PortalUniform};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialRole {
    Baked,
    Lamp,
    Portal,
    Particle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Color(Color),
    Int(i32),
}

/// Materials whose shader animates with the elapsed time.
pub trait TimeUniform {
    fn time(&self) -> f32;
    fn set_time(&mut self, t: f32);
}

/// Baked lighting: a texture lookup, nothing animated.
#[derive(Clone, Debug, PartialEq)]
pub struct BakedMaterial {
    pub texture: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LampMaterial {
    color: Color,
}

impl LampMaterial {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn to_uniform(&self) -> LampUniform {
        LampUniform::new(self.color.to_linear())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortalMaterial {
    time: f32,
    color_start: Color,
    color_end: Color,
}

impl PortalMaterial {
    pub fn new(color_start: Color, color_end: Color) -> Self {
        Self {
            time: 0.0,
            color_start,
            color_end,
        }
    }

    pub fn color_start(&self) -> Color {
        self.color_start
    }

    pub fn color_end(&self) -> Color {
        self.color_end
    }

    pub fn set_color_start(&mut self, color: Color) {
        self.color_start = color;
    }

    pub fn set_color_end(&mut self, color: Color) {
        self.color_end = color;
    }

    pub fn to_uniform(&self) -> PortalUniform {
        PortalUniform::new(
            self.time,
            self.color_start.to_linear(),
            self.color_end.to_linear(),
        )
    }
}

impl TimeUniform for PortalMaterial {
    fn time(&self) -> f32 {
        self.time
    }

    fn set_time(&mut self, t: f32) {
        self.time = t;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleMaterial {
    time: f32,
    pixel_ratio: f32,
    size: f32,
    strength: f32,
}

impl ParticleMaterial {
    pub fn new(pixel_ratio: f32, size: f32, strength: f32) -> Self {
        Self {
            time: 0.0,
            pixel_ratio,
            size,
            strength,
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// `resolution` is the render target size in physical pixels.
    pub fn to_uniform(&self, resolution: [f32; 2]) -> ParticleUniform {
        ParticleUniform::new(
            self.time,
            self.pixel_ratio,
            self.size,
            self.strength,
            resolution,
        )
    }
}

impl TimeUniform for ParticleMaterial {
    fn time(&self) -> f32 {
        self.time
    }

    fn set_time(&mut self, t: f32) {
        self.time = t;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    Baked(BakedMaterial),
    Lamp(LampMaterial),
    Portal(PortalMaterial),
    Particle(ParticleMaterial),
}

impl Material {
    pub fn role(&self) -> MaterialRole {
        match self {
            Material::Baked(_) => MaterialRole::Baked,
            Material::Lamp(_) => MaterialRole::Lamp,
            Material::Portal(_) => MaterialRole::Portal,
            Material::Particle(_) => MaterialRole::Particle,
        }
    }

    /// Every uniform slot the material's shader reads, by shader name.
    pub fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        match self {
            Material::Baked(_) => Vec::new(),
            Material::Lamp(lamp) => vec![("uColor", UniformValue::Color(lamp.color))],
            Material::Portal(portal) => vec![
                ("uTime", UniformValue::Float(portal.time)),
                ("uColorStart", UniformValue::Color(portal.color_start)),
                ("uColorEnd", UniformValue::Color(portal.color_end)),
            ],
            Material::Particle(particle) => vec![
                ("uTime", UniformValue::Float(particle.time)),
                ("uPixelRatio", UniformValue::Float(particle.pixel_ratio)),
                ("uSize", UniformValue::Float(particle.size)),
                ("uStrength", UniformValue::Float(particle.strength)),
            ],
        }
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms()
            .into_iter()
            .find_map(|(slot, value)| (slot == name).then_some(value))
    }

    pub fn as_time_uniform_mut(&mut self) -> Option<&mut dyn TimeUniform> {
        match self {
            Material::Portal(portal) => Some(portal),
            Material::Particle(particle) => Some(particle),
            Material::Baked(_) | Material::Lamp(_) => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    material: Material,
    revision: u64,
}

/// The four materials of the portal room.
#[derive(Debug)]
pub struct MaterialSet {
    slots: Vec<Slot>,
    baked: MaterialId,
    lamp: MaterialId,
    portal: MaterialId,
    particle: MaterialId,
}

impl MaterialSet {
    /// `pixel_ratio` is the already clamped ratio for the particle shader.
    pub fn new(
        baked_texture: &str,
        debug: &DebugSettings,
        fireflies: &FireflySettings,
        pixel_ratio: f32,
    ) -> Self {
        let mut slots = Vec::with_capacity(4);
        let mut push = |material: Material| {
            slots.push(Slot {
                material,
                revision: 0,
            });
            MaterialId(slots.len() - 1)
        };
        let baked = push(Material::Baked(BakedMaterial {
            texture: baked_texture.to_string(),
        }));
        let lamp = push(Material::Lamp(LampMaterial::new(Color::WHITE)));
        let portal = push(Material::Portal(PortalMaterial::new(
            debug.portal_color_start,
            debug.portal_color_end,
        )));
        let particle = push(Material::Particle(ParticleMaterial::new(
            pixel_ratio,
            fireflies.size,
            fireflies.strength,
        )));
        Self {
            slots,
            baked,
            lamp,
            portal,
            particle,
        }
    }

    pub fn baked(&self) -> MaterialId {
        self.baked
    }

    pub fn lamp(&self) -> MaterialId {
        self.lamp
    }

    pub fn portal(&self) -> MaterialId {
        self.portal
    }

    /// The portal light shares the portal material instance.
    pub fn portal_light(&self) -> MaterialId {
        self.portal
    }

    pub fn particle(&self) -> MaterialId {
        self.particle
    }

    pub fn ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        (0..self.slots.len()).map(MaterialId)
    }

    pub fn get(&self, id: MaterialId) -> &Material {
        &self.slots[id.0].material
    }

    pub fn revision(&self, id: MaterialId) -> u64 {
        self.slots[id.0].revision
    }

    /// Mutate a material. The revision is bumped whether or not `f` changes
    /// anything.
    pub fn update<R>(&mut self, id: MaterialId, f: impl FnOnce(&mut Material) -> R) -> R {
        let slot = &mut self.slots[id.0];
        slot.revision += 1;
        f(&mut slot.material)
    }

    pub fn portal_material(&self) -> &PortalMaterial {
        match self.get(self.portal) {
            Material::Portal(portal) => portal,
            other => unreachable!("portal slot holds {:?}", other.role()),
        }
    }

    pub fn particle_material(&self) -> &ParticleMaterial {
        match self.get(self.particle) {
            Material::Particle(particle) => particle,
            other => unreachable!("particle slot holds {:?}", other.role()),
        }
    }

    pub fn set_portal_color_start(&mut self, color: Color) {
        self.update(self.portal, |material| {
            if let Material::Portal(portal) = material {
                portal.set_color_start(color);
            }
        });
    }

    pub fn set_portal_color_end(&mut self, color: Color) {
        self.update(self.portal, |material| {
            if let Material::Portal(portal) = material {
                portal.set_color_end(color);
            }
        });
    }

    pub fn set_particle_pixel_ratio(&mut self, ratio: f32) {
        self.update(self.particle, |material| {
            if let Material::Particle(particle) = material {
                particle.set_pixel_ratio(ratio);
            }
        });
    }

    /// Write `t` into every time-dependent uniform.
    pub fn set_time(&mut self, t: f32) {
        for slot in &mut self.slots {
            if let Some(timed) = slot.material.as_time_uniform_mut() {
                timed.set_time(t);
                slot.revision += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn materials() -> MaterialSet {
        MaterialSet::new(
            "TexturePortalRoom.jpg",
            &DebugSettings::default(),
            &FireflySettings::default(),
            2.0,
        )
    }

    #[test]
    fn every_role_is_present() {
        let set = materials();
        assert_eq!(set.get(set.baked()).role(), MaterialRole::Baked);
        assert_eq!(set.get(set.lamp()).role(), MaterialRole::Lamp);
        assert_eq!(set.get(set.portal()).role(), MaterialRole::Portal);
        assert_eq!(set.get(set.particle()).role(), MaterialRole::Particle);
        assert_eq!(set.ids().count(), 4);
    }

    #[test]
    fn uniform_slots_exist_before_first_render() {
        let set = materials();
        let portal = set.get(set.portal());
        for name in ["uTime", "uColorStart", "uColorEnd"] {
            assert!(portal.uniform(name).is_some(), "portal misses {name}");
        }
        let particle = set.get(set.particle());
        assert_eq!(particle.uniform("uSize"), Some(UniformValue::Float(300.0)));
        assert_eq!(particle.uniform("uStrength"), Some(UniformValue::Float(0.05)));
        assert_eq!(particle.uniform("uPixelRatio"), Some(UniformValue::Float(2.0)));
        assert!(set.get(set.baked()).uniforms().is_empty());
        assert_eq!(
            set.get(set.lamp()).uniform("uColor"),
            Some(UniformValue::Color(Color::WHITE))
        );
    }

    #[test]
    fn set_time_touches_only_animated_materials() {
        let mut set = materials();
        let baked_rev = set.revision(set.baked());
        let portal_rev = set.revision(set.portal());
        set.set_time(1.25);
        assert_eq!(set.portal_material().time(), 1.25);
        assert_eq!(set.particle_material().time(), 1.25);
        assert_eq!(set.revision(set.baked()), baked_rev);
        assert!(set.revision(set.portal()) > portal_rev);
    }

    #[test]
    fn portal_colours_update() {
        let mut set = materials();
        set.set_portal_color_start(Color::WHITE);
        set.set_portal_color_end(Color::BLACK);
        assert_eq!(set.portal_material().color_start(), Color::WHITE);
        assert_eq!(set.portal_material().color_end(), Color::BLACK);
        let uniform = set.portal_material().to_uniform();
        assert_eq!(uniform.color_start, [1.0, 1.0, 1.0]);
        assert_eq!(uniform.color_end, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn pixel_ratio_update() {
        let mut set = materials();
        set.set_particle_pixel_ratio(1.5);
        assert_eq!(set.particle_material().pixel_ratio(), 1.5);
    }
}
