//! Material bindings for the room model's named children.

use crate::{
    data_structures::model::Model,
    error::PortalError,
    materials::{MaterialId, MaterialSet},
};

pub const BAKED_NODE: &str = "Cube191";
pub const PORTAL_LIGHT_NODE: &str = "portalLight";
pub const LAMP_A_NODE: &str = "lampLightA";
pub const LAMP_B_NODE: &str = "lampLightB";

/// Child name to material, in lookup order.
pub fn material_bindings(materials: &MaterialSet) -> [(&'static str, MaterialId); 4] {
    [
        (BAKED_NODE, materials.baked()),
        (PORTAL_LIGHT_NODE, materials.portal_light()),
        (LAMP_A_NODE, materials.lamp()),
        (LAMP_B_NODE, materials.lamp()),
    ]
}

/// Assign materials once the model has loaded.
///
/// All four children are looked up before anything is assigned, so a model
/// missing one of them is left exactly as it was.
pub fn on_model_loaded<M>(model: &mut Model<M>, materials: &MaterialSet) -> Result<(), PortalError> {
    let bindings = material_bindings(materials);
    let mut resolved = Vec::with_capacity(bindings.len());
    for (name, material) in bindings {
        let index = model
            .child_index(name)
            .ok_or_else(|| PortalError::MissingNode(name.to_string()))?;
        resolved.push((index, material));
    }
    for (index, material) in resolved {
        model.children[index].material = Some(material);
    }
    log::debug!("bound materials to {} model children", bindings.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{DebugSettings, FireflySettings},
        data_structures::model::ModelNode,
    };

    fn materials() -> MaterialSet {
        MaterialSet::new(
            "baked.jpg",
            &DebugSettings::default(),
            &FireflySettings::default(),
            1.0,
        )
    }

    fn model(names: &[&str]) -> Model<()> {
        Model::new(names.iter().map(|n| ModelNode::new(*n, vec![()])).collect())
    }

    #[test]
    fn binds_all_four_children() {
        let materials = materials();
        let mut model = model(&["Cube191", "portalLight", "lampLightA", "lampLightB", "extra"]);
        on_model_loaded(&mut model, &materials).unwrap();
        assert_eq!(model.child("Cube191").unwrap().material, Some(materials.baked()));
        assert_eq!(model.child("portalLight").unwrap().material, Some(materials.portal()));
        assert_eq!(model.child("lampLightA").unwrap().material, Some(materials.lamp()));
        assert_eq!(model.child("lampLightB").unwrap().material, Some(materials.lamp()));
        assert_eq!(model.child("extra").unwrap().material, None);
    }

    #[test]
    fn missing_child_assigns_nothing() {
        let materials = materials();
        let mut model = model(&["Cube191", "portalLight", "lampLightA"]);
        let err = on_model_loaded(&mut model, &materials).unwrap_err();
        assert!(matches!(err, PortalError::MissingNode(ref name) if name == "lampLightB"));
        assert!(model.children.iter().all(|child| child.material.is_none()));
    }

    #[test]
    fn names_match_exactly() {
        let materials = materials();
        let mut model = model(&["cube191", "portalLight", "lampLightA", "lampLightB"]);
        let err = on_model_loaded(&mut model, &materials).unwrap_err();
        assert_eq!(err.to_string(), "model has no child named `Cube191`");
    }
}
