//! Debug panel colour controls.
//!
//! The panel only knows control names, their current values and a setter
//! closure per control. Whatever widget shows the panel (a browser colour
//! picker on the web, an egui window natively) calls
//! [`DebugPanel::set_color`] with the new value.
//!
//! Changes that arrive before there is a scene to apply them to are kept with
//! [`DebugPanel::defer_color`] and replayed by [`DebugPanel::apply_deferred`].

use std::fmt;

use crate::{
    color::Color,
    config::DebugSettings,
    data_structures::model::GpuMesh,
    error::PortalError,
    state::PortalState,
};

pub const BACKGROUND_COLOR: &str = "backgroundColor";
pub const PORTAL_COLOR_START: &str = "portalColorStart";
pub const PORTAL_COLOR_END: &str = "portalColorEnd";

type OnChange<M> = Box<dyn FnMut(&mut PortalState<M>, Color)>;

struct ColorControl<M> {
    name: String,
    value: Color,
    on_change: OnChange<M>,
}

pub struct DebugPanel<M = GpuMesh> {
    controls: Vec<ColorControl<M>>,
    deferred: Vec<(String, String)>,
}

impl<M: 'static> DebugPanel<M> {
    pub fn new() -> Self {
        Self {
            controls: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// The three colour controls of the portal room, seeded from `settings`.
    pub fn portal_room(settings: &DebugSettings) -> Self {
        let mut panel = Self::new();
        panel
            .register_color_control(BACKGROUND_COLOR, settings.background_color, |state, c| {
                state.settings.background_color = c;
                state.background = c;
            })
            .register_color_control(PORTAL_COLOR_START, settings.portal_color_start, |state, c| {
                state.settings.portal_color_start = c;
                state.materials.set_portal_color_start(c);
            })
            .register_color_control(PORTAL_COLOR_END, settings.portal_color_end, |state, c| {
                state.settings.portal_color_end = c;
                state.materials.set_portal_color_end(c);
            });
        panel
    }

    /// Register a control. A later registration under the same name replaces
    /// the earlier one.
    pub fn register_color_control(
        &mut self,
        name: &str,
        initial: Color,
        on_change: impl FnMut(&mut PortalState<M>, Color) + 'static,
    ) -> &mut Self {
        self.controls.retain(|control| control.name != name);
        self.controls.push(ColorControl {
            name: name.to_string(),
            value: initial,
            on_change: Box::new(on_change),
        });
        self
    }

    /// Parse `value` and hand it to the named control's setter.
    pub fn set_color(
        &mut self,
        state: &mut PortalState<M>,
        name: &str,
        value: &str,
    ) -> Result<Color, PortalError> {
        let control = self
            .controls
            .iter_mut()
            .find(|control| control.name == name)
            .ok_or_else(|| PortalError::UnknownControl(name.to_string()))?;
        let color = Color::parse(value)?;
        control.value = color;
        (control.on_change)(state, color);
        log::debug!("debug panel: {name} = {color}");
        Ok(color)
    }

    /// [`set_color`](Self::set_color) when there is a state, otherwise
    /// [`defer_color`](Self::defer_color). Returns the applied colour.
    pub fn set_or_defer(
        &mut self,
        state: Option<&mut PortalState<M>>,
        name: &str,
        value: &str,
    ) -> Result<Option<Color>, PortalError> {
        match state {
            Some(state) => self.set_color(state, name, value).map(Some),
            None => {
                self.defer_color(name, value);
                Ok(None)
            }
        }
    }

    /// Keep a change for later, when no state exists yet.
    pub fn defer_color(&mut self, name: &str, value: &str) {
        log::debug!("debug panel: deferring {name} = {value}");
        self.deferred.push((name.to_string(), value.to_string()));
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Apply deferred changes in arrival order. A failing change is logged and
    /// does not stop the rest. Returns how many were applied.
    pub fn apply_deferred(&mut self, state: &mut PortalState<M>) -> usize {
        let deferred = std::mem::take(&mut self.deferred);
        let mut applied = 0;
        for (name, value) in deferred {
            match self.set_color(state, &name, &value) {
                Ok(_) => applied += 1,
                Err(e) => log::warn!("dropping deferred colour change: {e}"),
            }
        }
        applied
    }

    pub fn value(&self, name: &str) -> Option<Color> {
        self.controls
            .iter()
            .find(|control| control.name == name)
            .map(|control| control.value)
    }

    /// Control names and values in registration order.
    pub fn controls(&self) -> impl Iterator<Item = (&str, Color)> {
        self.controls
            .iter()
            .map(|control| (control.name.as_str(), control.value))
    }
}

impl<M: 'static> Default for DebugPanel<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static> fmt::Debug for DebugPanel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.controls()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PortalConfig, particles::ParticleField, viewport::Viewport};

    fn state() -> PortalState<()> {
        PortalState::with_fireflies(
            &PortalConfig::default(),
            Viewport::new(800.0, 600.0, 1.0),
            ParticleField::default(),
        )
    }

    #[test]
    fn controls_start_from_settings() {
        let panel: DebugPanel<()> = DebugPanel::portal_room(&DebugSettings::default());
        let names: Vec<_> = panel.controls().map(|(name, _)| name).collect();
        assert_eq!(names, [BACKGROUND_COLOR, PORTAL_COLOR_START, PORTAL_COLOR_END]);
        assert_eq!(
            panel.value(PORTAL_COLOR_END).map(|c| c.to_string()),
            Some("#712f7f".to_string())
        );
    }

    #[test]
    fn background_change_replaces_scene_background() {
        let mut state = state();
        let mut panel = DebugPanel::portal_room(&state.settings);
        panel.set_color(&mut state, BACKGROUND_COLOR, "#000000").unwrap();
        assert_eq!(state.background, Color::BLACK);
        assert_eq!(state.settings.background_color, Color::BLACK);
        assert_eq!(panel.value(BACKGROUND_COLOR), Some(Color::BLACK));
    }

    #[test]
    fn portal_end_change_reaches_the_uniform() {
        let mut state = state();
        let mut panel = DebugPanel::portal_room(&state.settings);
        panel.set_color(&mut state, PORTAL_COLOR_END, "#00ff00").unwrap();
        assert_eq!(state.materials.portal_material().color_end().to_rgb8(), [0, 255, 0]);
    }

    #[test]
    fn unknown_control_and_bad_colour_are_rejected() {
        let mut state = state();
        let before = state.materials.portal_material().clone();
        let mut panel = DebugPanel::portal_room(&state.settings);
        assert!(matches!(
            panel.set_color(&mut state, "fogColor", "#ffffff"),
            Err(PortalError::UnknownControl(_))
        ));
        assert!(matches!(
            panel.set_color(&mut state, PORTAL_COLOR_START, "purple-ish"),
            Err(PortalError::InvalidColor(_))
        ));
        assert_eq!(state.materials.portal_material(), &before);
    }

    #[test]
    fn re_registering_replaces_the_control() {
        let mut panel: DebugPanel<()> = DebugPanel::new();
        panel
            .register_color_control("tint", Color::WHITE, |_, _| {})
            .register_color_control("tint", Color::BLACK, |_, _| {});
        assert_eq!(panel.controls().count(), 1);
        assert_eq!(panel.value("tint"), Some(Color::BLACK));
    }

    #[test]
    fn deferred_changes_replay_in_arrival_order() {
        let mut state = state();
        let mut panel = DebugPanel::portal_room(&state.settings);
        panel.defer_color(PORTAL_COLOR_START, "#ff0000");
        panel.defer_color(BACKGROUND_COLOR, "not a colour");
        panel.defer_color(PORTAL_COLOR_START, "#0000ff");
        assert!(panel.has_deferred());
        assert_eq!(state.materials.portal_material().color_start().to_rgb8(), [0xdd, 0xbb, 0xec]);

        assert_eq!(panel.apply_deferred(&mut state), 2);
        assert!(!panel.has_deferred());
        assert_eq!(state.materials.portal_material().color_start().to_rgb8(), [0, 0, 255]);
        assert_eq!(panel.value(BACKGROUND_COLOR), Some(DebugSettings::default().background_color));
        assert_eq!(panel.apply_deferred(&mut state), 0);
    }

    #[test]
    fn change_without_state_waits_for_one() {
        let mut state = state();
        let mut panel = DebugPanel::portal_room(&state.settings);
        assert_eq!(panel.set_or_defer(None, BACKGROUND_COLOR, "#000000").unwrap(), None);
        assert_ne!(state.background, Color::BLACK);

        panel.apply_deferred(&mut state);
        assert_eq!(state.background, Color::BLACK);
        assert_eq!(
            panel.set_or_defer(Some(&mut state), BACKGROUND_COLOR, "#fff").unwrap(),
            Some(Color::WHITE)
        );
        assert_eq!(state.background, Color::WHITE);
    }
}
