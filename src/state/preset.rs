use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::Animation;

/// A saved configuration of animation parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preset {
    pub animation: String,
    #[serde(default)]
    pub sliders: BTreeMap<String, f64>,
    #[serde(default)]
    pub enums: BTreeMap<String, String>,
}

/// Commands remembered per cell, keyed by cell id
pub type Theme = BTreeMap<String, String>;

impl Preset {
    /// Fresh parameters for an animation: every slider at its default, every
    /// enum with a default selected
    pub fn from_animation(anim: &Animation) -> Self {
        Self {
            animation: anim.id.clone(),
            sliders: anim
                .sliders
                .iter()
                .map(|s| (s.name.clone(), s.default))
                .collect(),
            enums: anim
                .enums
                .iter()
                .filter_map(|e| e.default.clone().map(|d| (e.name.clone(), d)))
                .collect(),
        }
    }

    /// Stored values from a saved preset, with animation defaults filling gaps
    pub fn from_saved(saved: &Preset, anim: &Animation) -> Self {
        let mut preset = Self::from_animation(anim);
        for (name, value) in preset.sliders.iter_mut() {
            if let Some(v) = saved.sliders.get(name) {
                *value = *v;
            }
        }
        for e in &anim.enums {
            if let Some(option) = saved.enums.get(&e.name) {
                preset.enums.insert(e.name.clone(), option.clone());
            }
        }
        preset
    }
}

/// What the panel currently applies to the selected cells
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActivePreset {
    #[default]
    None,
    Animation(Preset),
    Brightness,
}

impl ActivePreset {
    pub fn preset(&self) -> Option<&Preset> {
        match self {
            ActivePreset::Animation(p) => Some(p),
            _ => None,
        }
    }

    pub fn preset_mut(&mut self) -> Option<&mut Preset> {
        match self {
            ActivePreset::Animation(p) => Some(p),
            _ => None,
        }
    }
}
