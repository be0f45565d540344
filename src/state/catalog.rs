use std::path::Path;

use serde::Deserialize;

const DEFAULT_CATALOG: &str = include_str!("../../catalog.toml");

/// A numeric animation parameter, edited with the slider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParamSlider {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// A parameter chosen from a fixed set of options
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnumParam {
    pub name: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
    /// Keyword emitted before the selected option
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Animation {
    pub id: String,
    /// Label of the button on the display screen
    pub button: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub sliders: Vec<ParamSlider>,
    #[serde(default)]
    pub enums: Vec<EnumParam>,
}

impl Animation {
    pub fn slider(&self, name: &str) -> Option<&ParamSlider> {
        self.sliders.iter().find(|s| s.name == name)
    }
}

/// Rows and columns a catalog may use
const MAX_GRID: u16 = 64;

/// A physical display unit and its position in the selection grid
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CellSpec {
    pub id: String,
    pub row: u16,
    pub col: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub animations: Vec<Animation>,
    #[serde(default)]
    pub cells: Vec<CellSpec>,
}

impl Catalog {
    pub fn embedded() -> Self {
        toml::from_str(DEFAULT_CATALOG).expect("Failed to parse embedded catalog.toml")
    }

    /// Load a catalog file, falling back to the embedded one when it is unusable
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::embedded();
        };
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|contents| toml::from_str::<Catalog>(&contents).map_err(|e| e.to_string()))
            .and_then(|catalog| catalog.check_grid().map(|()| catalog));
        match parsed {
            Ok(catalog) => {
                log::info!("loaded catalog from {}", path.display());
                catalog
            }
            Err(e) => {
                log::warn!("catalog {} unusable ({}), using built-in catalog", path.display(), e);
                Self::embedded()
            }
        }
    }

    pub fn animation(&self, id: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn cell_ids(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.id.clone()).collect()
    }

    /// Grid dimensions as (rows, cols)
    pub fn grid_size(&self) -> (u16, u16) {
        let rows = self.cells.iter().map(|c| c.row.saturating_add(1)).max().unwrap_or(0);
        let cols = self.cells.iter().map(|c| c.col.saturating_add(1)).max().unwrap_or(0);
        (rows, cols)
    }

    fn check_grid(&self) -> Result<(), String> {
        match self.cells.iter().find(|c| c.row >= MAX_GRID || c.col >= MAX_GRID) {
            Some(c) => Err(format!("cell {} at row {} col {} is off the grid", c.id, c.row, c.col)),
            None => Ok(()),
        }
    }
}
