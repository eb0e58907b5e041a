//! User supplied URL templates.
//!
//! Templates use `{x}`, `{y}`, `{z}` for cartesian tiles and `{quadkey}` (or
//! `{q}`) for quadkey tiles. Upper-case `{X}`, `{Y}`, `{Z}` are accepted too.

use super::types::{quadkey_of, xyz_of, Provider, ProviderError, DEFAULT_TILE_SIZE};
use crate::coord::{Addressing, TileId};

/// Substitutes `{key}` placeholders in `template`.
pub(crate) fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut url = template.to_string();
    for (key, value) in values {
        url = url.replace(&format!("{{{}}}", key), value);
    }
    url
}

/// Fills the coordinate placeholders of a template for one tile.
pub(crate) fn fill_tile(template: &str, tile: &TileId) -> Result<String, ProviderError> {
    let coord = xyz_of(tile);
    let quadkey = if template.contains("{quadkey}") || template.contains("{q}") {
        Some(quadkey_of(tile)?)
    } else {
        None
    };
    let (x, y, z) = (
        coord.x.to_string(),
        coord.y.to_string(),
        coord.zoom.to_string(),
    );
    let mut values = vec![
        ("x", x.as_str()),
        ("X", x.as_str()),
        ("y", y.as_str()),
        ("Y", y.as_str()),
        ("z", z.as_str()),
        ("Z", z.as_str()),
    ];
    if let Some(quadkey) = &quadkey {
        values.push(("quadkey", quadkey.as_str()));
        values.push(("q", quadkey.as_str()));
    }
    Ok(fill(template, &values))
}

/// A provider defined entirely by a URL template.
#[derive(Debug, Clone)]
pub struct TemplateProvider {
    name: String,
    template: String,
    addressing: Addressing,
    tile_size: u32,
}

impl TemplateProvider {
    /// Creates a provider, inferring the addressing from the placeholders.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, ProviderError> {
        let template = template.into();
        let has = |key: &str| {
            template.contains(&format!("{{{}}}", key))
                || template.contains(&format!("{{{}}}", key.to_uppercase()))
        };
        let addressing = if template.contains("{quadkey}") || template.contains("{q}") {
            Addressing::Quadkey
        } else if has("x") && has("y") && has("z") {
            Addressing::Xyz
        } else {
            return Err(ProviderError::InvalidTemplate(format!(
                "'{}' needs {{x}}, {{y}} and {{z}} or {{quadkey}}",
                template
            )));
        };
        Ok(Self {
            name: name.into(),
            template,
            addressing,
            tile_size: DEFAULT_TILE_SIZE,
        })
    }

    /// Overrides the nominal tile size.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Provider for TemplateProvider {
    fn url_for(&self, tile: &TileId) -> Result<String, ProviderError> {
        fill_tile(&self.template, tile)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn identity(&self) -> String {
        self.template.clone()
    }

    fn addressing(&self) -> Addressing {
        self.addressing
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }
}
