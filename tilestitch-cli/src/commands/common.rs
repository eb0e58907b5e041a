//! Arguments shared by several commands.

use std::str::FromStr;

use clap::Args;
use tilestitch::config::ConfigFile;
use tilestitch::coord::{WebMercator, MAX_MERCATOR_LAT};
use tilestitch::domain::Domain;

/// Geographic bounding box `lon0,lat0,lon1,lat1` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon0: f64,
    pub lat0: f64,
    pub lon1: f64,
    pub lat1: f64,
}

impl BoundingBox {
    /// Domain polygon in Web Mercator units.
    pub fn to_domain(&self) -> Domain {
        Domain::from_lon_lat_bounds(&WebMercator, self.lon0, self.lat0, self.lon1, self.lat1)
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("expected lon0,lat0,lon1,lat1: {}", e))?;

        let &[lon0, lat0, lon1, lat1] = parts.as_slice() else {
            return Err(format!(
                "expected 4 comma-separated values, got {}",
                parts.len()
            ));
        };

        for lon in [lon0, lon1] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("longitude {} outside -180..180", lon));
            }
        }
        for lat in [lat0, lat1] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {} outside -90..90", lat));
            }
        }
        if lon0 == lon1 || lat0.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
            == lat1.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
        {
            return Err("bounding box has zero area".to_string());
        }

        Ok(Self {
            lon0,
            lat0,
            lon1,
            lat1,
        })
    }
}

/// Provider overrides on top of the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ProviderArgs {
    /// Provider type (osm, google, mapbox, mapbox_style, quadtree, azure,
    /// ordnance_survey, custom); defaults to [provider] type
    #[arg(long)]
    pub provider: Option<String>,

    /// Google style or Ordnance Survey layer
    #[arg(long)]
    pub style: Option<String>,

    /// URL template for custom providers
    #[arg(long)]
    pub url: Option<String>,
}

impl ProviderArgs {
    /// Overlays the given options onto a loaded configuration.
    pub fn apply(&self, config: &mut ConfigFile) {
        if let Some(provider) = &self.provider {
            config.provider.provider_type = provider.to_lowercase();
        }
        if let Some(style) = &self.style {
            config.provider.style = Some(style.clone());
            config.provider.layer = Some(style.clone());
        }
        if let Some(url) = &self.url {
            config.provider.url = Some(url.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox: BoundingBox = "-0.2, 51.4,0.0,51.6".parse().unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                lon0: -0.2,
                lat0: 51.4,
                lon1: 0.0,
                lat1: 51.6
            }
        );
    }

    #[test]
    fn test_parse_bbox_rejects_bad_input() {
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!("0,95,1,96".parse::<BoundingBox>().is_err());
        assert!("200,0,201,1".parse::<BoundingBox>().is_err());
        assert!("1,1,1,2".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn test_provider_overrides() {
        let mut config = ConfigFile::default();
        ProviderArgs {
            provider: Some("Google".to_string()),
            style: Some("satellite".to_string()),
            url: None,
        }
        .apply(&mut config);

        assert_eq!(config.provider.provider_type, "google");
        assert_eq!(config.provider.style.as_deref(), Some("satellite"));
    }
}
