//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;
use crate::coord::YAxis;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let p = &config.provider;
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let addressing = p.addressing.map(|a| a.to_string()).unwrap_or_default();
    let y_axis = match p.y_axis {
        YAxis::NorthOrigin => "north",
        YAxis::SouthOrigin => "south",
    };
    let color_mode = config
        .raster
        .color_mode
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    format!(
        r#"[provider]
; Tile provider:
;   osm             - OpenStreetMap standard layer (no key)
;   google          - Google map layers, style = street | satellite | terrain | only_streets
;   mapbox          - Mapbox style (access_token, map_id)
;   mapbox_style    - Mapbox Studio style (access_token, username, map_id)
;   quadtree        - Quadkey-addressed composition tiles (no key)
;   azure           - Azure Maps (api_key, optional tileset_id, api_version)
;   ordnance_survey - Ordnance Survey (api_key, layer = Outdoor | Road | Light | Night | Leisure)
;   custom          - Any template in url with {{x}} {{y}} {{z}} or {{quadkey}}
type = {}
style = {}
url = {}
name = {}
access_token = {}
username = {}
map_id = {}
api_key = {}
layer = {}
tileset_id = {}
api_version = {}
; Discovery addressing: xyz or quadkey (empty = provider default)
addressing = {}
; Row numbering of xyz tiles: north (web maps) or south (TMS)
y_axis = {}

[download]
; Identifying User-Agent header sent with every request
user_agent = {}
; Timeout in seconds for each tile request (default: 30)
timeout = {}
; Maximum concurrent tile requests (default: 24, clamped to 1-256)
max_concurrent = {}

[cache]
; Persist decoded tiles between runs
enabled = {}
; Cache root; each provider gets its own subdirectory
directory = {}

[raster]
; Pixel format tiles are normalized to: rgb, rgba or luma (empty = provider default)
color_mode = {}
"#,
        p.provider_type,
        opt(&p.style),
        opt(&p.url),
        opt(&p.name),
        opt(&p.access_token),
        opt(&p.username),
        opt(&p.map_id),
        opt(&p.api_key),
        opt(&p.layer),
        opt(&p.tileset_id),
        opt(&p.api_version),
        addressing,
        y_axis,
        config.download.user_agent,
        config.download.timeout,
        config.download.max_concurrent,
        config.cache.enabled,
        path_to_string(&config.cache.directory),
        color_mode,
    )
}

/// Shortens paths under the home directory to `~/...`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
