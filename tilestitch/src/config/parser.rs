//! Reads INI sections into a [`ConfigFile`], starting from defaults.

use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::{ConfigFile, VALID_PROVIDER_TYPES};
use crate::service::MAX_CONCURRENT_LIMIT;

pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("type") {
            let v = v.trim().to_lowercase();
            if !VALID_PROVIDER_TYPES.contains(&v.as_str()) {
                let reason = format!("must be one of: {}", VALID_PROVIDER_TYPES.join(", "));
                return Err(invalid("provider", "type", &v, &reason));
            }
            config.provider.provider_type = v;
        }

        let p = &mut config.provider;
        for (key, slot) in [
            ("style", &mut p.style),
            ("url", &mut p.url),
            ("name", &mut p.name),
            ("access_token", &mut p.access_token),
            ("username", &mut p.username),
            ("map_id", &mut p.map_id),
            ("api_key", &mut p.api_key),
            ("layer", &mut p.layer),
            ("tileset_id", &mut p.tileset_id),
            ("api_version", &mut p.api_version),
        ] {
            if let Some(v) = non_empty(section.get(key)) {
                *slot = Some(v.to_string());
            }
        }

        if let Some(v) = non_empty(section.get("addressing")) {
            let addressing = v
                .parse()
                .map_err(|_| invalid("provider", "addressing", v, "must be 'xyz' or 'quadkey'"))?;
            p.addressing = Some(addressing);
        }
        if let Some(v) = non_empty(section.get("y_axis")) {
            p.y_axis = v
                .parse()
                .map_err(|_| invalid("provider", "y_axis", v, "must be 'north' or 'south' (tms)"))?;
        }
    }

    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = non_empty(section.get("user_agent")) {
            config.download.user_agent = v.to_string();
        }
        if let Some(v) = section.get("timeout") {
            config.download.timeout = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or_else(|| invalid("download", "timeout", v, "must be a positive number of seconds"))?;
        }
        if let Some(v) = section.get("max_concurrent") {
            let requested: usize = v
                .trim()
                .parse()
                .map_err(|_| invalid("download", "max_concurrent", v, "must be an integer"))?;
            config.download.max_concurrent = requested.clamp(1, MAX_CONCURRENT_LIMIT);
        }
    }

    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("enabled") {
            config.cache.enabled =
                parse_bool(v).ok_or_else(|| invalid("cache", "enabled", v, "must be true or false"))?;
        }
        if let Some(v) = non_empty(section.get("directory")) {
            config.cache.directory = expand_tilde(v);
        }
    }

    if let Some(section) = ini.section(Some("raster")) {
        if let Some(v) = non_empty(section.get("color_mode")) {
            let mode = v
                .parse()
                .map_err(|_| invalid("raster", "color_mode", v, "must be one of: rgb, rgba, luma"))?;
            config.raster.color_mode = Some(mode);
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `~/x` becomes `$HOME/x`; other paths are untouched.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
