use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::serial_link::{SerialLink, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};

/// Sections searched, in order, for a block named after the host
const OS_SECTIONS: [&str; 3] = ["RaspberryPi", "Ubuntu", "macOS"];

// -------------------- Controller (serial) config --------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub serial_port: Option<String>, // Preselected if the host has it
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ControllerSettings {
    pub fn link(&self, port_path: &str) -> SerialLink {
        SerialLink::new(port_path, self.baud_rate, self.timeout)
    }
}

/// scara_jog.yaml next to Cargo.toml
pub fn default_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scara_jog.yaml")
}

fn host_block<'a>(yaml: &'a serde_yaml::Value, hostname: &str) -> Option<&'a serde_yaml::Mapping> {
    for os_key in OS_SECTIONS.iter() {
        if let Some(os_map) = yaml.get(*os_key).and_then(|v| v.as_mapping()) {
            for (k, v) in os_map.iter() {
                if k.as_str() == Some(hostname) {
                    return v.as_mapping();
                }
            }
        }
    }
    None
}

fn apply_block(settings: &mut ControllerSettings, block: &serde_yaml::Mapping, origin: &str) -> Result<()> {
    if let Some(v) = block.get(&serde_yaml::Value::from("SERIAL_PORT")) {
        settings.serial_port = if v.is_null() {
            None
        } else {
            Some(v.as_str()
                .ok_or_else(|| anyhow!("SERIAL_PORT must be a string in {}", origin))?
                .to_string())
        };
    }

    if let Some(v) = block.get(&serde_yaml::Value::from("SERIAL_BAUD")) {
        let baud = v.as_u64()
            .filter(|b| *b > 0 && *b <= u32::MAX as u64)
            .ok_or_else(|| anyhow!("SERIAL_BAUD must be a positive integer in {}", origin))?;
        settings.baud_rate = baud as u32;
    }

    if let Some(v) = block.get(&serde_yaml::Value::from("SERIAL_TIMEOUT_MS")) {
        let ms = v.as_u64()
            .ok_or_else(|| anyhow!("SERIAL_TIMEOUT_MS must be a non-negative integer in {}", origin))?;
        settings.timeout = Duration::from_millis(ms);
    }

    Ok(())
}

/// Resolve settings for `hostname`: built-in defaults, then the `defaults`
/// block, then the host's block from any OS section.
pub fn settings_from_yaml(yaml_text: &str, hostname: &str) -> Result<ControllerSettings> {
    let mut settings = ControllerSettings::default();
    if yaml_text.trim().is_empty() {
        return Ok(settings);
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(yaml_text)?;
    if yaml.is_null() {
        return Ok(settings);
    }

    if let Some(defaults) = yaml.get("defaults").and_then(|v| v.as_mapping()) {
        apply_block(&mut settings, defaults, "defaults")?;
    }

    match host_block(&yaml, hostname) {
        Some(block) => apply_block(&mut settings, block, &format!("host '{}'", hostname))?,
        None => log::debug!(target: "config_loader", "No host entry for '{}', using defaults", hostname),
    }

    Ok(settings)
}

/// Load settings from `path`. A missing file is not an error.
pub fn load_controller_settings(path: &Path, hostname: &str) -> Result<ControllerSettings> {
    if !path.exists() {
        log::warn!(target: "config_loader", "No settings file at {:?}, using defaults", path);
        return Ok(ControllerSettings::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {:?}", path))?;
    let settings = settings_from_yaml(&text, hostname)
        .with_context(|| format!("Invalid settings in {:?}", path))?;
    log::info!(target: "config_loader", "ControllerSettings: port={:?}, baud={}, timeout={:?} (hostname={})",
               settings.serial_port, settings.baud_rate, settings.timeout, hostname);
    Ok(settings)
}
