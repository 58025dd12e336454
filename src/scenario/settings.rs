//! Settings loading.
//!
//! One `key:value` pair per line. A trailing `,` says another line follows;
//! the first line without it is the last one read.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{ConfigError, SettingsError};
use crate::net::DataRate;
use crate::routing::RoutingProtocol;
use crate::sim::SimTime;

pub const DEFAULT_BASE_ADDRESS: Ipv4Addr = Ipv4Addr::new(10, 1, 1, 0);
pub const DEFAULT_SUBNET_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Keys understood by the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Delay,
    Protocol,
    DataRate,
    BaseIp,
    SubnetMask,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Delay,
        SettingKey::Protocol,
        SettingKey::DataRate,
        SettingKey::BaseIp,
        SettingKey::SubnetMask,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Delay => "delay",
            SettingKey::Protocol => "protocol",
            SettingKey::DataRate => "dataRate",
            SettingKey::BaseIp => "baseIP",
            SettingKey::SubnetMask => "subnetMask",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsModel {
    pub propagation_delay: String,
    pub routing_protocol: RoutingProtocol,
    pub data_rate: String,
    pub base_address: String,
    pub subnet_mask: String,
}

impl SettingsModel {
    /// Apply one pair. Returns `false` for keys that are not understood;
    /// those are accepted and have no effect.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match SettingKey::from_name(key) {
            Some(key) => {
                self.apply(key, value);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, key: SettingKey, value: &str) {
        match key {
            SettingKey::Delay => self.propagation_delay = value.to_string(),
            SettingKey::Protocol => self.routing_protocol = RoutingProtocol::from_name(value),
            SettingKey::DataRate => self.data_rate = value.to_string(),
            SettingKey::BaseIp => self.base_address = value.to_string(),
            SettingKey::SubnetMask => self.subnet_mask = value.to_string(),
        }
    }

    /// Raw value of `key`, or `None` if it was never set.
    pub fn get(&self, key: SettingKey) -> Option<&str> {
        let value = match key {
            SettingKey::Delay => &self.propagation_delay,
            SettingKey::Protocol => {
                return match &self.routing_protocol {
                    RoutingProtocol::Unset => None,
                    other => Some(other.name()),
                };
            }
            SettingKey::DataRate => &self.data_rate,
            SettingKey::BaseIp => &self.base_address,
            SettingKey::SubnetMask => &self.subnet_mask,
        };
        (!value.is_empty()).then_some(value.as_str())
    }

    /// Serialise back into the settings-file syntax.
    pub fn to_config_string(&self) -> String {
        let pairs: Vec<String> = SettingKey::ALL
            .into_iter()
            .filter_map(|k| self.get(k).map(|v| format!("{}:{v}", k.as_str())))
            .collect();
        if pairs.is_empty() {
            return String::new();
        }
        let mut out = pairs.join(",\n");
        out.push('\n');
        out
    }

    pub fn delay(&self) -> Result<SimTime, ConfigError> {
        match self.get(SettingKey::Delay) {
            None => Ok(SimTime::ZERO),
            Some(value) => value.parse().map_err(|source| ConfigError::Delay {
                value: value.to_string(),
                source,
            }),
        }
    }

    pub fn data_rate(&self) -> Result<DataRate, ConfigError> {
        let rate = match self.get(SettingKey::DataRate) {
            None => DataRate::UNLIMITED,
            Some(value) => value.parse().map_err(|source| ConfigError::DataRate {
                value: value.to_string(),
                source,
            })?,
        };
        if rate.bps() == 0 {
            return Err(ConfigError::ZeroDataRate(rate));
        }
        Ok(rate)
    }

    pub fn base_address(&self) -> Result<Ipv4Addr, ConfigError> {
        self.address(SettingKey::BaseIp, DEFAULT_BASE_ADDRESS)
    }

    pub fn subnet_mask(&self) -> Result<Ipv4Addr, ConfigError> {
        self.address(SettingKey::SubnetMask, DEFAULT_SUBNET_MASK)
    }

    fn address(&self, key: SettingKey, default: Ipv4Addr) -> Result<Ipv4Addr, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::Address {
                field: key.as_str(),
                value: value.to_string(),
            }),
        }
    }
}

pub fn load_settings(path: &Path) -> Result<SettingsModel, SettingsError> {
    info!(path = %path.display(), "reading settings");
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&text)
}

/// Blank lines are skipped; any other line without `:`, or whose value
/// itself ends in `,`, is rejected.
pub fn parse_settings(text: &str) -> Result<SettingsModel, SettingsError> {
    let mut model = SettingsModel::default();
    let mut lines = text.lines().enumerate();

    for (idx, raw) in lines.by_ref() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (entry, more) = match line.strip_suffix(',') {
            Some(entry) => (entry.trim_end(), true),
            None => (line, false),
        };
        let Some((key, value)) = entry.split_once(':') else {
            return Err(SettingsError::Malformed {
                line: idx + 1,
                text: raw.to_string(),
            });
        };
        let (key, value) = (key.trim(), value.trim());
        // A value ending in `,` could not be written back unambiguously.
        if value.ends_with(',') {
            return Err(SettingsError::Malformed {
                line: idx + 1,
                text: raw.to_string(),
            });
        }
        if model.set(key, value) {
            info!(key, value, "setting applied");
        } else {
            warn!(key, value, "unknown setting ignored");
        }
        if !more {
            break;
        }
    }

    let ignored = lines.filter(|(_, l)| !l.trim().is_empty()).count();
    if ignored > 0 {
        debug!(ignored, "lines after the last setting ignored");
    }
    Ok(model)
}
