//! TOML config loading, mirroring the teacher's `libs/config` service-config
//! pattern: deserialize with `serde` + `toml`, then run our own validation
//! pass `serde` can't express (cross-field checks, duplicate detection).

use std::collections::HashSet;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::interface::DaemonConfig;

/// Load and validate a daemon config file. `path` is shell-expanded first
/// (`~/...`, `$HOME/...`) so operators can point at a config outside the
/// working directory without resolving it themselves.
pub fn load_from_file(path: &str) -> ConfigResult<DaemonConfig> {
    let expanded = shellexpand::full(path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| path.to_string());

    let contents = std::fs::read_to_string(&expanded).map_err(|source| ConfigError::Read {
        path: expanded.clone(),
        source,
    })?;

    let config: DaemonConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: expanded.clone(),
        source,
    })?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &DaemonConfig) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for iface in &config.interfaces {
        if !seen.insert(iface.interface.clone()) {
            return Err(ConfigError::DuplicateInterface(iface.interface.clone()));
        }
        if iface.session.discovery_interval_ms == 0 {
            return Err(ConfigError::NonPositiveDuration {
                interface: iface.interface.clone(),
                field: "discovery_interval_ms",
                value: 0,
            });
        }
        if iface.session.heartbeat_interval_ms == 0 {
            return Err(ConfigError::NonPositiveDuration {
                interface: iface.interface.clone(),
                field: "heartbeat_interval_ms",
                value: 0,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[interfaces]]
            interface = "wlan0"
            radio = true
            "#
        )
        .unwrap();

        let config = load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.interfaces.len(), 1);
        assert_eq!(config.interfaces[0].interface, "wlan0");
        assert!(config.interfaces[0].radio);
        assert_eq!(config.interfaces[0].session.heartbeat_interval_ms, 1000);
    }

    #[test]
    fn rejects_duplicate_interface_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[interfaces]]
            interface = "wlan0"

            [[interfaces]]
            interface = "wlan0"
            "#
        )
        .unwrap();

        let err = load_from_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateInterface(name) if name == "wlan0"));
    }

    #[test]
    fn rejects_zero_heartbeat_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[interfaces]]
            interface = "wlan0"
            [interfaces.session]
            heartbeat_interval_ms = 0
            "#
        )
        .unwrap();

        let err = load_from_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveDuration { .. }));
    }
}
