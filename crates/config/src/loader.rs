// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads, merges, and validates the YAML configuration tree.
//!
//! The on-disk document nests `hypervisor`/`backup`/`notification` under a
//! `global` key (to mirror the original document shape); the loader
//! flattens that into `warden_core::GlobalConfig` for convenient use by
//! the rest of the workspace.

use crate::merge::merge;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use warden_core::config::{BackupConfig, GlobalConfig, HypervisorConfig, NotificationConfig};
use warden_core::ConfigError;

/// Dot-notation paths deeper than this are rejected, matching the
/// original loader's five-level limit.
const MAX_DOT_DEPTH: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GlobalSection {
    hypervisor: HypervisorConfig,
    backup: BackupConfig,
    #[serde(default)]
    notification: NotificationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    global: GlobalSection,
    #[serde(default)]
    services: Vec<warden_core::ServiceDescriptor>,
}

/// A loaded, validated configuration, retaining the raw merged YAML tree
/// for dot-notation projection.
pub struct Loader {
    raw: Value,
    config: GlobalConfig,
}

impl Loader {
    /// Loads `primary`, merges each of `overlays` on top in order, then
    /// validates the result. Validation errors are aggregated rather than
    /// failing on the first one found.
    pub fn load(primary: &Path, overlays: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut raw = load_yaml_file(primary)?;
        for overlay in overlays {
            let overlay_doc = load_yaml_file(overlay)?;
            raw = merge(raw, overlay_doc);
        }

        let document: ConfigDocument = serde_yaml::from_value(raw.clone())
            .map_err(|source| ConfigError::Parse { path: primary.display().to_string(), source })?;

        let config = GlobalConfig {
            hypervisor: document.global.hypervisor,
            backup: document.global.backup,
            notification: document.global.notification,
            services: document.services,
        };

        let diagnostics = validate(&config);
        if !diagnostics.is_empty() {
            warn!(count = diagnostics.len(), "configuration validation failed");
            return Err(ConfigError::Invalid { diagnostics });
        }

        info!(services = config.services.len(), "configuration loaded");
        Ok(Self { raw, config })
    }

    /// The validated, typed, flattened configuration.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Dot-notation projection over the raw merged tree, e.g.
    /// `"global.backup.retention_days"`. `global` is an accepted alias for
    /// the root `global` section, matching the original loader. Returns
    /// `default` if any segment of the path is absent.
    pub fn get(&self, path: &str, default: Value) -> Result<Value, ConfigError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() > MAX_DOT_DEPTH {
            return Err(ConfigError::DotDepthExceeded { path: path.to_string(), max: MAX_DOT_DEPTH });
        }

        let mut current = &self.raw;
        for segment in segments {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Ok(default),
            }
        }
        Ok(current.clone())
    }

    /// All services declared in configuration.
    pub fn services(&self) -> &[warden_core::ServiceDescriptor] {
        &self.config.services
    }

    /// A single service by name.
    pub fn service(&self, name: &str) -> Option<&warden_core::ServiceDescriptor> {
        self.config.service(name)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.display().to_string() });
    }
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    let value: Value = serde_yaml::from_str(&text)
        .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
    Ok(if matches!(value, Value::Null) { Value::Mapping(Default::default()) } else { value })
}

fn validate(config: &GlobalConfig) -> Vec<String> {
    let mut diagnostics = Vec::new();

    if config.backup.enabled {
        if !Path::new(&config.backup.root).is_absolute() {
            diagnostics.push(format!("global.backup.root: must be an absolute path, got '{}'", config.backup.root));
        }
        if config.backup.retention_days < 1 {
            diagnostics.push(format!("global.backup.retention_days: must be at least 1, got {}", config.backup.retention_days));
        }
        if let Some(remote) = &config.backup.remote_archive_server {
            if remote.enabled && remote.password.is_none() && remote.password_command.is_none() {
                diagnostics
                    .push("global.backup.remote_archive_server: one of password or password_command is required".to_string());
            }
        }
        if let Some(direct) = &config.backup.direct_shared_storage {
            if direct.enabled && !Path::new(&direct.path).is_absolute() {
                diagnostics.push(format!(
                    "global.backup.direct_shared_storage.path: must be an absolute path, got '{}'",
                    direct.path
                ));
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    for service in &config.services {
        if !seen.insert(service.name.clone()) {
            diagnostics.push(format!("services: duplicate service name '{}'", service.name));
            continue;
        }
        if let Err(e) = service.validate() {
            diagnostics.push(format!("services.{}: {e}", service.name));
        }
    }

    diagnostics
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"
global:
  hypervisor:
    host: pve.local
    user: root@pam
    token_id: autopilot
    token_secret: secret
  backup:
    enabled: true
    root: /srv/backups
    retention_days: 14
services:
  - name: plex
    kind: docker
    container_name: plex
"#;

    #[test]
    fn loads_and_validates_a_well_formed_config() {
        let file = write_yaml(VALID);
        let loader = Loader::load(file.path(), &[]).unwrap();
        assert_eq!(loader.services().len(), 1);
        assert_eq!(loader.config().backup.retention_days, 14);
    }

    #[test]
    fn rejects_non_absolute_backup_root() {
        let file = write_yaml(&VALID.replace("/srv/backups", "relative/path"));
        let err = Loader::load(file.path(), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_duplicate_service_names() {
        let mut content = VALID.to_string();
        content.push_str("  - name: plex\n    kind: docker\n    container_name: plex2\n");
        let file = write_yaml(&content);
        let err = Loader::load(file.path(), &[]).unwrap_err();
        match err {
            ConfigError::Invalid { diagnostics } => {
                assert!(diagnostics.iter().any(|d| d.contains("duplicate service name")));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn dot_notation_projects_into_the_raw_tree() {
        let file = write_yaml(VALID);
        let loader = Loader::load(file.path(), &[]).unwrap();
        let value = loader.get("global.backup.retention_days", Value::from(0)).unwrap();
        assert_eq!(value, Value::from(14));
    }

    #[test]
    fn dot_notation_returns_default_for_missing_path() {
        let file = write_yaml(VALID);
        let loader = Loader::load(file.path(), &[]).unwrap();
        let value = loader.get("global.backup.nonexistent", Value::from("fallback")).unwrap();
        assert_eq!(value, Value::from("fallback"));
    }

    #[test]
    fn dot_notation_rejects_paths_deeper_than_five_levels() {
        let file = write_yaml(VALID);
        let loader = Loader::load(file.path(), &[]).unwrap();
        let err = loader.get("a.b.c.d.e.f", Value::Null).unwrap_err();
        assert!(matches!(err, ConfigError::DotDepthExceeded { .. }));
    }

    #[test]
    fn overlay_files_append_to_services_list() {
        let base = write_yaml(VALID);
        let overlay = write_yaml("services:\n  - name: jellyfin\n    kind: docker\n    container_name: jellyfin\n");
        let loader = Loader::load(base.path(), &[overlay.path().to_path_buf()]).unwrap();
        assert_eq!(loader.services().len(), 2);
    }

    #[test]
    fn rejects_unknown_key_under_global() {
        let mut content = VALID.to_string();
        content = content.replace(
            "  backup:\n    enabled: true\n    root: /srv/backups\n    retention_days: 14\n",
            "  backup:\n    enabled: true\n    root: /srv/backups\n    retention_days: 14\n  bogus_section: true\n",
        );
        let file = write_yaml(&content);
        let err = Loader::load(file.path(), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_unknown_key_at_document_root() {
        let content = format!("{VALID}also_bogus: true\n");
        let file = write_yaml(&content);
        let err = Loader::load(file.path(), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_remote_archive_server_missing_credentials() {
        let mut content = VALID.to_string();
        content = content.replace(
            "  backup:\n    enabled: true\n    root: /srv/backups\n    retention_days: 14\n",
            "  backup:\n    enabled: true\n    root: /srv/backups\n    retention_days: 14\n    remote_archive_server:\n      enabled: true\n      host: pbs.local\n      datastore: main\n      user: root@pam\n",
        );
        let file = write_yaml(&content);
        let err = Loader::load(file.path(), &[]).unwrap_err();
        match err {
            ConfigError::Invalid { diagnostics } => {
                assert!(diagnostics.iter().any(|d| d.contains("password")));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
