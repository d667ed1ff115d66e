// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive filename generation: `<safe_name>_YYYYMMDD_HHMMSS_<kind>.<ext>`,
//! chosen so that lexical sort matches call order.

use chrono::{DateTime, Utc};
use warden_core::{ServiceDescriptor, ServiceKind};

const DEFAULT_EXTENSION: &str = "tar.gz";

pub fn generate(service: &ServiceDescriptor, now: DateTime<Utc>) -> String {
    format!("{}_{}_{}.{DEFAULT_EXTENSION}", service.safe_name(), now.format("%Y%m%d_%H%M%S"), extension_kind(service.kind))
}

fn extension_kind(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Vm => "vm",
        ServiceKind::Lxc => "lxc",
        ServiceKind::Docker => "docker",
        ServiceKind::Systemd => "systemd",
        ServiceKind::Generic => "generic",
        ServiceKind::Host => "host",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use warden_core::ServiceDescriptor;

    fn service(name: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            kind: ServiceKind::Docker,
            enabled: true,
            backup: true,
            update: true,
            monitor: true,
            vmid: None,
            node: None,
            container_name: Some("plex".to_string()),
            compose_file: None,
            unit_name: None,
            config_paths: Vec::new(),
            data_paths: Vec::new(),
            package_name: None,
            backup_paths: Vec::new(),
            health_check_url: None,
            retention_days: None,
        }
    }

    #[test]
    fn formats_with_safe_name_timestamp_and_kind() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 2, 30, 0).unwrap();
        assert_eq!(generate(&service("plex"), now), "plex_20260305_023000_docker.tar.gz");
    }

    #[test]
    fn spaces_and_slashes_become_underscores() {
        let mut svc = service("media server/plex");
        svc.name = "media server/plex".to_string();
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 2, 30, 0).unwrap();
        assert_eq!(generate(&svc, now), "media_server_plex_20260305_023000_docker.tar.gz");
    }

    #[test]
    fn sequential_calls_sort_lexicographically_in_call_order() {
        let first = generate(&service("plex"), Utc.with_ymd_and_hms(2026, 3, 5, 2, 30, 0).unwrap());
        let second = generate(&service("plex"), Utc.with_ymd_and_hms(2026, 3, 5, 2, 30, 1).unwrap());
        assert!(first < second);
    }
}
