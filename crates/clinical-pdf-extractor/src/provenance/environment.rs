//! Clock and host environment probes
//!
//! Both are traits so manifests can be built deterministically in tests.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::process::Command;

use crate::error::{Error, Result};
use crate::types::EnvironmentInfo;

/// Source of the current UTC time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Host platform and package version lookup
pub trait EnvironmentProbe {
    /// Human-readable host platform description
    fn platform(&self) -> String;

    /// Installed version of `package`.
    ///
    /// `Ok(None)` means the package is not installed or its version cannot be
    /// determined. `Err` is reserved for unexpected failures.
    fn package_version(&self, package: &str) -> Result<Option<String>>;
}

/// Command-line tools whose version can be probed with `<tool> -v`
const PROBED_TOOLS: &[&str] = &["pdftotext", "pdfinfo"];

static TOOL_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"version\s+([0-9][0-9A-Za-z.\-]*)").expect("valid version pattern"));

/// Probe for the machine the process runs on.
///
/// Resolves this crate's own version from build metadata and the poppler
/// tools by running `<tool> -v`. Any other package is unresolvable unless
/// registered with [`HostEnvironment::with_known_version`].
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    /// Extra compile-time versions, e.g. for embedding applications
    known: BTreeMap<String, String>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version that is known without probing
    pub fn with_known_version(mut self, package: impl Into<String>, version: impl Into<String>) -> Self {
        self.known.insert(package.into(), version.into());
        self
    }

    fn tool_version(tool: &str) -> Result<Option<String>> {
        let output = match Command::new(tool).arg("-v").output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::external_tool(tool, format!("failed to query version: {}", e)))
            }
        };

        // poppler tools print their banner on stderr
        let banner = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(TOOL_VERSION
            .captures(&banner)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()))
    }
}

impl EnvironmentProbe for HostEnvironment {
    fn platform(&self) -> String {
        format!(
            "{}-{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            std::env::consts::FAMILY
        )
    }

    fn package_version(&self, package: &str) -> Result<Option<String>> {
        if let Some(version) = self.known.get(package) {
            return Ok(Some(version.clone()));
        }
        if package == env!("CARGO_PKG_NAME") {
            return Ok(Some(env!("CARGO_PKG_VERSION").to_string()));
        }
        if PROBED_TOOLS.contains(&package) {
            return Self::tool_version(package);
        }
        Ok(None)
    }
}

/// Record the platform and, best-effort, the version of each package.
///
/// Packages that cannot be resolved are left out. Unexpected lookup failures
/// are logged and also left out; they never fail the run.
pub fn resolve_environment(probe: &dyn EnvironmentProbe, packages: &[String]) -> EnvironmentInfo {
    let mut versions = BTreeMap::new();
    for package in packages {
        match probe.package_version(package) {
            Ok(Some(version)) => {
                versions.insert(package.clone(), version);
            }
            Ok(None) => tracing::debug!("Package '{}' not resolvable, omitting", package),
            Err(e) => tracing::warn!("Version lookup for '{}' failed: {}", package, e),
        }
    }

    EnvironmentInfo {
        platform: probe.platform(),
        packages: versions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StubProbe;

    impl EnvironmentProbe for StubProbe {
        fn platform(&self) -> String {
            "test-os".to_string()
        }

        fn package_version(&self, package: &str) -> Result<Option<String>> {
            match package {
                "present" => Ok(Some("1.2.3".to_string())),
                "broken" => Err(Error::external_tool("broken", "permission denied")),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_resolve_environment_omits_unresolved() {
        let packages = vec![
            "present".to_string(),
            "missing".to_string(),
            "broken".to_string(),
        ];
        let env = resolve_environment(&StubProbe, &packages);

        assert_eq!(env.platform, "test-os");
        assert_eq!(env.packages.len(), 1);
        assert_eq!(env.packages.get("present").map(String::as_str), Some("1.2.3"));
    }

    #[test]
    fn test_host_resolves_own_version() {
        let host = HostEnvironment::new();
        assert_eq!(
            host.package_version(env!("CARGO_PKG_NAME")).unwrap(),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
        assert!(host.platform().contains(std::env::consts::OS));
    }

    #[test]
    fn test_host_unknown_package_is_none() {
        let host = HostEnvironment::new();
        assert_eq!(host.package_version("no-such-package").unwrap(), None);
    }

    #[test]
    fn test_tool_version_missing_binary_is_none() {
        assert_eq!(HostEnvironment::tool_version("no-such-tool-cpe-test").unwrap(), None);
    }

    #[test]
    fn test_known_versions_take_precedence() {
        let host = HostEnvironment::new().with_known_version("lopdf", "0.34.0");
        assert_eq!(host.package_version("lopdf").unwrap(), Some("0.34.0".to_string()));
    }

    #[test]
    fn test_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(FixedClock(at).now(), at);
    }
}
