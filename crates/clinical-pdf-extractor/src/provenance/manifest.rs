//! Manifest assembly and persistence

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::environment::{resolve_environment, Clock, EnvironmentProbe, HostEnvironment, SystemClock};
use super::hasher::fingerprint_file;
use crate::config::ProvenanceConfig;
use crate::error::{Error, Result};
use crate::types::{FileRecord, Manifest};

/// Everything a manifest describes about one run
#[derive(Debug, Clone)]
pub struct ManifestRequest<'a> {
    /// The PDF that was processed
    pub input_pdf: &'a Path,
    /// Directory whose files are all recorded as outputs
    pub output_dir: &'a Path,
    /// Text extraction backend identifier
    pub backend: &'a str,
    /// Run options, recorded verbatim
    pub args: BTreeMap<String, serde_json::Value>,
    /// Outputs living outside `output_dir`
    pub extra_outputs: Vec<PathBuf>,
}

/// Every regular file under `output_dir` plus `extra_outputs`, deduplicated
/// and sorted by path.
pub fn enumerate_outputs(output_dir: &Path, extra_outputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut outputs: Vec<PathBuf> = WalkDir::new(output_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", output_dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    outputs.extend(extra_outputs.iter().cloned());
    outputs.sort();
    outputs.dedup();
    outputs
}

/// Builds manifests with an injected clock and environment probe
pub struct ProvenanceRecorder {
    clock: Box<dyn Clock>,
    probe: Box<dyn EnvironmentProbe>,
    config: ProvenanceConfig,
}

impl Default for ProvenanceRecorder {
    fn default() -> Self {
        Self::new(ProvenanceConfig::default())
    }
}

impl ProvenanceRecorder {
    /// Recorder using the system clock and host environment
    pub fn new(config: ProvenanceConfig) -> Self {
        Self::with_probes(config, Box::new(SystemClock), Box::new(HostEnvironment::new()))
    }

    pub fn with_probes(
        config: ProvenanceConfig,
        clock: Box<dyn Clock>,
        probe: Box<dyn EnvironmentProbe>,
    ) -> Self {
        Self {
            clock,
            probe,
            config,
        }
    }

    /// Fingerprint a single file with the configured block size
    pub fn fingerprint(&self, path: &Path) -> Result<FileRecord> {
        fingerprint_file(path, self.config.hash_block_size)
    }

    /// Assemble the manifest for one run.
    ///
    /// The input must exist. Outputs that disappear between enumeration and
    /// hashing are left out.
    pub fn build_manifest(&self, request: ManifestRequest<'_>) -> Result<Manifest> {
        let input = self.fingerprint(request.input_pdf)?;

        let mut outputs = Vec::new();
        for path in enumerate_outputs(request.output_dir, &request.extra_outputs) {
            match self.fingerprint(&path) {
                Ok(record) => outputs.push(record),
                Err(Error::NotFound(missing)) => {
                    tracing::debug!("Output vanished before hashing: {}", missing.display());
                }
                Err(e) => return Err(e),
            }
        }

        let environment = resolve_environment(self.probe.as_ref(), &self.config.packages);

        tracing::info!(
            "Built manifest: input {} ({} bytes), {} outputs",
            input.path,
            input.bytes,
            outputs.len()
        );

        Ok(Manifest {
            created_utc: self.clock.now(),
            input,
            output_dir: request.output_dir.display().to_string(),
            backend: request.backend.to_string(),
            args: request.args,
            outputs,
            environment,
        })
    }
}

/// Build a manifest with the system clock and host environment
pub fn build_manifest(request: ManifestRequest<'_>) -> Result<Manifest> {
    ProvenanceRecorder::default().build_manifest(request)
}

/// Write the manifest as indented JSON with keys sorted at every level,
/// replacing any existing file.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    // serde_json::Map is ordered by key, so going through Value sorts keys
    let value = serde_json::to_value(manifest)?;
    let json = serde_json::to_string_pretty(&value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a manifest written by [`write_manifest`]
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::environment::FixedClock;
    use chrono::{TimeZone, Utc};
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    struct StubProbe;

    impl EnvironmentProbe for StubProbe {
        fn platform(&self) -> String {
            "test-os-x86_64".to_string()
        }

        fn package_version(&self, package: &str) -> Result<Option<String>> {
            Ok((package == "clinical-pdf-extractor").then(|| "0.1.0".to_string()))
        }
    }

    fn recorder() -> ProvenanceRecorder {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        ProvenanceRecorder::with_probes(
            ProvenanceConfig {
                hash_block_size: 4,
                packages: vec!["clinical-pdf-extractor".to_string(), "absent".to_string()],
            },
            Box::new(FixedClock(at)),
            Box::new(StubProbe),
        )
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let pdf = tmp.path().join("basic.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 fake body").unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir(&out).unwrap();
        (tmp, pdf, out)
    }

    fn request<'a>(pdf: &'a Path, out: &'a Path) -> ManifestRequest<'a> {
        let mut args = BTreeMap::new();
        args.insert("tables".to_string(), serde_json::Value::Bool(false));
        ManifestRequest {
            input_pdf: pdf,
            output_dir: out,
            backend: "pdf-extract",
            args,
            extra_outputs: Vec::new(),
        }
    }

    #[test]
    fn test_manifest_records_single_output() {
        let (_tmp, pdf, out) = setup();
        std::fs::write(out.join("text.txt"), "hello").unwrap();

        let manifest = recorder().build_manifest(request(&pdf, &out)).unwrap();

        assert_eq!(manifest.outputs.len(), 1);
        assert!(manifest.outputs[0].path.ends_with("text.txt"));
        assert_eq!(
            manifest.outputs[0].sha256,
            hex::encode(Sha256::digest(b"hello"))
        );
        assert_eq!(
            manifest.input.sha256,
            hex::encode(Sha256::digest(b"%PDF-1.4 fake body"))
        );
        assert_eq!(manifest.backend, "pdf-extract");
        assert_eq!(manifest.environment.platform, "test-os-x86_64");
        assert_eq!(manifest.environment.packages.len(), 1);
        assert_eq!(manifest.created_utc, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
    }

    #[test]
    fn test_outputs_are_recursive_sorted_and_deduplicated() {
        let (tmp, pdf, out) = setup();
        std::fs::create_dir(out.join("tables")).unwrap();
        std::fs::write(out.join("tables").join("table_001.csv"), "a,b\n1,2\n").unwrap();
        std::fs::write(out.join("b.txt"), "b").unwrap();
        std::fs::write(out.join("a.txt"), "a").unwrap();
        let extra = tmp.path().join("extra.log");
        std::fs::write(&extra, "log").unwrap();

        let mut req = request(&pdf, &out);
        req.extra_outputs = vec![extra.clone(), out.join("a.txt")];
        let manifest = recorder().build_manifest(req).unwrap();

        let paths: Vec<&str> = manifest.outputs.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths.len(), 4);
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert!(paths.iter().any(|p| p.ends_with("table_001.csv")));
        assert!(paths.iter().any(|p| p.ends_with("extra.log")));
    }

    #[test]
    fn test_vanished_outputs_are_skipped() {
        let (tmp, pdf, out) = setup();
        std::fs::write(out.join("text.txt"), "hello").unwrap();

        let mut req = request(&pdf, &out);
        req.extra_outputs = vec![tmp.path().join("gone.jsonl")];
        let manifest = recorder().build_manifest(req).unwrap();

        assert_eq!(manifest.outputs.len(), 1);
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let (tmp, _pdf, out) = setup();
        let missing = tmp.path().join("missing.pdf");
        let err = recorder().build_manifest(request(&missing, &out)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_write_manifest_sorted_and_indented() {
        let (_tmp, pdf, out) = setup();
        std::fs::write(out.join("text.txt"), "hello").unwrap();
        let manifest = recorder().build_manifest(request(&pdf, &out)).unwrap();

        let path = out.join("manifest.json");
        write_manifest(&path, &manifest).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();

        assert!(raw.starts_with("{\n  \"args\""));
        let keys = ["\"args\"", "\"backend\"", "\"created_utc\"", "\"environment\"", "\"input\"", "\"output_dir\"", "\"outputs\""];
        let positions: Vec<usize> = keys.iter().map(|k| raw.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let loaded: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(!loaded["input"]["sha256"].as_str().unwrap().is_empty());
        assert!(loaded["outputs"]
            .as_array()
            .unwrap()
            .iter()
            .any(|o| o["path"].as_str().unwrap().ends_with("text.txt")));

        assert_eq!(read_manifest(&path).unwrap(), manifest);
    }
}
