//! Provenance: file fingerprints, environment capture and run manifests

pub mod environment;
mod hasher;
mod manifest;

pub use environment::{
    resolve_environment, Clock, EnvironmentProbe, FixedClock, HostEnvironment, SystemClock,
};
pub use hasher::{fingerprint_file, sha256_file, DEFAULT_HASH_BLOCK_SIZE};
pub use manifest::{
    build_manifest, enumerate_outputs, read_manifest, write_manifest, ManifestRequest,
    ProvenanceRecorder,
};
