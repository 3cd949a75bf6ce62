//! Host platform metadata collection.
//!
//! Gathers hardware/software descriptors for the machine a benchmark ran on
//! and round-trips them through a JSON document so the report can attribute
//! results to a specific host.
//!
//! CPU model resolution differs per OS, so it is a small capability
//! selected once at startup via [`CpuModelProbe::for_host`]:
//! - Linux reads `/proc/cpuinfo` and pattern-matches the first `model name`
//!   line
//! - macOS invokes `sysctl -n machdep.cpu.brand_string`
//! - Windows reads the `PROCESSOR_IDENTIFIER` environment property
//!
//! Unsupported platforms yield an empty model string, never an error.

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::files::PLATFORM_SUMMARY;

/// Flat record of host hardware/software descriptors.
///
/// Immutable once constructed; serialized to and restored from a pretty JSON
/// document with stable (declaration-order) keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// CPU architecture, e.g. `x86_64`.
    pub arch: String,
    /// Kernel name, e.g. `Linux`.
    pub system: String,
    /// Host name.
    pub node: String,
    /// Kernel release, e.g. `6.8.0-45-generic`.
    pub release: String,
    /// Kernel version/build string.
    pub version: String,
    /// Machine hardware name.
    pub machine: String,
    /// Processor identifier as reported by the kernel.
    pub processor: String,
    /// Distribution identifier, e.g. `Ubuntu 24.04.1 LTS`.
    pub distro: String,
    /// CPU model string, empty when undetectable.
    pub cpu_model: String,
    /// Logical core count.
    pub cores: usize,
    /// Total physical memory, GiB with 3-decimal formatting.
    pub memory: String,
}

impl PlatformInfo {
    /// Query the operating system for the host descriptors.
    ///
    /// No side effects; every probe that fails degrades to an empty field
    /// rather than an error.
    pub fn collect() -> Self {
        let probe = CpuModelProbe::for_host();
        let machine = uname_field("-m");
        Self {
            arch: env::consts::ARCH.to_string(),
            system: uname_field("-s"),
            node: uname_field("-n"),
            release: uname_field("-r"),
            version: uname_field("-v"),
            processor: machine.clone(),
            machine,
            distro: distro_string(),
            cpu_model: probe.read().unwrap_or_default(),
            cores: num_cpus::get(),
            memory: memory_gib()
                .map(|gib| format!("{:.3} GB", gib))
                .unwrap_or_default(),
        }
    }

    /// Persist the record as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Restore a previously saved record.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MissingArtifact`] if the document is absent or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let text = fs::read_to_string(path).map_err(|e| AnalysisError::MissingArtifact {
            name: PLATFORM_SUMMARY,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| AnalysisError::MissingArtifact {
            name: PLATFORM_SUMMARY,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Per-OS capability for resolving the CPU model string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuModelProbe {
    /// Read `/proc/cpuinfo` and take the first `model name` value.
    ProcCpuinfo,
    /// Run `sysctl -n machdep.cpu.brand_string`.
    SysctlBrandString,
    /// Read the `PROCESSOR_IDENTIFIER` environment property.
    ProcessorEnv,
    /// No known source on this platform.
    Unsupported,
}

impl CpuModelProbe {
    /// Select the probe for the running OS.
    pub fn for_host() -> Self {
        match env::consts::OS {
            "linux" => CpuModelProbe::ProcCpuinfo,
            "macos" => CpuModelProbe::SysctlBrandString,
            "windows" => CpuModelProbe::ProcessorEnv,
            _ => CpuModelProbe::Unsupported,
        }
    }

    /// Resolve the CPU model string, `None` when unavailable.
    pub fn read(&self) -> Option<String> {
        match self {
            CpuModelProbe::ProcCpuinfo => {
                let cpuinfo = fs::read_to_string("/proc/cpuinfo").ok()?;
                parse_model_name(&cpuinfo)
            }
            CpuModelProbe::SysctlBrandString => {
                command_output("sysctl", &["-n", "machdep.cpu.brand_string"])
            }
            CpuModelProbe::ProcessorEnv => env::var("PROCESSOR_IDENTIFIER").ok(),
            CpuModelProbe::Unsupported => None,
        }
    }
}

/// Extract the value after the first `model name` label in cpuinfo text.
fn parse_model_name(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}

/// One field of `uname(1)` output, empty when unavailable.
fn uname_field(flag: &str) -> String {
    command_output("uname", &[flag]).unwrap_or_default()
}

fn command_output(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Distribution identifier from `/etc/os-release` `PRETTY_NAME`.
fn distro_string() -> String {
    let Ok(text) = fs::read_to_string("/etc/os-release") else {
        return String::new();
    };
    text.lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim_matches('"').to_string())
        .unwrap_or_default()
}

/// Total physical memory in GiB.
fn memory_gib() -> Option<f64> {
    match env::consts::OS {
        "linux" => {
            let meminfo = fs::read_to_string("/proc/meminfo").ok()?;
            let kb: f64 = meminfo
                .lines()
                .find(|line| line.starts_with("MemTotal:"))?
                .split_whitespace()
                .nth(1)?
                .parse()
                .ok()?;
            Some(kb * 1024.0 / (1024.0 * 1024.0 * 1024.0))
        }
        "macos" => {
            let bytes: f64 = command_output("sysctl", &["-n", "hw.memsize"])?.parse().ok()?;
            Some(bytes / (1024.0 * 1024.0 * 1024.0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_load_round_trip() {
        let info = PlatformInfo {
            arch: "x86_64".into(),
            system: "Linux".into(),
            node: "bench-host".into(),
            release: "6.8.0-45-generic".into(),
            version: "#45-Ubuntu SMP".into(),
            machine: "x86_64".into(),
            processor: "x86_64".into(),
            distro: "Ubuntu 24.04.1 LTS".into(),
            cpu_model: "Intel(R) Xeon(R) Gold 6338".into(),
            cores: 64,
            memory: "251.531 GB".into(),
        };

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PLATFORM_SUMMARY);
        info.save(&path).unwrap();
        let restored = PlatformInfo::load(&path).unwrap();
        assert_eq!(restored, info);
    }

    #[test]
    fn load_missing_file_is_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let err = PlatformInfo::load(&dir.path().join(PLATFORM_SUMMARY)).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingArtifact { .. }));
    }

    #[test]
    fn load_malformed_document_is_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PLATFORM_SUMMARY);
        fs::write(&path, "{ not json").unwrap();
        let err = PlatformInfo::load(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingArtifact { .. }));
    }

    #[test]
    fn model_name_parsing() {
        let cpuinfo = "processor\t: 0\nvendor_id\t: GenuineIntel\n\
                       model name\t: Intel(R) Core(TM) i7-9750H CPU @ 2.60GHz\n\
                       model name\t: other\n";
        assert_eq!(
            parse_model_name(cpuinfo).as_deref(),
            Some("Intel(R) Core(TM) i7-9750H CPU @ 2.60GHz")
        );
        assert_eq!(parse_model_name("flags: fpu vme"), None);
    }

    #[test]
    fn collect_populates_basic_fields() {
        let info = PlatformInfo::collect();
        assert!(!info.arch.is_empty());
        assert!(info.cores >= 1);
    }
}
