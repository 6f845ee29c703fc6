//! Compiler capability probes.
//!
//! Each probe compiles a throwaway program in a temporary directory and
//! reports whether the compilation succeeded. Probe failures are never
//! fatal; they only withhold an optional flag.

use std::path::Path;

use crate::util::process::ProcessBuilder;

const PROBE_PROGRAM: &str = "#include <iostream>

int main()
{
  std::cout << \"Hello World!\";
}
";

/// Check whether the C++ compiler accepts the given flags.
pub fn cpp_supports_flags(cpp: &str, flags: &[&str]) -> bool {
    let Ok(tmp) = tempfile::tempdir() else {
        return false;
    };
    if std::fs::write(tmp.path().join("probe.cc"), PROBE_PROGRAM).is_err() {
        return false;
    }

    let Ok(output) = ProcessBuilder::new(cpp)
        .args(flags)
        .args(["probe.cc", "-o", "probe"])
        .cwd(tmp.path())
        .exec()
    else {
        return false;
    };
    output.status.success()
}

/// Check whether a HepMC installation supports writing named weights.
///
/// Compiles the shipped probe source against the resolved installation;
/// stock HepMC 2 releases fail this, patched ones pass.
pub fn hepmc_supports_named_weights(cpp: &str, scripts_dir: &Path, hepmc_path: &Path) -> bool {
    let source = scripts_dir.join("probe-hepmc-weights.cc");
    if !source.is_file() {
        return false;
    }

    let Ok(tmp) = tempfile::tempdir() else {
        return false;
    };
    if std::fs::copy(&source, tmp.path().join("probe-hepmc-weights.cc")).is_err() {
        return false;
    }

    let Ok(output) = ProcessBuilder::new(cpp)
        .args(["probe-hepmc-weights.cc", "-o", "probe-hepmc-weights"])
        .arg(format!("-I{}", hepmc_path.join("include").display()))
        .arg(format!("-L{}", hepmc_path.join("lib").display()))
        .arg("-lHepMC")
        .cwd(tmp.path())
        .exec()
    else {
        return false;
    };
    output.status.success()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_probe_reflects_compiler_exit_status() {
        // `true` and `false` stand in for a compiler accepting/rejecting flags.
        assert!(cpp_supports_flags("true", &["-fno-rtti"]));
        assert!(!cpp_supports_flags("false", &["-fno-rtti"]));
    }

    #[test]
    fn test_probe_missing_compiler() {
        assert!(!cpp_supports_flags("hepstack-no-such-compiler", &[]));
    }

    #[test]
    fn test_named_weight_probe_needs_probe_source() {
        let tmp = tempfile::tempdir().unwrap();
        // No probe-hepmc-weights.cc in the scripts dir: probe reports no support.
        assert!(!hepmc_supports_named_weights("g++", tmp.path(), tmp.path()));
    }
}
