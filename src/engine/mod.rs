//! Locating and invoking the external `ag` engine.
//!
//! All model mathematics (fitting, forecasting, diagnostics, simulation)
//! lives in the engine executable. This crate only drives it through its
//! command-line contract and parses the files it writes; the engine's
//! internal behavior is never validated here, only its exit code.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::error::VizError;

/// Environment variable that pins the engine executable location.
pub const ENGINE_ENV_VAR: &str = "AG_EXECUTABLE";

const ENGINE_NAME: &str = "ag";

/// Conventional build output locations, relative to the working directory.
const BUILD_LOCATIONS: [&str; 3] = [
    "build/src/ag",
    "build/Release/src/ag",
    "build/Debug/src/ag",
];

/// Locate the engine executable.
///
/// Search order: `AG_EXECUTABLE`, the system `PATH`, then conventional
/// build locations.
pub fn find_engine() -> Option<PathBuf> {
    if let Ok(path) = env::var(ENGINE_ENV_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(path) = search_path(ENGINE_NAME) {
        return Some(path);
    }

    BUILD_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Run an engine subcommand, capturing stdout/stderr.
///
/// A missing executable, a failed launch, or a non-zero exit status all
/// surface as [`VizError::Engine`]; the non-zero case carries the exit code
/// and the engine's stderr.
pub fn run_engine<I, S>(args: I) -> Result<Output, VizError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let exe = find_engine().ok_or_else(|| {
        VizError::Engine(format!(
            "ag executable not found; build the engine or set {ENGINE_ENV_VAR} to its location"
        ))
    })?;

    let args: Vec<std::ffi::OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let output = Command::new(&exe).args(&args).output().map_err(|e| {
        VizError::Engine(format!("failed to launch '{}': {e}", exe.display()))
    })?;

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "terminated by signal".to_string());
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VizError::Engine(format!(
            "ag command failed with exit code {code}\nstderr: {}",
            stderr.trim_end()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        writeln!(file, "{body}").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    // One test covers both exit paths: the env var is process-global, so a
    // single sequential test avoids races between parallel test threads.
    #[test]
    fn run_engine_propagates_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_script(dir.path(), "ag-ok", "echo fitted; exit 0");
        let fail = write_script(dir.path(), "ag-fail", "echo boom >&2; exit 3");

        unsafe { env::set_var(ENGINE_ENV_VAR, &ok) };
        let output = run_engine(["fit"]).unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("fitted"));

        unsafe { env::set_var(ENGINE_ENV_VAR, &fail) };
        let err = run_engine(["fit"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit code 3"));
        assert!(message.contains("boom"));

        unsafe { env::remove_var(ENGINE_ENV_VAR) };
    }
}
