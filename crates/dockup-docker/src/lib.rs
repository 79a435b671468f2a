//! Runtime adapter over the `docker` CLI. One child process per operation,
//! each blocking until the command exits. Nothing here rolls back a partial
//! failure; callers stop their remaining steps instead.

use anyhow::{anyhow, Context, Result};
use std::process::{Command, Stdio};

fn run_docker(args: &[&str]) -> Result<()> {
    tracing::debug!("docker {}", args.join(" "));
    let status = Command::new("docker")
        .args(args)
        .status()
        .with_context(|| format!("failed to run docker {args:?}"))?;
    if !status.success() {
        return Err(anyhow!("docker {args:?} failed"));
    }
    Ok(())
}

fn run_docker_quiet(args: &[&str]) -> Result<()> {
    tracing::debug!("docker {}", args.join(" "));
    let status = Command::new("docker")
        .args(args)
        .stdout(Stdio::null())
        .status()
        .with_context(|| format!("failed to run docker {args:?}"))?;
    if !status.success() {
        return Err(anyhow!("docker {args:?} failed"));
    }
    Ok(())
}

/// Whether a container with exactly this name exists (running or stopped).
/// Fails open to `false`: a missing or broken docker installation routes the
/// caller toward "create", never toward a crash.
pub fn container_exists(name: &str) -> bool {
    let output = Command::new("docker")
        .args(["container", "ps", "-a", "--format", "{{.Names}}"])
        .output();
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .any(|line| line.trim() == name),
        Ok(out) => {
            tracing::warn!(
                "docker container listing failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
            false
        }
        Err(err) => {
            tracing::warn!("docker not available: {err}");
            false
        }
    }
}

/// Serializes the container filesystem into a tar archive at `dest`.
pub fn export_container(name: &str, dest: &str) -> Result<()> {
    run_docker(&["export", "-o", dest, name])
}

/// Creates an image tagged `tag` from an exported archive.
pub fn import_archive(path: &str, tag: &str) -> Result<()> {
    run_docker_quiet(&["import", path, tag])
}

/// Removes a stopped container.
pub fn remove_container(name: &str) -> Result<()> {
    run_docker_quiet(&["container", "rm", name])
}

/// Runs a container in the foreground with an interactive terminal.
pub fn run_attached(image: &str, name: &str) -> Result<()> {
    run_docker(&["run", "--name", name, "-it", image])
}

/// Runs a container detached and returns the id docker prints.
pub fn run_detached(image: &str, name: &str) -> Result<String> {
    tracing::debug!("docker run --name {name} -d {image}");
    let output = Command::new("docker")
        .args(["run", "--name", name, "-d", image])
        .output()
        .with_context(|| format!("failed to run docker run -d {image}"))?;
    if !output.status.success() {
        return Err(anyhow!(
            "docker run -d {image} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Runs a container in the foreground that removes itself on exit.
pub fn run_ephemeral(image: &str, name: &str) -> Result<()> {
    run_docker(&["run", "--rm", "--name", name, "-it", image])
}
