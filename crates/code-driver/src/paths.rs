// Executable and output path resolution
//
// Maps (platform, dev-vs-build mode, root) to the launchable executable and
// the compiled-output directory. The only I/O here is reading the product
// descriptor JSON; nothing is checked for existence — a wrong path surfaces
// as a spawn failure later, with the path in the message.

use crate::platform::Platform;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Resolved filesystem locations for one launch
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    /// Absolute path to the launchable executable
    pub executable: PathBuf,
    /// Directory containing the compiled program output (where the driver
    /// module lives)
    pub output: PathBuf,
}

/// Subset of the product descriptor (`product.json`) the resolver needs.
///
/// The descriptor carries the per-platform application naming: macOS uses
/// the long name as an app-bundle name, Linux the bare binary name, Windows
/// the short name plus `.exe`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDescriptor {
    name_long: String,
    name_short: String,
    application_name: String,
}

fn read_product(path: &Path) -> Result<ProductDescriptor> {
    let raw = std::fs::read(path)
        .map_err(|e| Error::LaunchFailed(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Resolves the executable and output paths for a launch.
///
/// Dev mode (`build_root` is `None`) resolves against the source checkout at
/// `repo_root`: the executable lives under the `.build/electron` output
/// directory and the compiled output under `out/`. Build mode resolves
/// against a packaged application at `build_root`, with the OS-specific
/// bundle substructure.
///
/// # Errors
///
/// Returns `Error::LaunchFailed` if the product descriptor cannot be read,
/// or `Error::Json` if it does not parse.
pub fn resolve(
    platform: Platform,
    build_root: Option<&Path>,
    repo_root: &Path,
) -> Result<ResolvedPaths> {
    let executable = match build_root {
        Some(root) => build_executable_path(platform, root)?,
        None => dev_executable_path(platform, repo_root)?,
    };
    let output = output_path(platform, build_root, repo_root);
    Ok(ResolvedPaths { executable, output })
}

fn dev_executable_path(platform: Platform, repo_root: &Path) -> Result<PathBuf> {
    let product = read_product(&repo_root.join("product.json"))?;
    let build_dir = repo_root.join(".build").join("electron");
    Ok(match platform {
        Platform::MacOs => build_dir
            .join(format!("{}.app", product.name_long))
            .join("Contents")
            .join("MacOS")
            .join("Electron"),
        Platform::Linux => build_dir.join(product.application_name),
        Platform::Windows => build_dir.join(format!("{}.exe", product.name_short)),
    })
}

fn build_executable_path(platform: Platform, root: &Path) -> Result<PathBuf> {
    Ok(match platform {
        // The macOS bundle always names its binary Electron; no descriptor
        // read is needed.
        Platform::MacOs => root.join("Contents").join("MacOS").join("Electron"),
        Platform::Linux => {
            let product = read_product(&root.join("resources").join("app").join("product.json"))?;
            root.join(product.application_name)
        }
        Platform::Windows => {
            let product = read_product(&root.join("resources").join("app").join("product.json"))?;
            root.join(format!("{}.exe", product.name_short))
        }
    })
}

fn output_path(platform: Platform, build_root: Option<&Path>, repo_root: &Path) -> PathBuf {
    match build_root {
        None => repo_root.join("out"),
        Some(root) => match platform {
            Platform::MacOs => root
                .join("Contents")
                .join("Resources")
                .join("app")
                .join("out"),
            Platform::Linux | Platform::Windows => root.join("resources").join("app").join("out"),
        },
    }
}
