// Spawn environment assembly
//
// Builds the exact argument vector and environment map the application is
// spawned with. The flag set below is the wire contract with the
// application; renaming any of them breaks compatibility.

use crate::endpoint::Endpoint;
use crate::extensions::ExtensionCopier;
use crate::options::LaunchOptions;
use crate::platform::Platform;
use crate::{Error, Result};
use std::path::Path;

/// Everything the process launcher needs to spawn the child
#[derive(Debug)]
pub(crate) struct SpawnSpec {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Route the child's stdout/stderr to the host's own streams instead of
    /// discarding them (verbose mode)
    pub inherit_stdio: bool,
}

/// Name of the remote-resolution helper extension
const TEST_RESOLVER_EXTENSION: &str = "vscode-test-resolver";
/// Name of the notebook test-support helper extension
const NOTEBOOK_TESTS_EXTENSION: &str = "vscode-notebook-tests";

/// Assembles the argument vector and environment for one launch.
///
/// Async and fallible because remote mode creates the server-side data
/// directories and copies helper extensions before the process starts.
pub(crate) async fn build_spawn_spec(
    options: &LaunchOptions,
    platform: Platform,
    repo_root: &Path,
    endpoint: &Endpoint,
    copier: &dyn ExtensionCopier,
) -> Result<SpawnSpec> {
    let logs_path = options.effective_logs_dir();

    let mut args: Vec<String> = vec![
        options.workspace_path.to_string_lossy().into_owned(),
        "--skip-release-notes".to_string(),
        "--skip-welcome".to_string(),
        "--disable-telemetry".to_string(),
        "--no-cached-data".to_string(),
        "--disable-updates".to_string(),
        "--disable-keytar".to_string(),
        "--disable-crash-reporter".to_string(),
        "--disable-workspace-trust".to_string(),
        format!("--extensions-dir={}", options.extensions_dir.display()),
        format!("--user-data-dir={}", options.user_data_dir.display()),
        format!("--logsPath={}", logs_path.display()),
        "--driver".to_string(),
        endpoint.as_str().to_string(),
    ];

    let mut env: Vec<(String, String)> = Vec::new();

    if platform == Platform::Linux {
        // Virtualized CI machines commonly fail to render with GPU
        // acceleration enabled.
        args.push("--disable-gpu".to_string());
    }

    if options.remote {
        args[0] = remote_workspace_arg(&options.workspace_path)?;
        args.push(format!(
            "--enable-proposed-api=vscode.{}",
            TEST_RESOLVER_EXTENSION
        ));

        // The remote host gets its own data directory next to the local one.
        let remote_data_dir =
            std::path::PathBuf::from(format!("{}-server", options.user_data_dir.display()));
        tokio::fs::create_dir_all(&remote_data_dir).await?;

        if options.build_path.is_some() {
            // Packaged builds do not carry the helper extensions; install
            // them into the shared and server-side extension directories.
            copier
                .copy_extension(repo_root, TEST_RESOLVER_EXTENSION, &options.extensions_dir)
                .await?;
            let remote_extensions_dir = remote_data_dir.join("extensions");
            tokio::fs::create_dir_all(&remote_extensions_dir).await?;
            copier
                .copy_extension(repo_root, NOTEBOOK_TESTS_EXTENSION, &remote_extensions_dir)
                .await?;
        }

        env.push((
            "TESTRESOLVER_DATA_FOLDER".to_string(),
            remote_data_dir.to_string_lossy().into_owned(),
        ));
        env.push((
            "TESTRESOLVER_LOGS_FOLDER".to_string(),
            logs_path.join("server").to_string_lossy().into_owned(),
        ));
    }

    args.push(format!(
        "--enable-proposed-api=vscode.{}",
        NOTEBOOK_TESTS_EXTENSION
    ));

    if options.build_path.is_none() {
        // The dev launcher expects the source root as its first positional
        // argument.
        args.insert(0, repo_root.to_string_lossy().into_owned());
    }

    let inherit_stdio = options.verbose;
    if options.verbose {
        args.push("--driver-verbose".to_string());
    }

    args.extend(options.extra_args.iter().cloned());

    Ok(SpawnSpec {
        args,
        env,
        inherit_stdio,
    })
}

/// Rewrites the workspace path into its remote-scheme URI argument.
///
/// A path naming a `.code-workspace` file opens via `--file-uri`, anything
/// else via `--folder-uri`.
fn remote_workspace_arg(workspace_path: &Path) -> Result<String> {
    let url = url::Url::from_file_path(workspace_path).map_err(|_| {
        Error::InvalidPath(format!(
            "workspace path is not absolute: {}",
            workspace_path.display()
        ))
    })?;
    let kind = if workspace_path
        .extension()
        .is_some_and(|ext| ext == "code-workspace")
    {
        "file"
    } else {
        "folder"
    };
    Ok(format!(
        "--{}-uri=vscode-remote://test+test{}",
        kind,
        url.path()
    ))
}
