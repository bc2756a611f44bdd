// Launch options
//
// Immutable caller-supplied configuration for one launch. The three
// directories/paths every launch needs are constructor arguments; everything
// else defaults off and is set through chained builder methods.

use std::path::PathBuf;

/// Options for launching the application under test
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Root of a packaged build to launch. `None` means dev mode: launch the
    /// development executable out of the source checkout.
    pub build_path: Option<PathBuf>,

    /// Source checkout root. Used in dev mode for executable/output
    /// resolution and as the source of helper extensions. Defaults to the
    /// current directory when not set.
    pub repo_root: Option<PathBuf>,

    /// Isolated user-data directory for this run
    pub user_data_dir: PathBuf,

    /// Isolated extensions directory for this run
    pub extensions_dir: PathBuf,

    /// Workspace (folder or `.code-workspace` file) to open
    pub workspace_path: PathBuf,

    /// Where the application writes its logs. Defaults to
    /// `<user_data_dir>/logs`.
    pub logs_dir: Option<PathBuf>,

    /// Verbose driver logging; also routes the child's stdout/stderr to the
    /// host's own streams
    pub verbose: bool,

    /// Open the workspace through the test remote resolver instead of
    /// locally
    pub remote: bool,

    /// Extra arguments appended after all generated flags
    pub extra_args: Vec<String>,
}

impl LaunchOptions {
    /// Creates options for opening `workspace_path` with the given isolated
    /// user-data and extensions directories.
    pub fn new(
        workspace_path: impl Into<PathBuf>,
        user_data_dir: impl Into<PathBuf>,
        extensions_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            build_path: None,
            repo_root: None,
            user_data_dir: user_data_dir.into(),
            extensions_dir: extensions_dir.into(),
            workspace_path: workspace_path.into(),
            logs_dir: None,
            verbose: false,
            remote: false,
            extra_args: Vec::new(),
        }
    }

    /// Launch a packaged build rooted at `path` instead of the dev build
    pub fn build_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.build_path = Some(path.into());
        self
    }

    /// Set the source checkout root (dev mode, extension sources)
    pub fn repo_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_root = Some(path.into());
        self
    }

    /// Override the logs directory
    pub fn logs_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.logs_dir = Some(path.into());
        self
    }

    /// Enable verbose driver logging and stdio passthrough
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Open the workspace through the test remote resolver
    pub fn remote(mut self, enabled: bool) -> Self {
        self.remote = enabled;
        self
    }

    /// Append extra arguments after all generated flags
    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// The effective logs directory for this launch
    pub(crate) fn effective_logs_dir(&self) -> PathBuf {
        self.logs_dir
            .clone()
            .unwrap_or_else(|| self.user_data_dir.join("logs"))
    }
}
