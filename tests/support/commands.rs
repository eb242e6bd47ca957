//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables the binary reads that must not leak in from the host.
const SCRUBBED_VARS: &[&str] = &[
    "AAD_ACCESS_TOKEN",
    "DOTENV_KEYVAULT_FILE",
    "DOTENV_KEYVAULT_LOG",
    "MSI_ENDPOINT",
    "MSI_SECRET",
];

impl Test {
    /// Create a dotenv-keyvault command.
    ///
    /// Returns a Command configured with:
    /// - Current directory set to the test project directory
    /// - Host token and endpoint variables removed
    /// - Colors disabled
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd =
            Command::cargo_bin("dotenv-keyvault").expect("failed to find dotenv-keyvault binary");
        for var in SCRUBBED_VARS {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `dotenv-keyvault check`.
    pub fn check(&self) -> Output {
        self.cmd()
            .arg("check")
            .output()
            .expect("failed to run dotenv-keyvault check")
    }

    /// Shortcut for `dotenv-keyvault resolve` with extra arguments.
    pub fn resolve(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("resolve")
            .args(args)
            .output()
            .expect("failed to run dotenv-keyvault resolve")
    }
}
