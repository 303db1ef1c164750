pub mod client;
pub mod executor;
pub mod git;
pub mod process;

pub use client::{DockerClient, DockerError};
pub use executor::{CommandExecutor, RealExecutor};
pub use git::{GitClient, GitError};
pub use process::{CommandOutput, ExecError};

pub(crate) fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
