//! Static strategy pattern for CLI commands.
//!
//! Each command is its own strategy type with its own input, dispatched
//! statically from `main`.

mod info;
mod init;
mod replay;
mod run;
mod version;

pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use replay::{ReplayInput, ReplayStrategy};
pub use run::{RunInput, RunStrategy};
pub use version::VersionStrategy;

/// Contract shared by all command strategies.
///
/// Each strategy defines its own input type, so parameters are passed
/// without boxing or runtime casting.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
