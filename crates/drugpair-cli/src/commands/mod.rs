//! CLI Command Implementations
//!
//! - [`summary`]: Dataset statistics
//! - [`validate`]: Referential consistency checks
//! - [`batches`]: Batch generation reports

mod batches;
mod summary;
mod validate;

pub use batches::BatchesCommand;
pub use summary::SummaryCommand;
pub use validate::ValidateCommand;

use drugpair_core::RightEntitySource;

/// Feature set consulted for the right-hand key of each triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RightSourceArg {
    /// Look the key up among the drugs
    #[default]
    Drug,
    /// Look the key up among the contexts
    Context,
}

impl From<RightSourceArg> for RightEntitySource {
    fn from(arg: RightSourceArg) -> Self {
        match arg {
            RightSourceArg::Drug => RightEntitySource::Drug,
            RightSourceArg::Context => RightEntitySource::Context,
        }
    }
}
