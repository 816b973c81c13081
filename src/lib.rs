pub mod arbitrator;
pub mod capture;
pub mod catalog;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod dom;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod host;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod palette;
pub mod protocol;
pub mod resolve;
pub mod state;
pub use error::{AppError, AppResult};

/// Entrypoint used by the `dom-copier` binary. `args` includes the program
/// name, as `std::env::args` yields it.
pub fn run<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::Parser;

    logging::init();
    let cli = cli::Cli::try_parse_from(args).unwrap_or_else(|err| err.exit());
    tracing::debug!(command = ?cli.command, "starting dom-copier");
    cli::execute(cli.command)
}
