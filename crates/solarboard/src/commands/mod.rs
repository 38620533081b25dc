//! Command dispatch: bridges CLI args -> console reads and commands -> output.

pub mod ads;
pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod engineers;
pub mod products;
pub mod shops;
pub mod util;

use solarboard_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::Login(args) => auth::login(console, args, profile, global).await,
        Command::Logout => {
            auth::logout(console, global);
            Ok(())
        }
        Command::Whoami => auth::whoami(console, global),
        Command::Dashboard(args) => dashboard::handle(console, args, global).await,
        Command::Engineers(args) => engineers::handle(console, args, global).await,
        Command::Shops(args) => shops::handle(console, args, global).await,
        Command::Products(args) => products::handle(console, args, global).await,
        Command::Ads(args) => ads::handle(console, args, global).await,
        // Handled before a console exists.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    result.map_err(|e| e.for_profile(profile))
}
