//! Shared helpers for command handlers.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use solarboard_core::Console;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Fail fast when there is no stored session; every resource endpoint
/// needs a bearer token.
pub fn require_login(console: &Console) -> Result<(), CliError> {
    if console.is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn {
            profile: String::new(),
        })
    }
}

/// Status line on stderr unless `--quiet`.
pub fn status(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

/// Spinner on stderr for slow calls (uploads). Hidden in quiet mode.
pub fn spinner(global: &GlobalOpts, message: &str) -> ProgressBar {
    if global.quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Turn an empty `Option<Vec<_>>` from a comma-list flag into `None`.
pub fn non_empty_list(list: Option<Vec<String>>) -> Option<Vec<String>> {
    list.map(|items| {
        items
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
    })
    .filter(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_service_entries_are_dropped() {
        assert_eq!(
            non_empty_list(Some(vec![" Installation ".into(), String::new()])),
            Some(vec!["Installation".to_owned()])
        );
        assert_eq!(non_empty_list(Some(vec![" ".into()])), None);
        assert_eq!(non_empty_list(None), None);
    }
}
