//! Shared helpers for command handlers.

use std::io::IsTerminal;

use lmate_core::Source;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Under `--strict`, refuse output that contains synthesized data.
pub fn require_live<S: AsRef<str>>(global: &GlobalOpts, mocked: &[S]) -> Result<(), CliError> {
    if !global.strict || mocked.is_empty() {
        return Ok(());
    }
    Err(CliError::MockFallback {
        groups: mocked
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Single-value form of [`require_live`] for operation acks.
pub fn require_live_source(
    global: &GlobalOpts,
    operation: &str,
    source: Source,
) -> Result<(), CliError> {
    if source == Source::Mock {
        require_live(global, &[operation])
    } else {
        Ok(())
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin there is nobody to ask, so the action is
/// refused unless `--yes` was given.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["lmate"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::parse_from(argv).global
    }

    #[test]
    fn strict_rejects_any_mocked_group() {
        let strict = global(&["--strict"]);
        assert!(require_live::<&str>(&strict, &[]).is_ok());
        let err = require_live(&strict, &["dhcp", "listing"]).unwrap_err();
        assert!(matches!(err, CliError::MockFallback { ref groups } if groups == "dhcp, listing"));
        assert!(require_live_source(&strict, "factory reset", Source::Live).is_ok());
        assert!(require_live_source(&strict, "factory reset", Source::Mock).is_err());
    }

    #[test]
    fn lenient_mode_accepts_mock_data() {
        let lenient = global(&[]);
        assert!(require_live(&lenient, &["dhcp"]).is_ok());
        assert!(require_live_source(&lenient, "history", Source::Mock).is_ok());
    }
}
