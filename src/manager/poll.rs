use std::thread;

use log::{debug, warn};

use crate::config::PollConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    Ended { cycles: u64 },
    /// The budget ran out without the check ever passing. Callers carry on
    /// regardless.
    Exhausted { cycles: u64 },
}

impl PollOutcome {
    pub fn cycles(&self) -> u64 {
        match self {
            PollOutcome::Ended { cycles } | PollOutcome::Exhausted { cycles } => *cycles,
        }
    }
}

/// Sleeps one interval, then runs `check`, until it passes or the cycle
/// budget is spent. Errors from `check` end the poll immediately.
pub fn poll_until<F>(config: PollConfig, mut check: F) -> Result<PollOutcome>
where
    F: FnMut() -> Result<bool>,
{
    let max_cycles = config.max_cycles();
    for cycle in 1..=max_cycles {
        thread::sleep(config.interval());
        if check()? {
            debug!("Poll finished after {} cycle(s).", cycle);
            return Ok(PollOutcome::Ended { cycles: cycle });
        }
    }
    warn!(
        "Poll gave up after {} cycle(s) ({} ms).",
        max_cycles, config.max_wait_ms
    );
    Ok(PollOutcome::Exhausted { cycles: max_cycles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    fn fast() -> PollConfig {
        PollConfig {
            interval_ms: 1,
            max_wait_ms: 6,
        }
    }

    #[test]
    fn stops_as_soon_as_check_passes() {
        let mut checks = 0;
        let outcome = poll_until(fast(), || {
            checks += 1;
            Ok(checks == 2)
        })
        .unwrap();
        assert_eq!(outcome, PollOutcome::Ended { cycles: 2 });
        assert_eq!(checks, 2);
    }

    #[test]
    fn exhausted_budget_is_not_an_error() {
        let mut checks = 0;
        let outcome = poll_until(fast(), || {
            checks += 1;
            Ok(false)
        })
        .unwrap();
        assert_eq!(outcome.cycles(), 6);
        assert_eq!(checks, 6);
    }

    #[test]
    fn check_error_propagates() {
        let result = poll_until(fast(), || Err(HarnessError::ShellExited));
        assert!(matches!(result, Err(HarnessError::ShellExited)));
    }
}
