// src/sync/status.rs
// The sync status shown on the indicator and the rules deriving it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyncState {
    /// Syncthing is not reachable
    Down,
    /// Syncthing or rsync are actively transferring
    Syncing,
    /// Syncthing is complete and rsync is not running
    Done,
    /// Syncthing is incomplete but nothing is moving
    Idle,
    /// Syncthing reported errors since boot
    Error,
}

impl SyncState {
    pub const ALL: [SyncState; 5] = [
        SyncState::Down,
        SyncState::Syncing,
        SyncState::Done,
        SyncState::Idle,
        SyncState::Error,
    ];
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Down => "down",
            SyncState::Syncing => "syncing",
            SyncState::Done => "done",
            SyncState::Idle => "idle",
            SyncState::Error => "error",
        };
        f.write_str(name)
    }
}

/// One poll cycle's worth of observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSignals {
    pub daemon_reachable: bool,
    /// Only meaningful when the daemon is reachable.
    pub completion_percent: f64,
    pub errors_since_boot: bool,
    pub copy_process_running: bool,
    /// Last counter sample taken by the activity detector. Counters are only
    /// sampled while the daemon is incomplete, so this can be from an earlier cycle.
    pub bytes_transferred: u64,
}

impl RawSignals {
    pub fn unreachable() -> Self {
        Self {
            daemon_reachable: false,
            completion_percent: 0.0,
            errors_since_boot: false,
            copy_process_running: false,
            bytes_transferred: 0,
        }
    }
}

/// Derive the status from one cycle's signals. First matching rule wins.
pub fn classify(signals: &RawSignals, transfer_active: bool) -> SyncState {
    if !signals.daemon_reachable {
        return SyncState::Down;
    }
    if signals.errors_since_boot {
        return SyncState::Error;
    }

    let incomplete = signals.completion_percent < 100.0;
    let syncing = (incomplete && transfer_active) || signals.copy_process_running;

    if syncing {
        SyncState::Syncing
    } else if incomplete {
        SyncState::Idle
    } else {
        SyncState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reachable(completion: f64) -> RawSignals {
        RawSignals {
            daemon_reachable: true,
            completion_percent: completion,
            errors_since_boot: false,
            copy_process_running: false,
            bytes_transferred: 0,
        }
    }

    #[test]
    fn unreachable_always_down() {
        for errors in [false, true] {
            for copy in [false, true] {
                for active in [false, true] {
                    let signals = RawSignals {
                        daemon_reachable: false,
                        completion_percent: 100.0,
                        errors_since_boot: errors,
                        copy_process_running: copy,
                        bytes_transferred: 42,
                    };
                    assert_eq!(classify(&signals, active), SyncState::Down);
                }
            }
        }
    }

    #[test]
    fn errors_override_activity_and_completion() {
        for completion in [0.0, 50.0, 100.0] {
            let signals = RawSignals {
                errors_since_boot: true,
                copy_process_running: true,
                ..reachable(completion)
            };
            assert_eq!(classify(&signals, true), SyncState::Error);
            assert_eq!(classify(&signals, false), SyncState::Error);
        }
    }

    #[test]
    fn complete_and_quiet_is_done() {
        assert_eq!(classify(&reachable(100.0), false), SyncState::Done);
    }

    #[test]
    fn transfer_activity_ignored_when_complete() {
        assert_eq!(classify(&reachable(100.0), true), SyncState::Done);
    }

    #[test]
    fn copy_process_dominates_idle() {
        let signals = RawSignals {
            copy_process_running: true,
            ..reachable(50.0)
        };
        assert_eq!(classify(&signals, false), SyncState::Syncing);
    }

    #[test]
    fn copy_process_dominates_done() {
        let signals = RawSignals {
            copy_process_running: true,
            ..reachable(100.0)
        };
        assert_eq!(classify(&signals, false), SyncState::Syncing);
    }

    #[test]
    fn incomplete_and_quiet_is_idle() {
        assert_eq!(classify(&reachable(50.0), false), SyncState::Idle);
    }

    #[test]
    fn incomplete_and_active_is_syncing() {
        assert_eq!(classify(&reachable(99.9), true), SyncState::Syncing);
    }
}
