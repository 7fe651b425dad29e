//! Clock-to-budget conversion (spec §4.11).
//!
//! The teacher's own `timer.rs` is a bare `{start, end}` pair built on `chrono::DateTime`
//! that nothing in the crate actually reads from; std's `Instant`/`Duration` say the same
//! thing without a dependency that does no real work here, so this module uses those
//! instead (see DESIGN.md).

use std::time::{Duration, Instant};

/// Reference divisor applied to remaining time when the opponent hasn't specified
/// `moves_left` until the next time control.
const DEFAULT_MOVES_DIVISOR: u32 = 40;

/// Subtracted from every computed budget to leave headroom for move output and GUI latency.
const SAFETY_MARGIN: Duration = Duration::from_millis(30);

/// Clock state handed to the driver at the start of a `go` command.
#[derive(Clone, Copy, Debug)]
pub enum ClockMode {
    /// A fixed amount of time to spend on this move alone.
    FixedPerMove(Duration),
    /// Tournament time control: remaining time plus optional increment and moves-left count.
    Tournament { remaining: Duration, increment: Duration, moves_left: Option<u32> },
    /// No time control at all; governed purely by depth/node limits.
    Infinite,
}

/// Converts nodes-per-second into a node budget instead of a wall-clock deadline, for
/// environments where elapsed-time measurement is unreliable (spec §4.11).
#[derive(Clone, Copy, Debug)]
pub struct NodesPerSecond(pub u64);

/// A resolved per-move budget: how long to search, and (if NPS-mode) how many nodes that
/// converts to.
#[derive(Clone, Copy, Debug)]
pub struct Budget {
    pub duration: Duration,
    pub node_limit: Option<u64>,
}

/// Computes the per-move time budget for `mode`, applying the 40-moves-left fallback
/// divisor and the safety margin. `nps`, if given, additionally yields a node-count cap
/// so callers that distrust wall-clock timing (e.g. under heavy system load) can bound the
/// search by node count instead.
pub fn budget_for(mode: ClockMode, nps: Option<NodesPerSecond>) -> Budget {
    let duration = match mode {
        ClockMode::FixedPerMove(d) => subtract_margin(d),
        ClockMode::Tournament { remaining, increment, moves_left } => {
            let base = match moves_left {
                Some(left) if left > 0 => remaining / left,
                _ => remaining / DEFAULT_MOVES_DIVISOR,
            };
            subtract_margin(base + increment)
        }
        // Large enough to never expire in practice; `Instant + Duration` panics on overflow,
        // so this stays well inside the range a monotonic clock can represent.
        ClockMode::Infinite => Duration::from_secs(60 * 60 * 24 * 365 * 10),
    };

    let node_limit = nps.map(|NodesPerSecond(rate)| {
        let millis = duration.as_millis() as u64;
        rate.saturating_mul(millis) / 1000
    });

    Budget { duration, node_limit }
}

fn subtract_margin(d: Duration) -> Duration {
    d.checked_sub(SAFETY_MARGIN).unwrap_or(Duration::from_millis(1))
}

/// Wall-clock deadline derived from a [`Budget`], checked by the driver alongside the
/// node-count checkpoints described in spec §5.
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn from_budget(budget: &Budget) -> Deadline {
        Deadline { at: Instant::now() + budget.duration }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_per_move_subtracts_safety_margin() {
        let budget = budget_for(ClockMode::FixedPerMove(Duration::from_millis(1000)), None);
        assert_eq!(budget.duration, Duration::from_millis(970));
    }

    #[test]
    fn tournament_mode_uses_moves_left_divisor() {
        let mode = ClockMode::Tournament {
            remaining: Duration::from_secs(60),
            increment: Duration::from_millis(0),
            moves_left: Some(20),
        };
        let budget = budget_for(mode, None);
        assert_eq!(budget.duration, Duration::from_millis(3000 - 30));
    }

    #[test]
    fn tournament_mode_falls_back_to_default_divisor() {
        let mode = ClockMode::Tournament { remaining: Duration::from_secs(40), increment: Duration::ZERO, moves_left: None };
        let budget = budget_for(mode, None);
        assert_eq!(budget.duration, Duration::from_secs(1) - Duration::from_millis(30));
    }

    #[test]
    fn nps_mode_converts_duration_to_node_limit() {
        let budget = budget_for(ClockMode::FixedPerMove(Duration::from_millis(1030)), Some(NodesPerSecond(1_000_000)));
        assert_eq!(budget.node_limit, Some(1_000_000));
    }

    #[test]
    fn deadline_expires_after_budget_elapses() {
        let budget = Budget { duration: Duration::from_millis(1), node_limit: None };
        let deadline = Deadline::from_budget(&budget);
        std::thread::sleep(Duration::from_millis(5));
        assert!(deadline.expired());
    }
}
