//! Scheduling directives attached to blocks.
//!
//! The block scheduler decides when a block starts and whether it
//! repeats; this module only carries the policy and the tick math.

use crate::beat::Beat;
use crate::timing::TimingEnvironment;

/// Where a block's start snaps to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Start wherever the clock is.
    #[default]
    Immediate,
    /// Next beat unit of the time signature.
    Beat,
    /// Next measure boundary.
    Measure,
}

/// How often a block replays and whether a new trigger cuts it short.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RepeatPolicy {
    /// `None` repeats until interrupted.
    pub count: Option<u32>,
    pub interruptible: bool,
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self {
            count: Some(1),
            interruptible: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SchedulerDirective {
    /// Snap to the next multiple of this grid.
    pub quantize: Option<Beat>,
    pub align: Alignment,
    pub repeat: RepeatPolicy,
}

impl SchedulerDirective {
    pub fn quantized(grid: Beat) -> Self {
        Self {
            quantize: Some(grid),
            ..Self::default()
        }
    }

    pub fn aligned(align: Alignment) -> Self {
        Self {
            align,
            ..Self::default()
        }
    }

    /// The earliest tick at or after `now` satisfying both the quantize
    /// grid and the alignment.
    pub fn aligned_tick(&self, now: u64, timing: &TimingEnvironment) -> u64 {
        let grid = self.quantize.map_or(0, |g| timing.ticks_in_beat(g));
        let unit = match self.align {
            Alignment::Immediate => 0,
            Alignment::Beat => timing.ppqn() as u64 * 4 / timing.denominator() as u64,
            Alignment::Measure => timing.ticks_per_measure(),
        };
        round_up(now, lcm(grid, unit))
    }
}

/// Round `tick` up to a multiple of `unit`; a zero unit means no grid.
fn round_up(tick: u64, unit: u64) -> u64 {
    if unit == 0 {
        tick
    } else {
        tick.div_ceil(unit) * unit
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Least common multiple, treating zero as "no constraint".
fn lcm(a: u64, b: u64) -> u64 {
    match (a, b) {
        (0, x) | (x, 0) => x,
        _ => a / gcd(a, b) * b,
    }
}
