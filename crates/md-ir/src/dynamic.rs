//! Dynamics (note velocities) and gradual dynamic ramps.

use core::fmt;

use crate::beat::Beat;
use crate::error::{IrError, Result};

/// A velocity level controlling how loud notes are struck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dynamic(u8);

impl Dynamic {
    pub const PPPP: Dynamic = Dynamic(8);
    pub const PPP: Dynamic = Dynamic(20);
    pub const PP: Dynamic = Dynamic(31);
    pub const P: Dynamic = Dynamic(42);
    pub const MP: Dynamic = Dynamic(53);
    pub const MF: Dynamic = Dynamic(64);
    pub const F: Dynamic = Dynamic(80);
    pub const FF: Dynamic = Dynamic(96);
    pub const FFF: Dynamic = Dynamic(112);
    pub const FFFF: Dynamic = Dynamic(127);

    const NAMED: [(&'static str, Dynamic); 10] = [
        ("pppp", Self::PPPP),
        ("ppp", Self::PPP),
        ("pp", Self::PP),
        ("p", Self::P),
        ("mp", Self::MP),
        ("mf", Self::MF),
        ("f", Self::F),
        ("ff", Self::FF),
        ("fff", Self::FFF),
        ("ffff", Self::FFFF),
    ];

    /// A dynamic with an explicit velocity (0-127).
    pub fn from_velocity(velocity: u8) -> Result<Dynamic> {
        if velocity > 127 {
            return Err(IrError::InvalidData {
                what: "velocity",
                value: velocity as i32,
            });
        }
        Ok(Dynamic(velocity))
    }

    /// Look up a named dynamic such as `mf` or `ppp`.
    pub fn named(name: &str) -> Option<Dynamic> {
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| *d)
    }

    pub fn velocity(self) -> u8 {
        self.0
    }

    /// Velocity raised by `delta`, clamped into 0..=127.
    pub fn louder(self, delta: i32) -> u8 {
        (self.0 as i32 + delta).clamp(0, 127) as u8
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Self::MF
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::NAMED.iter().find(|(_, d)| d == self) {
            Some((name, _)) => write!(f, "{}", name),
            None => write!(f, "v{}", self.0),
        }
    }
}

/// Direction of a gradual dynamic change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RampKind {
    Crescendo,
    Decrescendo,
}

impl fmt::Display for RampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RampKind::Crescendo => write!(f, "crescendo"),
            RampKind::Decrescendo => write!(f, "decrescendo"),
        }
    }
}

/// A linear velocity ramp from `start` to `end` over `duration`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradualDynamic {
    kind: RampKind,
    start: Dynamic,
    end: Dynamic,
    duration: Beat,
}

impl GradualDynamic {
    /// Fails when a crescendo ends softer than it starts, or a
    /// decrescendo ends louder.
    pub fn new(kind: RampKind, start: Dynamic, end: Dynamic, duration: Beat) -> Result<Self> {
        let wrong_way = match kind {
            RampKind::Crescendo => end < start,
            RampKind::Decrescendo => end > start,
        };
        if wrong_way {
            return Err(IrError::InvalidRamp {
                kind,
                start: start.velocity(),
                end: end.velocity(),
            });
        }
        Ok(Self {
            kind,
            start,
            end,
            duration,
        })
    }

    pub fn crescendo(start: Dynamic, end: Dynamic, duration: Beat) -> Result<Self> {
        Self::new(RampKind::Crescendo, start, end, duration)
    }

    pub fn decrescendo(start: Dynamic, end: Dynamic, duration: Beat) -> Result<Self> {
        Self::new(RampKind::Decrescendo, start, end, duration)
    }

    pub fn kind(&self) -> RampKind {
        self.kind
    }

    pub fn start(&self) -> Dynamic {
        self.start
    }

    pub fn end(&self) -> Dynamic {
        self.end
    }

    pub fn duration(&self) -> Beat {
        self.duration
    }

    /// The `(tick offset, velocity)` steps of the ramp over `total_ticks`.
    ///
    /// One step per unit of velocity change; the last step lands exactly
    /// on `end` at `total_ticks`.
    pub fn steps(&self, total_ticks: u64) -> alloc::vec::Vec<(u64, u8)> {
        let start = self.start.velocity() as f64;
        let delta = self.end.velocity() as i32 - self.start.velocity() as i32;
        let mut steps = alloc::vec::Vec::new();
        if delta != 0 && total_ticks > 0 {
            let slope = delta as f64 / total_ticks as f64;
            let interval = total_ticks as f64 / delta.unsigned_abs() as f64;
            let mut t = 0.0;
            while t < total_ticks as f64 {
                let tick = libm::round(t) as u64;
                let velocity = libm::round(slope * tick as f64 + start).clamp(0.0, 127.0) as u8;
                if steps.last().map(|&(_, v)| v) != Some(velocity) {
                    steps.push((tick, velocity));
                }
                t += interval;
            }
        }
        steps.push((total_ticks, self.end.velocity()));
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup() {
        assert_eq!(Dynamic::named("mf"), Some(Dynamic::MF));
        assert_eq!(Dynamic::MF.velocity(), 64);
        assert_eq!(Dynamic::named("mff"), None);
        assert_eq!(alloc::format!("{}", Dynamic::FF), "ff");
    }

    #[test]
    fn louder_clamps() {
        assert_eq!(Dynamic::FFF.louder(40), 127);
        assert_eq!(Dynamic::PPPP.louder(-40), 0);
        assert_eq!(Dynamic::MF.louder(16), 80);
    }

    #[test]
    fn crescendo_must_not_get_softer() {
        let err = GradualDynamic::crescendo(Dynamic::F, Dynamic::P, Beat::WHOLE).unwrap_err();
        assert_eq!(
            err,
            IrError::InvalidRamp { kind: RampKind::Crescendo, start: 80, end: 42 }
        );
        assert!(GradualDynamic::decrescendo(Dynamic::P, Dynamic::F, Beat::WHOLE).is_err());
        assert!(GradualDynamic::crescendo(Dynamic::P, Dynamic::P, Beat::WHOLE).is_ok());
    }

    #[test]
    fn crescendo_steps_are_monotonic() {
        let start = Dynamic::from_velocity(40).unwrap();
        let end = Dynamic::from_velocity(100).unwrap();
        let ramp = GradualDynamic::crescendo(start, end, Beat::QUARTER).unwrap();
        let steps = ramp.steps(960);
        assert_eq!(steps.first(), Some(&(0, 40)));
        assert_eq!(steps.last(), Some(&(960, 100)));
        assert!(steps.windows(2).all(|w| w[0].1 <= w[1].1 && w[0].0 <= w[1].0));
    }

    #[test]
    fn decrescendo_steps_fall() {
        let ramp = GradualDynamic::decrescendo(Dynamic::FF, Dynamic::PP, Beat::HALF).unwrap();
        let steps = ramp.steps(1920);
        assert_eq!(steps[0].1, 96);
        assert_eq!(steps.last().unwrap().1, 31);
        assert!(steps.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
