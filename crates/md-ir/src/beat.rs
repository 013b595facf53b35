//! Note durations measured in quarter notes.

use core::cmp::Ordering;
use core::ops::Add;

use crate::error::{IrError, Result};

/// An immutable duration expressed in quarter notes.
///
/// Ordering and equality compare the quarter-note value only; the slur
/// flag is a performance hint carried alongside the duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Beat {
    num_quarters: f64,
    slurred: bool,
}

impl Beat {
    pub const WHOLE: Beat = Beat::from_quarters_unchecked(4.0);
    pub const HALF: Beat = Beat::from_quarters_unchecked(2.0);
    pub const QUARTER: Beat = Beat::from_quarters_unchecked(1.0);
    pub const EIGHTH: Beat = Beat::from_quarters_unchecked(0.5);
    pub const SIXTEENTH: Beat = Beat::from_quarters_unchecked(0.25);
    pub const THIRTY_SECOND: Beat = Beat::from_quarters_unchecked(0.125);

    const fn from_quarters_unchecked(num_quarters: f64) -> Self {
        Self {
            num_quarters,
            slurred: false,
        }
    }

    /// Create a beat lasting `num_quarters` quarter notes.
    pub fn new(num_quarters: f64) -> Result<Self> {
        if !(num_quarters >= 0.0) {
            return Err(IrError::NegativeBeat(num_quarters));
        }
        Ok(Self::from_quarters_unchecked(num_quarters))
    }

    pub fn num_quarters(&self) -> f64 {
        self.num_quarters
    }

    pub fn is_slurred(&self) -> bool {
        self.slurred
    }

    /// Extend the duration by `dots` dots: each dot adds half of the
    /// previous addition (q, q/2, q/4, ...).
    pub fn dot(self, dots: u32) -> Self {
        let mut added = self.num_quarters;
        let mut total = self.num_quarters;
        for _ in 0..dots {
            added /= 2.0;
            total += added;
        }
        Self {
            num_quarters: total,
            ..self
        }
    }

    /// Scale for a tuplet: `numerator` notes in the space of `denominator`.
    ///
    /// A triplet eighth is `Beat::EIGHTH.tuplet(3, 2)`.
    pub fn tuplet(self, numerator: u32, denominator: u32) -> Result<Self> {
        if numerator <= 1 || denominator == 0 {
            return Err(IrError::InvalidTuplet {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            num_quarters: self.num_quarters * denominator as f64 / numerator as f64,
            ..self
        })
    }

    pub fn with_slur(self, slurred: bool) -> Self {
        Self { slurred, ..self }
    }

    pub fn toggle_slur(self) -> Self {
        self.with_slur(!self.slurred)
    }
}

impl Add for Beat {
    type Output = Beat;

    /// The sum keeps the slur flag of the left-hand side.
    fn add(self, rhs: Beat) -> Beat {
        Beat {
            num_quarters: self.num_quarters + rhs.num_quarters,
            slurred: self.slurred,
        }
    }
}

impl PartialEq for Beat {
    fn eq(&self, other: &Self) -> bool {
        self.num_quarters == other.num_quarters
    }
}

impl PartialOrd for Beat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.num_quarters.partial_cmp(&other.num_quarters)
    }
}
