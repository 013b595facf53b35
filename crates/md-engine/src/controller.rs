//! Continuous controllers: knobs hold a value, pedals are up or down.

/// CC 64, the damper pedal.
pub const SUSTAIN_PEDAL_CC: u8 = 64;
/// CC 120, silences the channel immediately.
pub const ALL_SOUNDS_OFF_CC: u8 = 120;

/// Controller numbers that behave as on/off pedals.
const PEDAL_RANGE: core::ops::RangeInclusive<u8> = 64..=69;

/// Value a knob is assumed to hold before anything sets it.
const KNOB_DEFAULT: u8 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Knob {
    pub controller: u8,
    pub value: Option<u8>,
}

impl Knob {
    /// Current value, falling back to the midpoint if never twisted.
    pub fn value_or_default(&self) -> u8 {
        self.value.unwrap_or(KNOB_DEFAULT)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pedal {
    pub controller: u8,
    pub down: bool,
}

/// A controller the channel has seen, memoized by number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Controller {
    Knob(Knob),
    Pedal(Pedal),
}

impl Controller {
    /// Pedals for 64..=69, knobs for everything else.
    pub fn for_number(controller: u8) -> Self {
        if PEDAL_RANGE.contains(&controller) {
            Controller::Pedal(Pedal { controller, down: false })
        } else {
            Controller::Knob(Knob { controller, value: None })
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Controller::Knob(k) => k.controller,
            Controller::Pedal(p) => p.controller,
        }
    }

    /// Record a raw CC value. Pedals treat 64 and above as down.
    pub fn set(&mut self, value: u8) {
        match self {
            Controller::Knob(k) => k.value = Some(value),
            Controller::Pedal(p) => p.down = value >= 64,
        }
    }

    /// The CC value that reproduces the current state.
    pub fn value(&self) -> u8 {
        match self {
            Controller::Knob(k) => k.value_or_default(),
            Controller::Pedal(p) => {
                if p.down {
                    127
                } else {
                    0
                }
            }
        }
    }
}
