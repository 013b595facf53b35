//! Crescendo and decrescendo as scheduled dynamic changes.

use md_ir::{Dynamic, GradualDynamic};
use tracing::trace;

use crate::action_queue::Action;
use crate::channel::MidiChannel;
use crate::error::Result;

/// Set the ramp's start dynamic now and schedule one dynamic change per
/// unit of velocity until the end dynamic lands at the end of the ramp.
///
/// The clock does not move; later notes pick the steps up as they fall due.
pub fn apply_gradual_dynamic(channel: &mut MidiChannel, ramp: &GradualDynamic) -> Result<()> {
    let total = channel.timing().ticks_in_beat(ramp.duration());
    channel.set_dynamic(ramp.start());
    let steps = ramp.steps(total);
    trace!(
        channel = channel.channel(),
        kind = %ramp.kind(),
        total,
        steps = steps.len(),
        "gradual dynamic"
    );
    for (tick, velocity) in steps {
        channel.do_later(tick as i64, Action::SetDynamic(Dynamic::from_velocity(velocity)?));
    }
    Ok(())
}
