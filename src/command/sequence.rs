// Command sequence builders
//
// Slot selection always comes first in any slot-scoped sequence: input
// commands act on whatever slot is active on the unit.

use crate::catalogue::PresetEntry;
use crate::command::protocol::DeviceCommand;
use crate::command::request::Target;
use crate::device::{INPUT_COUNT, InputIndex, PEQ_BAND_COUNT, SlotIndex};

/// Longest batch any legacy request produces (a load using every band)
pub const MAX_BATCH_LEN: usize = 1 + INPUT_COUNT * 2 * PEQ_BAND_COUNT;

pub fn activate(slot: SlotIndex) -> Vec<DeviceCommand> {
    vec![DeviceCommand::SelectSlot(slot)]
}

pub fn mute(target: Target, muted: bool) -> Vec<DeviceCommand> {
    match target {
        Target::Master => vec![DeviceCommand::SetMasterMute(muted)],
        Target::Inputs { slot, selection } => {
            let mut commands = activate(slot);
            commands.extend(
                selection
                    .inputs()
                    .iter()
                    .map(|&input| DeviceCommand::SetMute { input, muted }),
            );
            commands
        }
    }
}

pub fn gain(target: Target, gain_db: f64) -> Vec<DeviceCommand> {
    match target {
        Target::Master => vec![DeviceCommand::SetMasterGain(gain_db)],
        Target::Inputs { slot, selection } => {
            let mut commands = activate(slot);
            commands.extend(
                selection
                    .inputs()
                    .iter()
                    .map(|&input| DeviceCommand::SetGain { input, gain_db }),
            );
            commands
        }
    }
}

/// Program a preset onto both inputs of a slot
///
/// Each input gets its bands written and enabled in band order, then every
/// remaining band up to the device capacity is bypassed. The caller must have
/// checked that no input has more than `PEQ_BAND_COUNT` bands.
pub fn load(slot: SlotIndex, preset: &PresetEntry) -> Vec<DeviceCommand> {
    let mut commands = Vec::with_capacity(MAX_BATCH_LEN);
    commands.push(DeviceCommand::SelectSlot(slot));

    for input in InputIndex::ALL {
        let bands = preset.bands_for(input);
        for (band, coefficients) in bands.iter().take(PEQ_BAND_COUNT).enumerate() {
            commands.push(DeviceCommand::SetPeqCoefficients {
                input,
                band,
                coefficients: *coefficients,
            });
            commands.push(DeviceCommand::SetPeqBypass {
                input,
                band,
                bypass: false,
            });
        }
        for band in bands.len().min(PEQ_BAND_COUNT)..PEQ_BAND_COUNT {
            commands.push(DeviceCommand::SetPeqBypass {
                input,
                band,
                bypass: true,
            });
        }
    }

    commands
}
