// Low-level device protocol
//
// Closed set of commands the unit understands. Business logic works on these
// variants only; the text form is produced once, when a batch is handed to a
// sink.

use crate::catalogue::FilterBand;
use crate::device::{DeviceModel, InputIndex, SlotIndex};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceCommand {
    /// Switch the unit to a configuration slot, making it active
    SelectSlot(SlotIndex),
    SetMasterMute(bool),
    SetMasterGain(f64),
    /// Mute an input of the active slot
    SetMute { input: InputIndex, muted: bool },
    /// Set the gain of an input of the active slot
    SetGain { input: InputIndex, gain_db: f64 },
    SetPeqCoefficients {
        input: InputIndex,
        band: usize,
        coefficients: FilterBand,
    },
    SetPeqBypass {
        input: InputIndex,
        band: usize,
        bypass: bool,
    },
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::SelectSlot(slot) => write!(f, "config {}", slot.device_index()),
            DeviceCommand::SetMasterMute(muted) => write!(f, "mute {}", on_off(*muted)),
            DeviceCommand::SetMasterGain(gain_db) => write!(f, "gain -- {:.2}", gain_db),
            DeviceCommand::SetMute { input, muted } => {
                write!(f, "input {} mute {}", input.get(), on_off(*muted))
            }
            DeviceCommand::SetGain { input, gain_db } => {
                write!(f, "input {} gain -- {:.2}", input.get(), gain_db)
            }
            DeviceCommand::SetPeqCoefficients {
                input,
                band,
                coefficients,
            } => {
                write!(f, "input {} peq {} set --", input.get(), band)?;
                // Debug keeps the shortest round-trip form and a trailing ".0"
                for c in coefficients.coefficients() {
                    write!(f, " {:?}", c)?;
                }
                Ok(())
            }
            DeviceCommand::SetPeqBypass {
                input,
                band,
                bypass,
            } => write!(f, "input {} peq {} bypass {}", input.get(), band, on_off(*bypass)),
        }
    }
}

impl DeviceCommand {
    /// Mirror the effect of this command on the model
    ///
    /// Input commands act on whichever slot is active, exactly as on the unit.
    /// PEQ state is write-only and not mirrored.
    pub fn apply_to(&self, model: &mut DeviceModel) {
        match *self {
            DeviceCommand::SelectSlot(slot) => model.activate(slot),
            DeviceCommand::SetMasterMute(muted) => model.master.muted = muted,
            DeviceCommand::SetMasterGain(gain_db) => model.master.volume_db = gain_db,
            DeviceCommand::SetMute { input, muted } => {
                let active = model.active_slot();
                model.slot_mut(active).input_mut(input).muted = muted;
            }
            DeviceCommand::SetGain { input, gain_db } => {
                let active = model.active_slot();
                model.slot_mut(active).input_mut(input).gain_db = gain_db;
            }
            DeviceCommand::SetPeqCoefficients { .. } | DeviceCommand::SetPeqBypass { .. } => {}
        }
    }
}
