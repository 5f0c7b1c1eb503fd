// Device state mirror
//
// - state: DeviceModel, the single source of truth for reads
// - validation: gain range checks per target kind
// - snapshot: legacy JSON view of the model

pub mod snapshot;
pub mod state;
pub mod validation;

pub use snapshot::{DeviceSnapshot, SlotSnapshot, render};
pub use state::{
    ChannelState, DeviceModel, EMPTY_PRESET, INPUT_COUNT, InputIndex, MasterState, PEQ_BAND_COUNT,
    SLOT_COUNT, Slot, SlotIndex,
};
pub use validation::{TargetKind, validate};
