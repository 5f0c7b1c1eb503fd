// DeviceModel - Authoritative in-process mirror of the DSP unit
//
// Reads never query the hardware: every accepted legacy request updates this
// model after its command batch has been delivered, and every response is
// rendered from it.

/// Number of configuration slots on the unit
pub const SLOT_COUNT: usize = 4;

/// Number of input channels per slot
pub const INPUT_COUNT: usize = 2;

/// Parametric EQ bands per input channel (device-fixed capacity)
pub const PEQ_BAND_COUNT: usize = 10;

/// Label reported for a slot that never had a preset loaded
pub const EMPTY_PRESET: &str = "Empty";

/// A slot index in `1..=4`, guaranteed valid by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Build a slot index from a legacy slot number, `None` outside `1..=4`
    pub fn new(index: i64) -> Option<Self> {
        if (1..=SLOT_COUNT as i64).contains(&index) {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// One-based index as seen by legacy clients
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index as used by the device protocol
    pub fn device_index(self) -> u8 {
        self.0 - 1
    }

    /// Iterate all slot indices in ascending order
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (1..=SLOT_COUNT as u8).map(SlotIndex)
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An input channel index in `0..2` (device numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputIndex(u8);

impl InputIndex {
    pub const FIRST: InputIndex = InputIndex(0);
    pub const SECOND: InputIndex = InputIndex(1);

    /// Both inputs in ascending order
    pub const ALL: [InputIndex; INPUT_COUNT] = [Self::FIRST, Self::SECOND];

    /// Zero-based index as used by the device protocol
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Global post-slot mute/volume stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterState {
    pub muted: bool,
    /// Master volume in dB, always within `[-127.0, 0.0]`
    pub volume_db: f64,
}

impl Default for MasterState {
    fn default() -> Self {
        Self {
            muted: false,
            volume_db: 0.0,
        }
    }
}

/// Gain and mute of one input channel within a slot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelState {
    /// Input gain in dB, always within `[-72.0, 12.0]`
    pub gain_db: f64,
    pub muted: bool,
}

/// One of the four configuration slots
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub index: SlotIndex,
    pub active: bool,
    pub inputs: [ChannelState; INPUT_COUNT],
    /// Title of the last preset loaded onto this slot
    pub last_preset: String,
    pub can_activate: bool,
}

impl Slot {
    fn new(index: SlotIndex) -> Self {
        Self {
            index,
            active: false,
            inputs: [ChannelState::default(); INPUT_COUNT],
            last_preset: EMPTY_PRESET.to_string(),
            can_activate: true,
        }
    }

    pub fn input(&self, input: InputIndex) -> &ChannelState {
        &self.inputs[input.get() as usize]
    }

    pub fn input_mut(&mut self, input: InputIndex) -> &mut ChannelState {
        &mut self.inputs[input.get() as usize]
    }
}

/// In-memory model of master and per-slot state
///
/// Exactly one slot is active at any time. The only way to change which slot
/// is active is [`DeviceModel::activate`], which keeps that invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceModel {
    pub master: MasterState,
    slots: [Slot; SLOT_COUNT],
}

impl DeviceModel {
    /// Create the start-up model: master unmuted at 0 dB, slot 1 active, all slots empty
    pub fn new() -> Self {
        let mut slots = [1, 2, 3, 4].map(|i| Slot::new(SlotIndex(i)));
        slots[0].active = true;
        Self {
            master: MasterState::default(),
            slots,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> &Slot {
        &self.slots[index.device_index() as usize]
    }

    pub fn slot_mut(&mut self, index: SlotIndex) -> &mut Slot {
        &mut self.slots[index.device_index() as usize]
    }

    /// The currently active slot
    pub fn active_slot(&self) -> SlotIndex {
        self.slots
            .iter()
            .find(|s| s.active)
            .map(|s| s.index)
            .unwrap_or(SlotIndex(1))
    }

    /// Make `index` the single active slot
    pub fn activate(&mut self, index: SlotIndex) {
        for slot in self.slots.iter_mut() {
            slot.active = slot.index == index;
        }
    }
}

impl Default for DeviceModel {
    fn default() -> Self {
        Self::new()
    }
}
