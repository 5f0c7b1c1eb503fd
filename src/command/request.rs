// Typed legacy requests and target selectors

use crate::command::{TranslatorError, TranslatorResult};
use crate::device::{InputIndex, SlotIndex, TargetKind};
use std::fmt;

static INPUTS: [InputIndex; 2] = InputIndex::ALL;

/// Which inputs of a slot a request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSelection {
    Both,
    One(InputIndex),
}

impl InputSelection {
    /// Addressed inputs in ascending order
    pub fn inputs(self) -> &'static [InputIndex] {
        match self {
            InputSelection::Both => &INPUTS,
            InputSelection::One(input) => {
                let i = input.get() as usize;
                &INPUTS[i..=i]
            }
        }
    }
}

/// Legacy `channel` field after parsing
///
/// Legacy clients send `"0"`/`0` for both inputs, `"1"`/`1` and `"2"`/`2` for
/// a single input, and `"master"` for the master stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelector {
    Master,
    Inputs(InputSelection),
}

impl ChannelSelector {
    pub fn from_number(channel: i64) -> Option<Self> {
        match channel {
            0 => Some(ChannelSelector::Inputs(InputSelection::Both)),
            1 => Some(ChannelSelector::Inputs(InputSelection::One(InputIndex::FIRST))),
            2 => Some(ChannelSelector::Inputs(InputSelection::One(InputIndex::SECOND))),
            _ => None,
        }
    }

    pub fn parse(channel: &str) -> Option<Self> {
        let channel = channel.trim();
        if channel.eq_ignore_ascii_case("master") {
            return Some(ChannelSelector::Master);
        }
        channel.parse().ok().and_then(Self::from_number)
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSelector::Master => write!(f, "master"),
            ChannelSelector::Inputs(InputSelection::Both) => write!(f, "0"),
            ChannelSelector::Inputs(InputSelection::One(input)) => write!(f, "{}", input.get() + 1),
        }
    }
}

/// Resolved destination of a mute or gain request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Master,
    Inputs {
        slot: SlotIndex,
        selection: InputSelection,
    },
}

impl Target {
    /// Combine the legacy slot number with a channel selector
    ///
    /// `master` is only valid on slot 0; input channels need a slot in `1..=4`.
    pub fn resolve(slot: i64, channel: ChannelSelector) -> TranslatorResult<Self> {
        match channel {
            ChannelSelector::Master if slot == 0 => Ok(Target::Master),
            ChannelSelector::Master => Err(TranslatorError::UnsupportedTarget { slot, channel }),
            ChannelSelector::Inputs(selection) => Ok(Target::Inputs {
                slot: slot_index(slot)?,
                selection,
            }),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Master => TargetKind::Master,
            Target::Inputs { .. } => TargetKind::Input,
        }
    }
}

/// Validate a legacy slot number that must name a real slot
pub fn slot_index(slot: i64) -> TranslatorResult<SlotIndex> {
    SlotIndex::new(slot).ok_or(TranslatorError::InvalidSlot(slot))
}

/// One legacy `PUT /device/{slot}` request
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyRequest {
    Mute {
        slot: i64,
        channel: ChannelSelector,
        on: bool,
    },
    Gain {
        slot: i64,
        channel: ChannelSelector,
        value: f64,
    },
    Activate {
        slot: i64,
    },
    Load {
        slot: i64,
        preset_id: String,
    },
}

impl LegacyRequest {
    /// Verb as used in the legacy payload
    pub fn verb(&self) -> &'static str {
        match self {
            LegacyRequest::Mute { .. } => "mute",
            LegacyRequest::Gain { .. } => "gain",
            LegacyRequest::Activate { .. } => "activate",
            LegacyRequest::Load { .. } => "load",
        }
    }

    pub fn slot(&self) -> i64 {
        match self {
            LegacyRequest::Mute { slot, .. }
            | LegacyRequest::Gain { slot, .. }
            | LegacyRequest::Activate { slot }
            | LegacyRequest::Load { slot, .. } => *slot,
        }
    }
}
