// Snapshot rendering of the device model for legacy clients

use crate::device::state::{DeviceModel, InputIndex, Slot};
use serde::Serialize;

/// Legacy view of a single slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSnapshot {
    /// Slot index rendered as a string ("1".."4")
    pub id: String,
    pub active: bool,
    pub gain1: f64,
    pub gain2: f64,
    pub mute1: bool,
    pub mute2: bool,
    pub last: String,
    pub can_activate: bool,
}

/// Legacy view of the whole device
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub mute: bool,
    pub master_volume: f64,
    pub slots: Vec<SlotSnapshot>,
}

impl From<&Slot> for SlotSnapshot {
    fn from(slot: &Slot) -> Self {
        let first = slot.input(InputIndex::FIRST);
        let second = slot.input(InputIndex::SECOND);
        Self {
            id: slot.index.to_string(),
            active: slot.active,
            gain1: first.gain_db,
            gain2: second.gain_db,
            mute1: first.muted,
            mute2: second.muted,
            last: slot.last_preset.clone(),
            can_activate: slot.can_activate,
        }
    }
}

/// Render the model as it is right now
pub fn render(model: &DeviceModel) -> DeviceSnapshot {
    DeviceSnapshot {
        mute: model.master.muted,
        master_volume: model.master.volume_db,
        slots: model.slots().iter().map(SlotSnapshot::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::state::SlotIndex;

    #[test]
    fn test_render_default_model() {
        let snapshot = render(&DeviceModel::new());

        assert!(!snapshot.mute);
        assert_eq!(snapshot.master_volume, 0.0);
        assert_eq!(snapshot.slots.len(), 4);
        for (i, slot) in snapshot.slots.iter().enumerate() {
            assert_eq!(slot.id, (i + 1).to_string());
            assert_eq!(slot.active, i == 0);
            assert_eq!(slot.last, "Empty");
            assert!(slot.can_activate);
        }
    }

    #[test]
    fn test_render_reflects_mutations() {
        let mut model = DeviceModel::new();
        let third = SlotIndex::new(3).unwrap();
        model.master.volume_db = -10.2;
        model.activate(third);
        model.slot_mut(third).input_mut(InputIndex::SECOND).muted = true;
        model.slot_mut(third).input_mut(InputIndex::FIRST).gain_db = 5.1;

        let snapshot = render(&model);

        assert_eq!(snapshot.master_volume, -10.2);
        let slot = &snapshot.slots[2];
        assert!(slot.active);
        assert_eq!(slot.gain1, 5.1);
        assert!(!slot.mute1);
        assert!(slot.mute2);
        assert!(!snapshot.slots[0].active);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(render(&DeviceModel::new())).unwrap();

        assert_eq!(json["mute"], false);
        assert_eq!(json["masterVolume"], 0.0);
        let slot = &json["slots"][0];
        assert_eq!(slot["id"], "1");
        assert_eq!(slot["canActivate"], true);
        assert_eq!(slot["last"], "Empty");
        assert!(slot.get("gain1").is_some());
        assert!(slot.get("mute2").is_some());
    }
}
