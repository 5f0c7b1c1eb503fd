// LegacyTranslator - turns legacy requests into device command batches
//
// Every request runs through one critical section:
//   build batch -> send to sink -> mirror onto the model -> snapshot
// so batches from concurrent requests never interleave at the sink and the
// model only ever reflects batches the sink accepted.

use crate::catalogue::{PresetCatalogue, PresetEntry};
use crate::command::protocol::DeviceCommand;
use crate::command::request::{ChannelSelector, LegacyRequest, Target, slot_index};
use crate::command::sequence;
use crate::command::{TranslatorError, TranslatorResult};
use crate::device::{DeviceModel, DeviceSnapshot, InputIndex, PEQ_BAND_COUNT, render, validate};
use crate::sink::CommandSink;
use std::sync::{Arc, Mutex, MutexGuard};

/// A validated batch plus the model changes the commands cannot express
struct Batch {
    commands: Vec<DeviceCommand>,
    /// Title to record as the active slot's last preset
    preset_title: Option<String>,
}

impl Batch {
    fn new(commands: Vec<DeviceCommand>) -> Self {
        Self {
            commands,
            preset_title: None,
        }
    }
}

/// Model and sink guarded together
struct DeviceLink {
    model: DeviceModel,
    sink: Box<dyn CommandSink>,
}

/// A request's result and the device state at the end of its critical section
#[derive(Debug)]
pub struct Outcome {
    pub result: TranslatorResult<()>,
    /// `None` only when the state lock is poisoned
    pub snapshot: Option<DeviceSnapshot>,
}

impl Outcome {
    pub fn into_result(self) -> TranslatorResult<DeviceSnapshot> {
        self.result?;
        self.snapshot.ok_or(TranslatorError::StatePoisoned)
    }
}

/// Validates legacy requests, drives the sink, and keeps the model in step
///
/// Rejected requests send nothing and change nothing.
pub struct LegacyTranslator {
    link: Mutex<DeviceLink>,
    catalogue: Arc<dyn PresetCatalogue>,
}

impl LegacyTranslator {
    pub fn new<S>(model: DeviceModel, sink: S, catalogue: Arc<dyn PresetCatalogue>) -> Self
    where
        S: CommandSink + 'static,
    {
        Self {
            link: Mutex::new(DeviceLink {
                model,
                sink: Box::new(sink),
            }),
            catalogue,
        }
    }

    pub fn catalogue(&self) -> &dyn PresetCatalogue {
        self.catalogue.as_ref()
    }

    fn lock(&self) -> TranslatorResult<MutexGuard<'_, DeviceLink>> {
        self.link.lock().map_err(|_| TranslatorError::StatePoisoned)
    }

    /// Current device state
    pub fn snapshot(&self) -> TranslatorResult<DeviceSnapshot> {
        Ok(render(&self.lock()?.model))
    }

    /// Run one request's critical section
    ///
    /// Validation, sending, mirroring and the snapshot all happen under one
    /// lock, so a rejected request reports exactly the state it was judged
    /// against.
    pub fn submit(&self, request: LegacyRequest) -> Outcome {
        let verb = request.verb();
        let slot = request.slot();
        let outcome = match self.lock() {
            Ok(mut link) => {
                let result = self.apply(&mut link, request);
                Outcome {
                    result,
                    snapshot: Some(render(&link.model)),
                }
            }
            Err(e) => Outcome {
                result: Err(e),
                snapshot: None,
            },
        };

        match &outcome.result {
            Ok(()) => log::info!("Applied {} on slot {}", verb, slot),
            Err(e) if e.is_client_error() => log::warn!("Rejected {} on slot {}: {}", verb, slot, e),
            Err(e) => log::error!("Failed {} on slot {}: {}", verb, slot, e),
        }
        outcome
    }

    /// Dispatch a parsed legacy request
    pub fn execute(&self, request: LegacyRequest) -> TranslatorResult<DeviceSnapshot> {
        self.submit(request).into_result()
    }

    pub fn mute(
        &self,
        slot: i64,
        channel: ChannelSelector,
        on: bool,
    ) -> TranslatorResult<DeviceSnapshot> {
        self.execute(LegacyRequest::Mute { slot, channel, on })
    }

    pub fn gain(
        &self,
        slot: i64,
        channel: ChannelSelector,
        value: f64,
    ) -> TranslatorResult<DeviceSnapshot> {
        self.execute(LegacyRequest::Gain {
            slot,
            channel,
            value,
        })
    }

    pub fn activate(&self, slot: i64) -> TranslatorResult<DeviceSnapshot> {
        self.execute(LegacyRequest::Activate { slot })
    }

    /// Program a catalogue preset onto a slot
    ///
    /// The slot is checked before the catalogue is consulted, so a bad slot is
    /// reported as such even when the id is unknown too.
    pub fn load(&self, slot: i64, preset_id: &str) -> TranslatorResult<DeviceSnapshot> {
        self.execute(LegacyRequest::Load {
            slot,
            preset_id: preset_id.to_string(),
        })
    }

    /// Send the request's batch and mirror it, or change nothing
    fn apply(&self, link: &mut DeviceLink, request: LegacyRequest) -> TranslatorResult<()> {
        let batch = self.plan(&link.model, request)?;
        let lines: Vec<String> = batch.commands.iter().map(ToString::to_string).collect();
        log::debug!("Sending {} commands: {:?}", lines.len(), lines);
        link.sink.send(&lines)?;

        for command in &batch.commands {
            command.apply_to(&mut link.model);
        }
        if let Some(title) = batch.preset_title {
            let active = link.model.active_slot();
            link.model.slot_mut(active).last_preset = title;
        }
        Ok(())
    }

    /// Validate a request against the current model and build its batch
    fn plan(&self, model: &DeviceModel, request: LegacyRequest) -> TranslatorResult<Batch> {
        match request {
            LegacyRequest::Mute { slot, channel, on } => {
                let target = Target::resolve(slot, channel)?;
                Ok(Batch::new(sequence::mute(target, on)))
            }
            LegacyRequest::Gain {
                slot,
                channel,
                value,
            } => {
                let target = Target::resolve(slot, channel)?;
                let kind = target.kind();
                if !validate(kind, value) {
                    let range = kind.range();
                    return Err(TranslatorError::GainOutOfRange {
                        value,
                        min: *range.start(),
                        max: *range.end(),
                    });
                }
                Ok(Batch::new(sequence::gain(target, value)))
            }
            LegacyRequest::Activate { slot } => {
                let slot = slot_index(slot)?;
                if !model.slot(slot).can_activate {
                    return Err(TranslatorError::SlotCannotActivate(slot));
                }
                Ok(Batch::new(sequence::activate(slot)))
            }
            LegacyRequest::Load { slot, preset_id } => {
                let slot = slot_index(slot)?;
                let preset = self
                    .catalogue
                    .resolve(&preset_id)
                    .ok_or(TranslatorError::PresetNotFound(preset_id))?;
                check_band_count(&preset)?;
                Ok(Batch {
                    commands: sequence::load(slot, &preset),
                    preset_title: Some(preset.title),
                })
            }
        }
    }
}

fn check_band_count(preset: &PresetEntry) -> TranslatorResult<()> {
    for input in InputIndex::ALL {
        let count = preset.bands_for(input).len();
        if count > PEQ_BAND_COUNT {
            return Err(TranslatorError::PresetTooLarge {
                id: preset.id.clone(),
                count,
                max: PEQ_BAND_COUNT,
            });
        }
    }
    Ok(())
}
