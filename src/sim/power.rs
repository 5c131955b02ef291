//! Power meter
//!
//! Flying high charges the meter, skimming the ground drains it. Altitude is
//! compared in world y, where smaller means higher.

use serde::{Deserialize, Serialize};

use crate::tuning::PowerParams;

/// Meter status after the latest update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerStatus {
    /// Drained to zero; terminal for the run
    Empty,
    /// Not progressing, value held
    Stable,
    Losing,
    NormalCharge,
    SuperCharge,
}

impl PowerStatus {
    pub fn is_charging(&self) -> bool {
        matches!(self, PowerStatus::NormalCharge | PowerStatus::SuperCharge)
    }
}

/// Edge-triggered status changes worth a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerCue {
    /// Losing -> NormalCharge
    ChargeStarted,
    /// NormalCharge -> SuperCharge
    SuperChargeStarted,
    /// First tick at Empty
    Emptied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerMeter {
    value: f32,
    status: PowerStatus,
    last_status: PowerStatus,
    params: PowerParams,
}

impl PowerMeter {
    /// Full meter, initially losing
    pub fn new(params: PowerParams) -> Self {
        Self {
            value: params.max,
            status: PowerStatus::Losing,
            last_status: PowerStatus::Losing,
            params,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.params.max
    }

    /// Fill level in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        self.value / self.params.max
    }

    pub fn status(&self) -> PowerStatus {
        self.status
    }

    pub fn last_status(&self) -> PowerStatus {
        self.last_status
    }

    pub fn is_empty(&self) -> bool {
        self.status == PowerStatus::Empty
    }

    pub fn is_low(&self) -> bool {
        self.value < self.params.low_threshold
    }

    /// Overwrite the value (clamped); never produces `Empty`
    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.params.max);
    }

    /// One tick of charge/drain for a hero at world y `altitude_y`
    pub fn update(&mut self, altitude_y: f32, progressing: bool) {
        self.last_status = self.status;

        if self.status == PowerStatus::Empty {
            return;
        }

        if !progressing {
            self.status = PowerStatus::Stable;
            return;
        }

        let p = &self.params;
        if altitude_y <= p.super_threshold {
            self.value = (self.value + p.charge_rate_high).min(p.max);
            self.status = PowerStatus::SuperCharge;
        } else if altitude_y <= p.normal_threshold {
            self.value = (self.value + p.charge_rate_low).min(p.max);
            self.status = PowerStatus::NormalCharge;
        } else {
            let drained = self.value - p.drain_rate;
            if drained > 0.0 {
                self.value = drained;
                self.status = PowerStatus::Losing;
            } else {
                self.value = 0.0;
                self.status = PowerStatus::Empty;
            }
        }
    }

    /// Cue for the transition made by the latest update, if any
    pub fn cue(&self) -> Option<PowerCue> {
        match (self.last_status, self.status) {
            (PowerStatus::Losing, PowerStatus::NormalCharge) => Some(PowerCue::ChargeStarted),
            (PowerStatus::NormalCharge, PowerStatus::SuperCharge) => {
                Some(PowerCue::SuperChargeStarted)
            }
            (last, PowerStatus::Empty) if last != PowerStatus::Empty => Some(PowerCue::Emptied),
            _ => None,
        }
    }
}
