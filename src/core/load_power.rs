use crate::core::units::{horsepower_to_kilowatts, reactive_ratio_for_power_factor};
use crate::input::{LoadSpec, LoadType, PowerUnit, UsagePattern};
use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;
use tracing::debug;

/// Power factor and efficiency assumed for a class of load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadCharacteristics {
    pub power_factor: f64,
    pub efficiency: f64,
}

const LIGHTING: LoadCharacteristics = LoadCharacteristics {
    power_factor: 0.90,
    efficiency: 0.95,
};
const COMPUTING_EQUIPMENT: LoadCharacteristics = LoadCharacteristics {
    power_factor: 0.92,
    efficiency: 0.95,
};
const AIR_CONDITIONING: LoadCharacteristics = LoadCharacteristics {
    power_factor: 0.88,
    efficiency: 0.95,
};
const MOTOR_WITH_VFD: LoadCharacteristics = LoadCharacteristics {
    power_factor: 0.98,
    efficiency: 0.90,
};
const MOTOR_DIRECT_ON_LINE: LoadCharacteristics = LoadCharacteristics {
    power_factor: 0.88,
    efficiency: 0.95,
};

/// Look up the fixed characteristics for a load type, keyed additionally on whether a variable
/// frequency drive is fitted (which only changes anything for motors).
///
/// Returns None for an unrecognised load type.
pub fn characteristics_for(
    load_type: &LoadType,
    has_variable_frequency_drive: bool,
) -> Option<LoadCharacteristics> {
    match (load_type, has_variable_frequency_drive) {
        (LoadType::Lighting, _) => Some(LIGHTING),
        (LoadType::ComputingEquipment, _) => Some(COMPUTING_EQUIPMENT),
        (LoadType::AirConditioning, _) => Some(AIR_CONDITIONING),
        (LoadType::Motor, true) => Some(MOTOR_WITH_VFD),
        (LoadType::Motor, false) => Some(MOTOR_DIRECT_ON_LINE),
        (LoadType::Unrecognised(_), _) => None,
    }
}

/// Fraction of the declared magnitude that is actually drawn. Stand-by loads reserve capacity
/// without drawing any power.
fn utilization_factor_for(usage_pattern: &UsagePattern) -> Option<f64> {
    match usage_pattern {
        UsagePattern::Continuous | UsagePattern::Intermittent => Some(1.),
        UsagePattern::StandBy => Some(0.),
        UsagePattern::Unrecognised(_) => None,
    }
}

/// Active power drawn from the supply, in kW, before applying the utilization factor.
fn input_active_power(
    power_unit: &PowerUnit,
    power_value: f64,
    characteristics: LoadCharacteristics,
) -> Option<f64> {
    let LoadCharacteristics {
        power_factor,
        efficiency,
    } = characteristics;

    match power_unit {
        PowerUnit::HorsePower => Some(horsepower_to_kilowatts(power_value) / efficiency),
        PowerUnit::Kilowatt => Some(power_value / efficiency),
        PowerUnit::KiloVoltAmpere => Some(power_value * power_factor / efficiency),
        PowerUnit::Unrecognised(_) => None,
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoadSpecField {
    LoadType,
    UsagePattern,
    PowerUnit,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("Load '{load_id}' has an unrecognised {field}: '{value}'")]
pub struct InvalidLoadInputError {
    pub load_id: String,
    pub field: LoadSpecField,
    pub value: String,
}

impl InvalidLoadInputError {
    fn new(load_id: &str, field: LoadSpecField, value: &str) -> Self {
        Self {
            load_id: load_id.to_string(),
            field,
            value: value.to_string(),
        }
    }
}

/// Electrical powers derived for one load.
///
/// Powers are held at full precision; rounding happens only when the result is presented.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LoadResult {
    pub active_power_kw: f64,
    pub reactive_power_kvar: f64,
    pub apparent_power_kva: f64,
    pub power_factor: f64,
    pub efficiency: f64,
    pub utilization_factor: f64,
}

/// Calculate the active, reactive and apparent power for a load.
///
/// Arguments:
/// * `spec` - the declared load
///
/// Fields are checked in the order load type, usage pattern, power unit, and the first
/// unrecognised one is reported. Nothing is calculated for a load that fails.
pub fn compute(spec: &LoadSpec) -> Result<LoadResult, InvalidLoadInputError> {
    let characteristics = characteristics_for(&spec.load_type, spec.has_variable_frequency_drive)
        .ok_or_else(|| {
            InvalidLoadInputError::new(&spec.id, LoadSpecField::LoadType, spec.load_type.name())
        })?;
    let utilization_factor = utilization_factor_for(&spec.usage_pattern).ok_or_else(|| {
        InvalidLoadInputError::new(
            &spec.id,
            LoadSpecField::UsagePattern,
            spec.usage_pattern.name(),
        )
    })?;
    let input_power_kw = input_active_power(&spec.power_unit, spec.power_value, characteristics)
        .ok_or_else(|| {
            InvalidLoadInputError::new(&spec.id, LoadSpecField::PowerUnit, spec.power_unit.name())
        })?;

    let active_power_kw = input_power_kw * utilization_factor;
    let reactive_power_kvar =
        active_power_kw * reactive_ratio_for_power_factor(characteristics.power_factor);
    let apparent_power_kva = active_power_kw.hypot(reactive_power_kvar);

    debug!(
        load_id = spec.id.as_str(),
        active_power_kw, reactive_power_kvar, apparent_power_kva, "computed load powers"
    );

    Ok(LoadResult {
        active_power_kw,
        reactive_power_kvar,
        apparent_power_kva,
        power_factor: characteristics.power_factor,
        efficiency: characteristics.efficiency,
        utilization_factor,
    })
}
