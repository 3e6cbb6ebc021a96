use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use serde_valid::Validate;
use std::io::{BufReader, Read};
use strum_macros::{Display, EnumIter};

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    #[validate]
    pub sizing_policy: SizingPolicy,
    #[validate(min_items = 1)]
    #[validate]
    pub loads: Vec<LoadSpec>,
}

/// System-wide policy applied when choosing a transformer for the aggregated demand.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SizingPolicy {
    /// Fraction of the connected load expected to peak simultaneously
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub diversification_factor: f64,
    /// Planned headroom as a fraction of the diversified demand (0.2 means 20%)
    #[validate(minimum = 0.)]
    pub reserve_margin: f64,
    pub cooling_type: CoolingType,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CoolingType {
    Dry,
    OilImmersed,
}

/// One electrical load as declared by the user.
///
/// The identity fields (`number`, `id`, `label`) and the supply description (`voltage`,
/// `phase_system`) are carried through to the report untouched and play no part in the
/// calculation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoadSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<usize>,
    pub id: String,
    pub label: String,
    /// Nominal supply voltage, in V
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_system: Option<PhaseSystem>,
    pub load_type: LoadType,
    pub usage_pattern: UsagePattern,
    pub power_unit: PowerUnit,
    #[validate(exclusive_minimum = 0.)]
    pub power_value: f64,
    /// Only meaningful for motors
    pub has_variable_frequency_drive: bool,
}

// The three load enums keep unrecognised spellings rather than failing deserialization, so that
// the calculator can reject them with the identity of the offending load.

#[derive(Clone, Debug, Deserialize_enum_str, Eq, Hash, PartialEq, Serialize_enum_str)]
pub enum LoadType {
    #[serde(rename = "lighting")]
    Lighting,
    #[serde(rename = "motor")]
    Motor,
    #[serde(rename = "computing_equipment")]
    ComputingEquipment,
    #[serde(rename = "air_conditioning")]
    AirConditioning,
    #[serde(other)]
    Unrecognised(String),
}

impl LoadType {
    pub fn name(&self) -> &str {
        match self {
            LoadType::Lighting => "lighting",
            LoadType::Motor => "motor",
            LoadType::ComputingEquipment => "computing_equipment",
            LoadType::AirConditioning => "air_conditioning",
            LoadType::Unrecognised(value) => value.as_str(),
        }
    }
}

#[derive(Clone, Debug, Deserialize_enum_str, Eq, Hash, PartialEq, Serialize_enum_str)]
pub enum UsagePattern {
    #[serde(rename = "continuous")]
    Continuous,
    #[serde(rename = "intermittent")]
    Intermittent,
    #[serde(rename = "stand_by")]
    StandBy,
    #[serde(other)]
    Unrecognised(String),
}

impl UsagePattern {
    pub fn name(&self) -> &str {
        match self {
            UsagePattern::Continuous => "continuous",
            UsagePattern::Intermittent => "intermittent",
            UsagePattern::StandBy => "stand_by",
            UsagePattern::Unrecognised(value) => value.as_str(),
        }
    }
}

#[derive(Clone, Debug, Deserialize_enum_str, Eq, Hash, PartialEq, Serialize_enum_str)]
pub enum PowerUnit {
    #[serde(rename = "hp")]
    HorsePower,
    #[serde(rename = "kW")]
    Kilowatt,
    #[serde(rename = "kVA")]
    KiloVoltAmpere,
    #[serde(other)]
    Unrecognised(String),
}

impl PowerUnit {
    pub fn name(&self) -> &str {
        match self {
            PowerUnit::HorsePower => "hp",
            PowerUnit::Kilowatt => "kW",
            PowerUnit::KiloVoltAmpere => "kVA",
            PowerUnit::Unrecognised(value) => value.as_str(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSystem {
    SinglePhase,
    TwoPhase,
    ThreePhase,
}

/// An input document that has been parsed but not yet validated, so that callers (e.g. command
/// line flags) can still adjust the sizing policy before the calculation runs.
#[derive(Debug)]
pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> anyhow::Result<Self> {
        let reader = BufReader::new(json);
        let input: Input = serde_json::from_reader(reader)?;

        Ok(Self { input })
    }

    pub fn sizing_policy(&self) -> &SizingPolicy {
        &self.input.sizing_policy
    }

    pub fn set_diversification_factor(&mut self, diversification_factor: f64) -> &mut Self {
        self.input.sizing_policy.diversification_factor = diversification_factor;
        self
    }

    pub fn set_reserve_margin(&mut self, reserve_margin: f64) -> &mut Self {
        self.input.sizing_policy.reserve_margin = reserve_margin;
        self
    }

    pub fn set_cooling_type(&mut self, cooling_type: CoolingType) -> &mut Self {
        self.input.sizing_policy.cooling_type = cooling_type;
        self
    }

    /// Validate the structural constraints on the input and hand it over for calculation.
    pub fn finalize(self) -> anyhow::Result<Input> {
        self.input
            .validate()
            .map_err(|errors| anyhow!("Input failed validation: {errors}"))?;

        Ok(self.input)
    }
}

/// Policy values supplied outside the input document (e.g. on the command line), which take
/// precedence over the document's own.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyOverrides {
    pub diversification_factor: Option<f64>,
    pub reserve_margin: Option<f64>,
    pub cooling_type: Option<CoolingType>,
}

impl PolicyOverrides {
    pub fn apply_to(&self, input: &mut InputForProcessing) {
        if let Some(diversification_factor) = self.diversification_factor {
            input.set_diversification_factor(diversification_factor);
        }
        if let Some(reserve_margin) = self.reserve_margin {
            input.set_reserve_margin(reserve_margin);
        }
        if let Some(cooling_type) = self.cooling_type {
            input.set_cooling_type(cooling_type);
        }
    }
}
