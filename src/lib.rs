pub mod core;
pub mod errors;
pub mod input;
pub mod output;

#[cfg(test)]
mod tests;

use crate::core::aggregation::AggregateTotals;
use crate::core::load_power::{compute, InvalidLoadInputError, LoadResult};
use crate::core::transformer::{select, SizingResult};
use crate::core::units::round_for_display;
use crate::errors::{CalculationError, OutputError, TrafoError};
use crate::input::{
    ingest_for_processing, Input, LoadType, PolicyOverrides, SizingPolicy, UsagePattern,
};
use crate::output::Output;
use bitflags::bitflags;
use csv::WriterBuilder;
use indexmap::IndexMap;
use itertools::Itertools;
use lazy_static::lazy_static;
use rayon::prelude::*;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::{debug, info, instrument, warn};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u8 {
        /// Write the per-load table alongside the summary
        const DETAILED_LOAD_OUTPUT = 0b01;
        /// Write the complete report as JSON
        const JSON_REPORT = 0b10;
    }
}

/// Result for one load, with the identity it was declared with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub number: usize,
    pub id: String,
    pub label: String,
    pub load_type: LoadType,
    pub usage_pattern: UsagePattern,
    #[serde(flatten)]
    pub result: LoadResult,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SizingOutcome {
    Selected(SizingResult),
    /// Every load is on stand-by, so there is no demand to size against.
    NoLoad,
}

impl SizingOutcome {
    pub fn selected(&self) -> Option<&SizingResult> {
        match self {
            SizingOutcome::Selected(result) => Some(result),
            SizingOutcome::NoLoad => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SizingReport {
    pub sizing_policy: SizingPolicy,
    pub loads: Vec<LoadOutcome>,
    pub totals: AggregateTotals,
    pub sizing: SizingOutcome,
}

pub fn run_project(
    input: impl Read,
    output: impl Output,
    policy_overrides: &PolicyOverrides,
    flags: &ProjectFlags,
) -> Result<SizingReport, TrafoError> {
    let mut input_for_processing = ingest_for_processing(input)?;
    policy_overrides.apply_to(&mut input_for_processing);
    let input = input_for_processing.finalize()?;

    let report = calculate(&input)?;

    write_core_output_files(&output, &report, flags)
        .map_err(|e| TrafoError::ErrorInOutput(OutputError::new(e)))?;

    Ok(report)
}

/// Run the sizing calculation for a validated input: power for every load, system totals, and
/// the transformer selection for those totals.
#[instrument(skip_all, fields(loads = input.loads.len()))]
pub fn calculate(input: &Input) -> Result<SizingReport, CalculationError> {
    // loads are independent so are computed in parallel, but the first failure in input order
    // is the one reported
    let load_results: Vec<Result<LoadResult, InvalidLoadInputError>> =
        input.loads.par_iter().map(compute).collect();

    let loads = input
        .loads
        .iter()
        .zip(load_results)
        .enumerate()
        .map(|(idx, (spec, result))| -> Result<LoadOutcome, InvalidLoadInputError> {
            Ok(LoadOutcome {
                number: spec.number.unwrap_or(idx + 1),
                id: spec.id.clone(),
                label: spec.label.clone(),
                load_type: spec.load_type.clone(),
                usage_pattern: spec.usage_pattern.clone(),
                result: result?,
            })
        })
        .collect::<Result<Vec<_>, InvalidLoadInputError>>()?;

    let totals = AggregateTotals::from_load_results(loads.iter().map(|load| &load.result));
    debug!(?totals, "aggregated load totals");

    let sizing = if totals.is_no_load() {
        warn!("All loads are on stand-by, so no transformer is selected");
        SizingOutcome::NoLoad
    } else {
        SizingOutcome::Selected(select(
            totals.total_apparent_kva,
            totals.total_power_factor,
            &input.sizing_policy,
        )?)
    };

    Ok(SizingReport {
        sizing_policy: input.sizing_policy,
        loads,
        totals,
        sizing,
    })
}

lazy_static! {
    pub static ref UNITS_MAP: IndexMap<&'static str, &'static str> = IndexMap::from([
        ("Total active power", "[kW]"),
        ("Total reactive power", "[kVAR]"),
        ("Total apparent power", "[kVA]"),
        ("Total power factor", "[ratio]"),
        ("Diversification factor", "[ratio]"),
        ("Reserve margin", "[%]"),
        ("Cooling type", ""),
        ("Diversified demand", "[kVA]"),
        ("Demand with reserve", "[kVA]"),
        ("Selected transformer", "[kVA]"),
        ("Efficiency", "[%]"),
        ("Losses", "[kW]"),
        ("Final demand", "[kVA]"),
        ("Final reserve", "[kVA]"),
        ("Final reserve percentage", "[%]"),
        ("Loading", "[%]"),
        ("Status", ""),
    ]);
}

fn write_core_output_files(
    output: &impl Output,
    report: &SizingReport,
    flags: &ProjectFlags,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }

    if flags.contains(ProjectFlags::DETAILED_LOAD_OUTPUT) {
        write_loads_file(output, report)?;
    }
    write_summary_file(output, report)?;
    if flags.contains(ProjectFlags::JSON_REPORT) {
        let mut writer = output.writer_for_location_key("report", "json")?;
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
    }

    Ok(())
}

fn display_value(value: f64) -> String {
    round_for_display(value).to_string()
}

fn display_percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn write_loads_file(output: &impl Output, report: &SizingReport) -> anyhow::Result<()> {
    info!("writing out per-load table");
    let writer = output.writer_for_location_key("loads", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record([
        "No", "Id", "Load", "Type", "Usage", "PF", "Efficiency", "P", "Q", "S",
    ])?;
    writer.write_record([
        "[count]", "", "", "", "", "[ratio]", "[ratio]", "[kW]", "[kVAR]", "[kVA]",
    ])?;

    for load in &report.loads {
        let LoadResult {
            active_power_kw,
            reactive_power_kvar,
            apparent_power_kva,
            power_factor,
            efficiency,
            ..
        } = load.result;
        writer.write_record(&[
            load.number.to_string(),
            load.id.clone(),
            load.label.clone(),
            load.load_type.name().to_string(),
            load.usage_pattern.name().to_string(),
            power_factor.to_string(),
            efficiency.to_string(),
            display_value(active_power_kw),
            display_value(reactive_power_kvar),
            display_value(apparent_power_kva),
        ])?;
    }

    let totals = &report.totals;
    writer.write_record(&[
        "Total".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        display_value(totals.total_power_factor),
        String::new(),
        display_value(totals.total_active_kw),
        display_value(totals.total_reactive_kvar),
        display_value(totals.total_apparent_kva),
    ])?;

    writer.flush()?;

    Ok(())
}

fn write_summary_file(output: &impl Output, report: &SizingReport) -> anyhow::Result<()> {
    info!("writing out sizing summary");
    let writer = output.writer_for_location_key("summary", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let SizingReport {
        sizing_policy,
        totals,
        sizing,
        ..
    } = report;

    let mut rows: Vec<(&str, String)> = vec![
        ("Total active power", display_value(totals.total_active_kw)),
        (
            "Total reactive power",
            display_value(totals.total_reactive_kvar),
        ),
        (
            "Total apparent power",
            display_value(totals.total_apparent_kva),
        ),
        ("Total power factor", display_value(totals.total_power_factor)),
        (
            "Diversification factor",
            sizing_policy.diversification_factor.to_string(),
        ),
        (
            "Reserve margin",
            display_percent(sizing_policy.reserve_margin * 100.),
        ),
        ("Cooling type", sizing_policy.cooling_type.to_string()),
    ];

    match sizing {
        SizingOutcome::Selected(result) => rows.extend([
            ("Status", "selected".to_string()),
            (
                "Diversified demand",
                display_value(result.diversified_demand_kva),
            ),
            (
                "Demand with reserve",
                display_value(result.reserve_adjusted_kva),
            ),
            (
                "Selected transformer",
                result.selected_capacity_kva.to_string(),
            ),
            ("Efficiency", display_percent(result.efficiency_percent)),
            ("Losses", display_value(result.losses_kw)),
            ("Final demand", display_value(result.final_demand_kva)),
            ("Final reserve", display_value(result.final_reserve_kva)),
            (
                "Final reserve percentage",
                display_percent(result.final_reserve_percent),
            ),
            ("Loading", display_percent(result.loading_percent)),
        ]),
        SizingOutcome::NoLoad => rows.push(("Status", "no load".to_string())),
    }

    writer.write_record(["Quantity", "Value", "Unit"])?;
    for (key, value) in rows {
        let unit = UNITS_MAP.get(key).copied().unwrap_or("Unit not defined");
        writer.write_record([key, value.as_str(), unit])?;
    }

    writer.flush()?;

    Ok(())
}

/// Format the per-load results as a human-readable table, one line per load.
pub fn format_load_table(report: &SizingReport) -> String {
    let header = format!(
        "{:>4}  {:<12} {:<24} {:>10} {:>10} {:>10}",
        "No", "Id", "Load", "P [kW]", "Q [kVAR]", "S [kVA]"
    );
    let rows = report.loads.iter().map(|load| {
        format!(
            "{:>4}  {:<12} {:<24} {:>10.2} {:>10.2} {:>10.2}",
            load.number,
            load.id,
            load.label,
            load.result.active_power_kw,
            load.result.reactive_power_kvar,
            load.result.apparent_power_kva
        )
    });

    std::iter::once(header).chain(rows).join("\n")
}
