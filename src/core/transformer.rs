use crate::core::units::fraction_to_percent;
use crate::input::{CoolingType, SizingPolicy};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// A standard transformer size together with its efficiency at rated load for each cooling type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformerCatalogEntry {
    pub capacity_kva: f64,
    efficiency_dry: f64,
    efficiency_oil_immersed: f64,
}

impl TransformerCatalogEntry {
    const fn new(capacity_kva: f64, efficiency_dry: f64, efficiency_oil_immersed: f64) -> Self {
        Self {
            capacity_kva,
            efficiency_dry,
            efficiency_oil_immersed,
        }
    }

    pub fn efficiency(&self, cooling_type: CoolingType) -> f64 {
        match cooling_type {
            CoolingType::Dry => self.efficiency_dry,
            CoolingType::OilImmersed => self.efficiency_oil_immersed,
        }
    }
}

/// Standard capacities in ascending order, with efficiencies at rated load.
pub const TRANSFORMER_CATALOG: [TransformerCatalogEntry; 14] = [
    TransformerCatalogEntry::new(15., 0.9789, 0.9865),
    TransformerCatalogEntry::new(30., 0.9823, 0.9883),
    TransformerCatalogEntry::new(45., 0.9840, 0.9892),
    TransformerCatalogEntry::new(75., 0.9860, 0.9903),
    TransformerCatalogEntry::new(112.5, 0.9874, 0.9911),
    TransformerCatalogEntry::new(150., 0.9883, 0.9916),
    TransformerCatalogEntry::new(225., 0.9894, 0.9923),
    TransformerCatalogEntry::new(300., 0.9902, 0.9927),
    TransformerCatalogEntry::new(500., 0.9914, 0.9935),
    TransformerCatalogEntry::new(750., 0.9923, 0.9940),
    TransformerCatalogEntry::new(1000., 0.9928, 0.9943),
    TransformerCatalogEntry::new(1500., 0.9900, 0.9948),
    TransformerCatalogEntry::new(2000., 0.9900, 0.9951),
    TransformerCatalogEntry::new(2500., 0.9900, 0.9953),
];

pub fn largest_catalog_capacity_kva() -> f64 {
    TRANSFORMER_CATALOG[TRANSFORMER_CATALOG.len() - 1].capacity_kva
}

/// Find the smallest standard transformer whose capacity is not less than the required demand.
pub fn immediate_superior_size(required_kva: f64) -> Option<&'static TransformerCatalogEntry> {
    TRANSFORMER_CATALOG
        .iter()
        .find(|entry| entry.capacity_kva >= required_kva)
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("No standard transformer can supply {required_kva:.2} kVA (largest available is {largest_kva} kVA). Revise the loads or sizing policy.")]
    NoSuitableTransformer { required_kva: f64, largest_kva: f64 },
    #[error("Transformer selection needs a system power factor in (0, 1], but {0} was given")]
    NonPositivePowerFactor(f64),
}

/// Outcome of sizing a transformer against an aggregated demand.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SizingResult {
    pub cooling_type: CoolingType,
    pub diversified_demand_kva: f64,
    pub reserve_adjusted_kva: f64,
    pub selected_capacity_kva: f64,
    pub efficiency: f64,
    pub efficiency_percent: f64,
    pub losses_kw: f64,
    pub final_demand_kva: f64,
    pub final_reserve_kva: f64,
    pub final_reserve_percent: f64,
    pub loading_percent: f64,
}

/// Select a transformer for an aggregated demand.
///
/// Arguments:
/// * `total_apparent_kva` - total apparent power of all loads, in kVA
/// * `total_power_factor` - power factor of the combined loads; must be in (0, 1]
/// * `policy` - diversification, reserve and cooling type to size against
#[instrument(skip(policy))]
pub fn select(
    total_apparent_kva: f64,
    total_power_factor: f64,
    policy: &SizingPolicy,
) -> Result<SizingResult, SelectionError> {
    if !(total_power_factor > 0. && total_power_factor <= 1.) {
        return Err(SelectionError::NonPositivePowerFactor(total_power_factor));
    }

    let diversified_demand_kva = total_apparent_kva * policy.diversification_factor;
    let reserve_adjusted_kva = diversified_demand_kva * (1. + policy.reserve_margin);

    let entry = immediate_superior_size(reserve_adjusted_kva).ok_or(
        SelectionError::NoSuitableTransformer {
            required_kva: reserve_adjusted_kva,
            largest_kva: largest_catalog_capacity_kva(),
        },
    )?;
    let selected_capacity_kva = entry.capacity_kva;
    let efficiency = entry.efficiency(policy.cooling_type);

    // Losses are evaluated at the rated capacity and reflected back to kVA through the system
    // power factor.
    let losses_kw = selected_capacity_kva * total_power_factor * (1. / efficiency - 1.);
    let losses_kva = losses_kw / total_power_factor;

    let final_demand_kva = reserve_adjusted_kva + losses_kva;
    let final_reserve_kva = selected_capacity_kva - final_demand_kva;
    let final_reserve_percent = fraction_to_percent(final_reserve_kva / selected_capacity_kva);
    // loading excludes the reserve margin
    let loading_percent =
        fraction_to_percent((diversified_demand_kva + losses_kva) / selected_capacity_kva);

    info!(
        selected_capacity_kva,
        reserve_adjusted_kva, losses_kw, loading_percent, "selected transformer"
    );
    if final_reserve_kva < 0. {
        warn!(
            final_reserve_kva,
            "Transformer losses push the final demand above the selected capacity"
        );
    }

    Ok(SizingResult {
        cooling_type: policy.cooling_type,
        diversified_demand_kva,
        reserve_adjusted_kva,
        selected_capacity_kva,
        efficiency,
        efficiency_percent: fraction_to_percent(efficiency),
        losses_kw,
        final_demand_kva,
        final_reserve_kva,
        final_reserve_percent,
        loading_percent,
    })
}
