use crate::core::load_power::LoadResult;
use serde::Serialize;

/// System totals over a batch of loads, combined at full precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AggregateTotals {
    pub total_active_kw: f64,
    pub total_reactive_kvar: f64,
    pub total_apparent_kva: f64,
    pub total_power_factor: f64,
}

impl AggregateTotals {
    pub fn from_load_results<'a>(results: impl IntoIterator<Item = &'a LoadResult>) -> Self {
        let (total_active_kw, total_reactive_kvar) =
            results.into_iter().fold((0., 0.), |(p, q), result| {
                (p + result.active_power_kw, q + result.reactive_power_kvar)
            });
        let total_apparent_kva = total_active_kw.hypot(total_reactive_kvar);
        let total_power_factor = if total_apparent_kva > 0. {
            total_active_kw / total_apparent_kva
        } else {
            0.
        };

        Self {
            total_active_kw,
            total_reactive_kvar,
            total_apparent_kva,
            total_power_factor,
        }
    }

    /// Whether there is no demand to size a transformer for (e.g. every load is on stand-by).
    pub fn is_no_load(&self) -> bool {
        self.total_apparent_kva <= 0.
    }
}
