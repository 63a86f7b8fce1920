//! Installed pipe cost estimates.

use pf_core::units::{Length, inch};
use std::collections::BTreeMap;

/// Cost per metre keyed by material and nominal size in whole inches.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PipeCostModel {
    rates: BTreeMap<String, BTreeMap<u32, f64>>,
}

impl PipeCostModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carbon steel rates in $/m.
    pub fn default_steel() -> Self {
        let mut model = Self::new();
        for (size, rate) in [(2, 50.0), (4, 75.0), (6, 120.0), (8, 180.0), (10, 250.0), (12, 350.0)]
        {
            model.set_rate("CS", size, rate);
        }
        model
    }

    pub fn set_rate(&mut self, material: &str, nominal_in: u32, cost_per_m: f64) {
        self.rates
            .entry(material.to_ascii_uppercase())
            .or_default()
            .insert(nominal_in, cost_per_m);
    }

    /// Zero when the material or size is not priced.
    pub fn cost_per_meter(&self, material: &str, nominal: Length) -> f64 {
        let size = (nominal.value / inch(1.0).value).round() as u32;
        self.rates
            .get(&material.to_ascii_uppercase())
            .and_then(|by_size| by_size.get(&size))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum over `(material, nominal, length)` triples.
    pub fn total_cost<'a, I>(&self, pipes: I) -> f64
    where
        I: IntoIterator<Item = (&'a str, Length, Length)>,
    {
        pipes
            .into_iter()
            .map(|(material, nominal, length)| self.cost_per_meter(material, nominal) * length.value)
            .sum()
    }
}
