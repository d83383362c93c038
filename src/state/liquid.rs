//! Liquid bookkeeping primitives.
//!
//! A location's contents are an ordered map of ingredient id → µL. Transfers
//! are proportional: taking `v` µL from a mixture takes the same fraction of
//! every ingredient. The synthetic [`AIR`] ingredient represents air gaps held
//! in a tip; it is never deposited into a well.

use std::collections::BTreeMap;

/// Ingredient id → volume (µL).
pub type LocationLiquidState = BTreeMap<String, f64>;

/// Synthetic ingredient representing an air gap.
pub const AIR: &str = "__air__";

/// Volumes below this are treated as zero and pruned.
pub const VOLUME_EPSILON: f64 = 1e-9;

/// Total volume of all non-air ingredients.
pub fn total_volume(liquid: &LocationLiquidState) -> f64 {
    liquid
        .iter()
        .filter(|(id, _)| id.as_str() != AIR)
        .map(|(_, v)| *v)
        .sum()
}

/// Split `volume` µL off `source` proportionally.
///
/// Returns `(taken, remaining)`. At most the tracked total (air excluded) is
/// taken; air is carried along unchanged in `remaining`.
pub fn split_liquid(
    volume: f64,
    source: &LocationLiquidState,
) -> (LocationLiquidState, LocationLiquidState) {
    let total = total_volume(source);
    if total <= VOLUME_EPSILON || volume <= 0.0 {
        return (LocationLiquidState::new(), source.clone());
    }
    let fraction = (volume / total).min(1.0);
    let mut taken = LocationLiquidState::new();
    let mut remaining = LocationLiquidState::new();
    for (id, v) in source {
        if id == AIR {
            remaining.insert(id.clone(), *v);
            continue;
        }
        let moved = v * fraction;
        taken.insert(id.clone(), moved);
        remaining.insert(id.clone(), (v - moved).max(0.0));
    }
    (prune(taken), prune(remaining))
}

/// Take `fraction` (0..=1) of every ingredient, air included.
///
/// Returns `(taken, remaining)`.
pub fn take_fraction(
    fraction: f64,
    source: &LocationLiquidState,
) -> (LocationLiquidState, LocationLiquidState) {
    let fraction = fraction.clamp(0.0, 1.0);
    let mut taken = LocationLiquidState::new();
    let mut remaining = LocationLiquidState::new();
    for (id, v) in source {
        let moved = v * fraction;
        taken.insert(id.clone(), moved);
        remaining.insert(id.clone(), (v - moved).max(0.0));
    }
    (prune(taken), prune(remaining))
}

/// Push `volume` µL out of a tip holding `held` µL in total.
///
/// Air leaves first; whatever remains of `volume` is taken proportionally
/// from the liquid portion of `held`, which may include untracked liquid.
/// Returns `(delivered, remaining)`; `delivered` never contains air.
pub fn dispense_from_tip(
    volume: f64,
    held: f64,
    tip: &LocationLiquidState,
) -> (LocationLiquidState, LocationLiquidState) {
    let air = tip.get(AIR).copied().unwrap_or(0.0);
    let air_out = volume.clamp(0.0, air);
    let liquid_out = (volume - air_out).max(0.0);
    let liquid_held = held - air;
    let fraction = if liquid_held > VOLUME_EPSILON {
        liquid_out / liquid_held
    } else {
        0.0
    };
    let (delivered, mut remaining) = take_fraction(fraction, &without_air(tip));
    if air - air_out > VOLUME_EPSILON {
        remaining.insert(AIR.to_string(), air - air_out);
    }
    (delivered, remaining)
}

/// Sum two locations' contents.
pub fn merge_liquid(a: &LocationLiquidState, b: &LocationLiquidState) -> LocationLiquidState {
    let mut merged = a.clone();
    for (id, v) in b {
        *merged.entry(id.clone()).or_insert(0.0) += v;
    }
    prune(merged)
}

/// Copy of `liquid` without the air ingredient.
pub fn without_air(liquid: &LocationLiquidState) -> LocationLiquidState {
    liquid
        .iter()
        .filter(|(id, _)| id.as_str() != AIR)
        .map(|(id, v)| (id.clone(), *v))
        .collect()
}

/// Drop ingredients whose volume is effectively zero.
pub fn prune(mut liquid: LocationLiquidState) -> LocationLiquidState {
    liquid.retain(|_, v| *v > VOLUME_EPSILON);
    liquid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liquid(entries: &[(&str, f64)]) -> LocationLiquidState {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_split_is_proportional() {
        let source = liquid(&[("water", 75.0), ("dye", 25.0)]);
        let (taken, remaining) = split_liquid(40.0, &source);
        assert!((taken["water"] - 30.0).abs() < 1e-9);
        assert!((taken["dye"] - 10.0).abs() < 1e-9);
        assert!((total_volume(&remaining) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_more_than_available_empties_source() {
        let source = liquid(&[("water", 20.0)]);
        let (taken, remaining) = split_liquid(50.0, &source);
        assert!((taken["water"] - 20.0).abs() < 1e-9);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_split_leaves_air_behind() {
        let source = liquid(&[("water", 10.0), (AIR, 5.0)]);
        let (taken, remaining) = split_liquid(10.0, &source);
        assert!(!taken.contains_key(AIR));
        assert_eq!(remaining[AIR], 5.0);
    }

    #[test]
    fn test_dispense_pushes_air_out_first() {
        let tip = liquid(&[("water", 100.0), (AIR, 10.0)]);
        let (delivered, remaining) = dispense_from_tip(60.0, 110.0, &tip);
        assert_eq!(delivered, liquid(&[("water", 50.0)]));
        assert_eq!(remaining, liquid(&[("water", 50.0)]));
    }

    #[test]
    fn test_dispense_smaller_than_air_gap_delivers_nothing() {
        let tip = liquid(&[("water", 40.0), (AIR, 10.0)]);
        let (delivered, remaining) = dispense_from_tip(4.0, 50.0, &tip);
        assert!(delivered.is_empty());
        assert!((remaining[AIR] - 6.0).abs() < 1e-9);
        assert_eq!(remaining["water"], 40.0);
    }

    #[test]
    fn test_dispense_shares_with_untracked_liquid() {
        // 20 µL of the 60 µL liquid portion is untracked.
        let tip = liquid(&[("water", 40.0)]);
        let (delivered, _) = dispense_from_tip(30.0, 60.0, &tip);
        assert!((delivered["water"] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_unions_ingredients() {
        let merged = merge_liquid(&liquid(&[("a", 1.0)]), &liquid(&[("a", 2.0), ("b", 3.0)]));
        assert_eq!(merged, liquid(&[("a", 3.0), ("b", 3.0)]));
    }

    #[test]
    fn test_volumes_never_negative() {
        let (_, remaining) = take_fraction(1.5, &liquid(&[("a", 1.0)]));
        assert!(remaining.values().all(|v| *v >= 0.0));
        assert!(remaining.is_empty());
    }
}
