//! Interaction selection: the randomized step of event generation.
//!
//! Every candidate in the map gets its cross section at the probe
//! energy; one is drawn with probability proportional to it.

use crate::{
    error::{EvgError, EvgResult},
    event_record::EventRecord,
    generator::XSecAlgorithm,
    interaction::Interaction,
    kinematics::LorentzVector,
    rng::EvgRng,
    spline_cache::SplineCache,
    xsec_map::XSecAlgorithmMap,
};

/// Where cross sections come from: interpolated splines when enabled and
/// present, the algorithm itself otherwise.
#[derive(Clone, Copy)]
pub struct XSecSource<'a> {
    cache:       &'a SplineCache,
    use_splines: bool,
}

impl<'a> XSecSource<'a> {
    pub fn new(cache: &'a SplineCache, use_splines: bool) -> Self {
        Self { cache, use_splines }
    }

    pub fn uses_splines(&self) -> bool {
        self.use_splines
    }

    /// `interaction` must already carry the probe 4-momentum.
    pub fn xsec(&self, alg: &dyn XSecAlgorithm, interaction: &Interaction) -> f64 {
        if self.use_splines {
            if let Some(spl) = self.cache.get(alg.id(), interaction) {
                return spl.evaluate(interaction.probe_energy());
            }
        }
        alg.xsec(interaction)
    }
}

/// Index drawn with probability proportional to `weights[i]`, given a
/// uniform deviate `u` in [0, 1). Negative and non-finite weights count
/// as zero; zero-weight entries are never returned.
pub fn pick_weighted(weights: &[f64], u: f64) -> Option<usize> {
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().map(|&w| clean(w)).sum();
    if !(total > 0.0) {
        return None;
    }
    let target = u * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        let w = clean(w);
        if w == 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if target < cumulative {
            return Some(i);
        }
    }
    // Rounding can leave target == total.
    last_positive
}

#[derive(Debug, Default)]
pub struct InteractionSelector;

impl InteractionSelector {
    pub fn new() -> Self {
        Self
    }

    /// Pick one interaction from `map` at `probe_p4` and bootstrap its record.
    pub fn select_interaction(
        &self,
        map: &XSecAlgorithmMap,
        probe_p4: LorentzVector,
        source: XSecSource<'_>,
        rng: &mut EvgRng,
    ) -> EvgResult<EventRecord> {
        let energy = probe_p4.energy();

        let mut candidates = Vec::with_capacity(map.len());
        let mut weights = Vec::with_capacity(map.len());
        for (interaction, alg) in map.iter() {
            let mut candidate = interaction.clone();
            candidate.init_state.set_probe_p4(probe_p4);
            let xsec = source.xsec(alg.as_ref(), &candidate);
            log::debug!("xsec({}; E = {energy}) = {xsec:.6e}", candidate.as_key());
            candidates.push(candidate);
            weights.push(xsec);
        }

        let chosen = pick_weighted(&weights, rng.next_f64())
            .ok_or(EvgError::NoValidInteraction { energy })?;

        let interaction = candidates.swap_remove(chosen);
        log::debug!("Selected interaction {}", interaction.as_key());
        let mut record = EventRecord::new(interaction);
        record.set_xsec(weights[chosen]);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weights_are_never_picked() {
        let weights = [0.0, 0.0, 5.0];
        for k in 0..100 {
            let u = k as f64 / 100.0;
            assert_eq!(pick_weighted(&weights, u), Some(2));
        }
    }

    #[test]
    fn all_zero_weights_pick_nothing() {
        assert_eq!(pick_weighted(&[0.0, 0.0, 0.0], 0.3), None);
        assert_eq!(pick_weighted(&[], 0.3), None);
        assert_eq!(pick_weighted(&[-1.0, f64::NAN], 0.3), None);
    }

    #[test]
    fn cumulative_boundaries() {
        let weights = [1.0, 3.0];
        assert_eq!(pick_weighted(&weights, 0.0), Some(0));
        assert_eq!(pick_weighted(&weights, 0.24), Some(0));
        assert_eq!(pick_weighted(&weights, 0.26), Some(1));
        assert_eq!(pick_weighted(&weights, 0.999_999), Some(1));
    }

    #[test]
    fn trailing_zero_weight_is_skipped_at_rounding_edge() {
        assert_eq!(pick_weighted(&[2.0, 0.0], 1.0), Some(0));
    }
}
