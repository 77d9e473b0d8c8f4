//! UCB1: pick the arm with the largest `mean + sqrt(2 ln t / n)`.

use crate::state::{argmax, BanditState};

#[derive(Debug, Clone, Copy, Default)]
pub struct Ucb1;

impl Ucb1 {
    pub fn new() -> Self {
        Self
    }

    /// Unpulled arms come first, in index order, so the bound never sees
    /// a zero pull count.
    pub fn choose(&self, state: &BanditState) -> usize {
        if let Some(arm) = state.first_unpulled() {
            return arm;
        }
        let total = state.steps();
        argmax(
            state
                .arms()
                .iter()
                .map(|a| upper_bound(a.mean, a.pulls, total).unwrap_or(f64::INFINITY)),
        )
    }
}

/// `None` for an arm that has never been pulled.
pub fn upper_bound(mean: f64, pulls: u64, total_steps: u64) -> Option<f64> {
    if pulls == 0 || total_steps == 0 {
        return None;
    }
    let exploration = (2.0 * (total_steps as f64).ln() / pulls as f64).sqrt();
    Some(mean + exploration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpulled_arms_first_in_index_order() {
        let mut state = BanditState::new(4);
        let ucb = Ucb1::new();
        for expected in 0..4 {
            assert_eq!(ucb.choose(&state), expected);
            state.record(expected, 0.0).unwrap();
        }
    }

    #[test]
    fn test_lower_unpulled_index_wins_over_later_gap() {
        let mut state = BanditState::new(4);
        state.record(0, 1.0).unwrap();
        state.record(2, 1.0).unwrap();
        assert_eq!(Ucb1::new().choose(&state), 1);
    }

    #[test]
    fn test_bound_formula() {
        let bound = upper_bound(0.5, 2, 10).unwrap();
        let expected = 0.5 + (2.0 * 10f64.ln() / 2.0).sqrt();
        assert!((bound - expected).abs() < 1e-12);
        assert_eq!(upper_bound(0.5, 0, 10), None);
    }

    #[test]
    fn test_less_explored_arm_gets_bonus() {
        let mut state = BanditState::new(2);
        // Arm 0: 10 pulls at mean 0.6; arm 1: 1 pull at mean 0.5.
        for i in 0..10 {
            state.record(0, if i < 6 { 1.0 } else { 0.0 }).unwrap();
        }
        state.record(1, 0.5).unwrap();
        assert_eq!(Ucb1::new().choose(&state), 1);
    }
}
