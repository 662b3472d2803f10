//! Pure tier transitions for the walk game.

use cg_core::{Tier, WalkTier};

use crate::config::WalkRules;

/// Outcome of the transition rules for one previous session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The next tier is settled.
    Settled(WalkTier, &'static str),
    /// A loss at the hardest tier; needs a severity analysis.
    HardLoss,
}

/// Apply the rules to the previous session.
///
/// `previous` is the tier and victory flag of the last session, `None` for a
/// new user. A new calendar day restarts at easy.
pub fn transition(previous: Option<(WalkTier, bool)>, new_day: bool) -> Transition {
    let Some((tier, victory)) = previous else {
        return Transition::Settled(WalkTier::Tutorial, "first session is the tutorial");
    };
    match (tier, victory) {
        (WalkTier::Tutorial, _) => Transition::Settled(WalkTier::Easy, "tutorial is played once"),
        _ if new_day => Transition::Settled(WalkTier::Easy, "new day restarts at easy"),
        (WalkTier::Hard, true) => Transition::Settled(WalkTier::Hard, "won at the hardest tier"),
        (t, true) => Transition::Settled(t.step_up(), "won the last session"),
        (WalkTier::Hard, false) => Transition::HardLoss,
        (WalkTier::Medium, false) => Transition::Settled(WalkTier::Easy, "lost at medium"),
        (t, false) => Transition::Settled(t, "lost the last session"),
    }
}

/// Deterministic severity analysis after a hard loss.
pub fn fallback_tier(avg_precision: f64, rules: &WalkRules) -> WalkTier {
    if avg_precision < rules.severe_below {
        WalkTier::Easy
    } else if avg_precision < rules.moderate_below {
        WalkTier::Medium
    } else {
        WalkTier::Hard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(t: Transition) -> WalkTier {
        match t {
            Transition::Settled(tier, _) => tier,
            Transition::HardLoss => panic!("expected a settled tier"),
        }
    }

    #[test]
    fn empty_history_is_tutorial() {
        assert_eq!(settled(transition(None, false)), WalkTier::Tutorial);
    }

    #[test]
    fn tutorial_is_never_repeated() {
        assert_eq!(settled(transition(Some((WalkTier::Tutorial, false)), false)), WalkTier::Easy);
        assert_eq!(settled(transition(Some((WalkTier::Tutorial, true)), false)), WalkTier::Easy);
    }

    #[test]
    fn victories_promote_to_hard() {
        assert_eq!(settled(transition(Some((WalkTier::Easy, true)), false)), WalkTier::Medium);
        assert_eq!(settled(transition(Some((WalkTier::Medium, true)), false)), WalkTier::Hard);
        assert_eq!(settled(transition(Some((WalkTier::Hard, true)), false)), WalkTier::Hard);
    }

    #[test]
    fn losses() {
        assert_eq!(settled(transition(Some((WalkTier::Easy, false)), false)), WalkTier::Easy);
        assert_eq!(settled(transition(Some((WalkTier::Medium, false)), false)), WalkTier::Easy);
        assert_eq!(transition(Some((WalkTier::Hard, false)), false), Transition::HardLoss);
    }

    #[test]
    fn new_day_restarts_at_easy() {
        assert_eq!(settled(transition(Some((WalkTier::Hard, true)), true)), WalkTier::Easy);
        assert_eq!(settled(transition(Some((WalkTier::Hard, false)), true)), WalkTier::Easy);
    }

    #[test]
    fn severity_cut_points() {
        let rules = WalkRules::default();
        assert_eq!(fallback_tier(10.0, &rules), WalkTier::Easy);
        assert_eq!(fallback_tier(30.0, &rules), WalkTier::Medium);
        assert_eq!(fallback_tier(59.9, &rules), WalkTier::Medium);
        assert_eq!(fallback_tier(60.0, &rules), WalkTier::Hard);
    }
}
