//! Signal combiner — merges named strategy signals into one consensus decision.
//!
//! Each side's vote is the sum of its strengths. The larger vote wins and its
//! strength is the vote divided by the number of participants, neutral
//! strategies included, so abstentions dilute conviction. An exact tie is
//! neutral.

use std::collections::BTreeMap;

use crate::domain::{CombinedSignal, IndicatorSignal, SignalKind};

pub fn combine_signals(signals: &BTreeMap<String, IndicatorSignal>) -> CombinedSignal {
    if signals.is_empty() {
        return CombinedSignal::neutral();
    }

    let mut buy_vote = 0.0;
    let mut sell_vote = 0.0;
    for signal in signals.values() {
        match signal.signal {
            SignalKind::Buy => buy_vote += signal.strength,
            SignalKind::Sell => sell_vote += signal.strength,
            SignalKind::Neutral => {}
        }
    }

    let participants = signals.len() as f64;
    if buy_vote > sell_vote {
        CombinedSignal::new(SignalKind::Buy, buy_vote / participants)
    } else if sell_vote > buy_vote {
        CombinedSignal::new(SignalKind::Sell, sell_vote / participants)
    } else {
        CombinedSignal::neutral()
    }
}

/// Highest-strength contributor on `side`. Equal strengths resolve to the
/// lexicographically first name.
pub fn strongest_voter(
    signals: &BTreeMap<String, IndicatorSignal>,
    side: SignalKind,
) -> Option<(&str, &IndicatorSignal)> {
    let mut best: Option<(&str, &IndicatorSignal)> = None;
    for (name, signal) in signals {
        if signal.signal != side {
            continue;
        }
        match best {
            Some((_, current)) if current.strength >= signal.strength => {}
            _ => best = Some((name.as_str(), signal)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(entries: &[(&str, IndicatorSignal)]) -> BTreeMap<String, IndicatorSignal> {
        entries
            .iter()
            .map(|(name, signal)| (name.to_string(), *signal))
            .collect()
    }

    #[test]
    fn empty_map_is_neutral() {
        let combined = combine_signals(&BTreeMap::new());
        assert_eq!(combined.signal, SignalKind::Neutral);
        assert_eq!(combined.strength, 0.0);
    }

    #[test]
    fn exact_tie_is_neutral() {
        let combined = combine_signals(&signals(&[
            ("a", IndicatorSignal::buy(50.0)),
            ("b", IndicatorSignal::sell(50.0)),
        ]));
        assert_eq!(combined, CombinedSignal::neutral());
    }

    #[test]
    fn all_neutral_is_neutral() {
        let combined = combine_signals(&signals(&[
            ("a", IndicatorSignal::neutral()),
            ("b", IndicatorSignal::neutral()),
        ]));
        assert_eq!(combined, CombinedSignal::neutral());
    }

    #[test]
    fn neutral_participants_dilute_strength() {
        let combined = combine_signals(&signals(&[
            ("a", IndicatorSignal::buy(80.0)),
            ("b", IndicatorSignal::buy(40.0)),
            ("c", IndicatorSignal::sell(30.0)),
            ("d", IndicatorSignal::neutral()),
        ]));
        assert_eq!(combined.signal, SignalKind::Buy);
        assert_eq!(combined.strength, 30.0);
    }

    #[test]
    fn sell_majority_wins() {
        let combined = combine_signals(&signals(&[
            ("a", IndicatorSignal::sell(90.0)),
            ("b", IndicatorSignal::buy(20.0)),
        ]));
        assert_eq!(combined.signal, SignalKind::Sell);
        assert_eq!(combined.strength, 45.0);
    }

    #[test]
    fn single_full_strength_signal_passes_through() {
        let combined = combine_signals(&signals(&[("only", IndicatorSignal::buy(100.0))]));
        assert_eq!(combined, CombinedSignal::new(SignalKind::Buy, 100.0));
    }

    #[test]
    fn strongest_voter_prefers_strength_then_name() {
        let map = signals(&[
            ("zeta", IndicatorSignal::buy(70.0)),
            ("alpha", IndicatorSignal::buy(70.0)),
            ("mid", IndicatorSignal::buy(60.0)),
            ("other", IndicatorSignal::sell(95.0)),
        ]);
        let (name, signal) = strongest_voter(&map, SignalKind::Buy).unwrap();
        assert_eq!(name, "alpha");
        assert_eq!(signal.strength, 70.0);
        assert_eq!(strongest_voter(&map, SignalKind::Sell).unwrap().0, "other");
        assert!(strongest_voter(&map, SignalKind::Neutral).is_none());
    }
}
