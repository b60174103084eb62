// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Candidate peers and deterministic scoring.

use crate::domain::decision::DecisionError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A peer offered for selection, with its evaluation inputs.
///
/// Ephemeral: exists only for the duration of one evaluation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerCandidate {
    pub peer_id: String,
    pub health: f64,
    pub quality: f64,
    pub intent_match: f64,
}

impl PeerCandidate {
    /// Validates that every input lies in `[0, 1]`.
    ///
    /// Out-of-range values (including NaN) are an input error, never silently
    /// clamped, so the scoring contract stays reproducible.
    pub fn validate(&self) -> Result<(), DecisionError> {
        for (name, value) in [
            ("health", self.health),
            ("quality", self.quality),
            ("intent_match", self.intent_match),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DecisionError::InvalidInput(format!(
                    "candidate {}: {} {} outside [0, 1]",
                    self.peer_id, name, value
                )));
            }
        }
        Ok(())
    }

    pub fn score(&self, weights: &ScoreWeights) -> f64 {
        weights.health * self.health
            + weights.quality * self.quality
            + weights.intent_match * self.intent_match
    }
}

/// Weights for the candidate scoring formula. Should sum to 1.
///
/// Intent match is weighted highest by default because it reflects cognitive
/// alignment between the requester and the peer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub health: f64,
    pub quality: f64,
    pub intent_match: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            health: 0.3,
            quality: 0.3,
            intent_match: 0.4,
        }
    }
}

/// A candidate's position in a decision's ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPeer {
    pub peer_id: String,
    pub score: f64,
}

/// Score and rank candidates: descending by score, ties broken by ascending
/// peer id so the result is deterministic.
pub fn rank_candidates(candidates: &[PeerCandidate], weights: &ScoreWeights) -> Vec<RankedPeer> {
    let mut ranked: Vec<RankedPeer> = candidates
        .iter()
        .map(|c| RankedPeer {
            peer_id: c.peer_id.clone(),
            score: c.score(weights),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.peer_id.cmp(&b.peer_id))
    });
    ranked
}

/// Human-readable summary of a ranking, kept on the decision record.
pub fn explain_ranking(ranking: &[RankedPeer], luck_score: f64) -> String {
    let best = ranking.first();
    let resonance = if luck_score >= 0.7 {
        "High resonance"
    } else if luck_score >= 0.4 {
        "Medium resonance"
    } else {
        "Low resonance"
    };

    match best {
        Some(top) if ranking.len() > 1 => format!(
            "{}. Best candidate: {} (score {:.3}) with {} alternatives.",
            resonance,
            top.peer_id,
            top.score,
            ranking.len() - 1
        ),
        Some(top) => format!(
            "{}. Best candidate: {} (score {:.3}), single option.",
            resonance, top.peer_id, top.score
        ),
        None => "No candidates.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(peer_id: &str, health: f64, quality: f64, intent_match: f64) -> PeerCandidate {
        PeerCandidate {
            peer_id: peer_id.to_string(),
            health,
            quality,
            intent_match,
        }
    }

    #[test]
    fn test_score_formula() {
        let c = candidate("peer_a", 0.95, 0.88, 0.92);
        let score = c.score(&ScoreWeights::default());
        assert!((score - 0.917).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(candidate("a", 1.1, 0.5, 0.5).validate().is_err());
        assert!(candidate("a", 0.5, -0.1, 0.5).validate().is_err());
        assert!(candidate("a", 0.5, 0.5, f64::NAN).validate().is_err());
        assert!(candidate("a", 0.0, 1.0, 0.5).validate().is_ok());
    }

    #[test]
    fn test_ranking_descending_by_score() {
        let ranked = rank_candidates(
            &[
                candidate("beta", 0.75, 0.70, 0.65),
                candidate("alpha", 0.95, 0.88, 0.92),
            ],
            &ScoreWeights::default(),
        );
        assert_eq!(ranked[0].peer_id, "alpha");
        assert_eq!(ranked[1].peer_id, "beta");
        assert!((ranked[1].score - 0.695).abs() < 1e-9);
    }

    #[test]
    fn test_tie_broken_by_peer_id() {
        let ranked = rank_candidates(
            &[
                candidate("zeta", 0.5, 0.5, 0.5),
                candidate("alpha", 0.5, 0.5, 0.5),
                candidate("mu", 0.5, 0.5, 0.5),
            ],
            &ScoreWeights::default(),
        );
        let order: Vec<&str> = ranked.iter().map(|r| r.peer_id.as_str()).collect();
        assert_eq!(order, vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_explanation_mentions_best_candidate() {
        let ranked = rank_candidates(
            &[
                candidate("alpha", 0.9, 0.9, 0.9),
                candidate("beta", 0.2, 0.2, 0.2),
            ],
            &ScoreWeights::default(),
        );
        let text = explain_ranking(&ranked, 0.88);
        assert!(text.contains("alpha"));
        assert!(text.contains("High resonance"));
    }
}
