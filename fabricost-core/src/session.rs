//! Quote session: the ordered piece list plus the active mode and rules.
//!
//! A session is owned by one controller (the desktop app or a CLI run). It
//! has no interior synchronization.

use tracing::{debug, info};

use crate::config::Mode;
use crate::error::{QuoteError, Result};
use crate::model::{Piece, PieceInputs, RuleSet};
use crate::pricing::{price, summarize, QuoteSummary};

/// Mutable state of one calculator run.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    mode: Mode,
    rules: RuleSet,
    pieces: Vec<Piece>,
}

impl QuoteSession {
    /// Create an empty session. `rules` are coerced into `mode`'s shape.
    pub fn new(mode: Mode, rules: RuleSet) -> Self {
        Self {
            mode,
            rules: rules.for_mode(mode),
            pieces: Vec::new(),
        }
    }

    /// Create an empty session with factory rules.
    pub fn with_factory_rules(mode: Mode) -> Self {
        Self::new(mode, RuleSet::factory(mode))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Replace the active rules. Existing results were priced under the old
    /// rules, so they are cleared.
    pub fn set_rules(&mut self, rules: RuleSet) {
        let rules = rules.for_mode(self.mode);
        if rules != self.rules {
            self.rules = rules;
            for piece in &mut self.pieces {
                piece.clear_result();
            }
        }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Find a piece by id.
    pub fn piece(&self, id: u32) -> Option<&Piece> {
        self.index_of(id).map(|idx| &self.pieces[idx])
    }

    /// Append a piece and return its id.
    pub fn add_piece(&mut self, inputs: PieceInputs) -> u32 {
        let id = self.pieces.len() as u32 + 1;
        let inputs = self.mode_inputs(inputs);
        self.pieces.push(Piece::new(id, inputs));
        debug!("Added piece {}", id);
        id
    }

    /// Replace a piece's inputs in place. Its result is cleared.
    pub fn update_piece(&mut self, id: u32, inputs: PieceInputs) -> Result<()> {
        let idx = self.index_of(id).ok_or(QuoteError::PieceNotFound { id })?;
        let inputs = self.mode_inputs(inputs);
        self.pieces[idx].set_inputs(inputs);
        debug!("Updated piece {}", id);
        Ok(())
    }

    /// Remove a piece and renumber the rest to a dense 1..N sequence.
    pub fn remove_piece(&mut self, id: u32) -> Result<Piece> {
        let idx = self.index_of(id).ok_or(QuoteError::PieceNotFound { id })?;
        let removed = self.pieces.remove(idx);
        self.renumber();
        debug!("Removed piece {}, {} remaining", id, self.pieces.len());
        Ok(removed)
    }

    /// Drop every piece.
    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    /// Price every piece and return the quote totals.
    pub fn calculate_all(&mut self) -> Result<QuoteSummary> {
        if self.pieces.is_empty() {
            return Err(QuoteError::NoPieces);
        }

        for piece in &mut self.pieces {
            let breakdown = price(&piece.inputs, &self.rules, self.mode);
            debug!(
                "Piece {}: {:.2}h, final {:.4}{}",
                piece.id,
                breakdown.total_hours,
                breakdown.final_price,
                if breakdown.tier_exceeded { " (exceeded)" } else { "" }
            );
            piece.set_result(breakdown);
        }

        let summary = self.summary();
        info!(
            "Calculated {} {} piece(s), total {:.2}",
            summary.priced_pieces, self.mode, summary.total_final_price
        );
        Ok(summary)
    }

    /// Totals over the currently calculated pieces.
    pub fn summary(&self) -> QuoteSummary {
        summarize(&self.pieces)
    }

    /// Check if at least one piece carries a result.
    pub fn has_results(&self) -> bool {
        self.pieces.iter().any(Piece::is_calculated)
    }

    /// Like [`Self::has_results`], but as a precondition for exports.
    pub fn require_results(&self) -> Result<()> {
        if self.has_results() {
            Ok(())
        } else {
            Err(QuoteError::NotCalculated)
        }
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.pieces.iter().position(|p| p.id == id)
    }

    fn renumber(&mut self) {
        for (i, piece) in self.pieces.iter_mut().enumerate() {
            piece.id = i as u32 + 1;
        }
    }

    /// Weight is meaningless without the gram term; keep it at zero.
    fn mode_inputs(&self, inputs: PieceInputs) -> PieceInputs {
        if self.mode.uses_weight() {
            inputs
        } else {
            PieceInputs::time_only(inputs.hours, inputs.minutes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::float_cmp::approx_eq;

    fn session_with(n: u32) -> QuoteSession {
        let mut session = QuoteSession::with_factory_rules(Mode::ThreeD);
        for i in 1..=n {
            session.add_piece(PieceInputs::new(i as f64 * 10.0, i as f64, 0.0));
        }
        session
    }

    fn ids(session: &QuoteSession) -> Vec<u32> {
        session.pieces().iter().map(|p| p.id).collect()
    }

    // ==================== add / update tests ====================

    #[test]
    fn test_add_assigns_sequential_ids() {
        let session = session_with(3);
        assert_eq!(ids(&session), vec![1, 2, 3]);
    }

    #[test]
    fn test_update_clears_result() {
        let mut session = session_with(2);
        session.calculate_all().unwrap();
        assert!(session.piece(2).unwrap().is_calculated());

        session.update_piece(2, PieceInputs::new(5.0, 1.0, 0.0)).unwrap();

        let piece = session.piece(2).unwrap();
        assert!(!piece.is_calculated());
        assert_eq!(piece.inputs.weight_grams, 5.0);
        assert!(session.piece(1).unwrap().is_calculated());
    }

    #[test]
    fn test_update_unknown_piece() {
        let mut session = session_with(1);
        let err = session.update_piece(9, PieceInputs::default()).unwrap_err();
        assert!(matches!(err, QuoteError::PieceNotFound { id: 9 }));
    }

    #[test]
    fn test_laser_session_zeroes_weight() {
        let mut session = QuoteSession::with_factory_rules(Mode::Laser);
        let id = session.add_piece(PieceInputs::new(80.0, 1.0, 30.0));
        assert_eq!(session.piece(id).unwrap().inputs.weight_grams, 0.0);
    }

    // ==================== remove tests ====================

    #[test]
    fn test_remove_renumbers_in_order() {
        let mut session = session_with(4);
        let removed = session.remove_piece(2).unwrap();
        assert_eq!(removed.inputs.weight_grams, 20.0);

        assert_eq!(ids(&session), vec![1, 2, 3]);
        let weights: Vec<f64> = session.pieces().iter().map(|p| p.inputs.weight_grams).collect();
        assert_eq!(weights, vec![10.0, 30.0, 40.0]);
    }

    #[test]
    fn test_remove_last_then_add_reuses_next_id() {
        let mut session = session_with(3);
        session.remove_piece(3).unwrap();
        assert_eq!(session.add_piece(PieceInputs::default()), 3);
    }

    #[test]
    fn test_remove_unknown_piece() {
        let mut session = session_with(2);
        assert!(session.remove_piece(3).is_err());
        assert_eq!(session.len(), 2);
    }

    // ==================== calculate tests ====================

    #[test]
    fn test_calculate_all_requires_pieces() {
        let mut session = QuoteSession::with_factory_rules(Mode::ThreeD);
        let err = session.calculate_all().unwrap_err();
        assert!(matches!(err, QuoteError::NoPieces));
        assert!(!session.has_results());
    }

    #[test]
    fn test_calculate_all_summary() {
        let mut session = QuoteSession::with_factory_rules(Mode::ThreeD);
        session.add_piece(PieceInputs::new(100.0, 2.0, 30.0));
        session.add_piece(PieceInputs::new(0.0, 12.0, 0.0));

        let summary = session.calculate_all().unwrap();

        assert!(approx_eq(summary.total_final_price, 49.8));
        assert_eq!(summary.duration().to_string(), "14h30min");
        assert!(session.pieces().iter().all(Piece::is_calculated));
    }

    #[test]
    fn test_set_rules_clears_results() {
        let mut session = session_with(2);
        session.calculate_all().unwrap();

        session.set_rules(RuleSet {
            markup_percent: 50.0,
            ..RuleSet::FACTORY_3D
        });

        assert!(!session.has_results());
        assert!(session.require_results().is_err());
        assert_eq!(session.rules().markup_percent, 50.0);
    }

    #[test]
    fn test_set_same_rules_keeps_results() {
        let mut session = session_with(1);
        session.calculate_all().unwrap();
        session.set_rules(RuleSet::FACTORY_3D);
        assert!(session.has_results());
    }

    #[test]
    fn test_laser_session_normalizes_rules() {
        let session = QuoteSession::new(Mode::Laser, RuleSet::FACTORY_3D);
        assert_eq!(*session.rules(), RuleSet::laser(3.0, 20.0));
    }
}
