//! Boundary Rule Engine
//!
//! Decides where a set-piece episode ends. A candidate window (row 0 is the
//! restart, the attacking team is row 0's team) is run through ten
//! independent termination predicates in a fixed order.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BoundaryRuleEngine                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RuleContext { window, lookahead, roster, thresholds }      │
//! │                          │                                  │
//! │   Vec<Box<dyn BoundaryCheck>>  (fixed order, first wins)    │
//! │                          │                                  │
//! │   BoundaryMatch { rule, boundary_id, boundary_index }       │
//! │     or EpisodeError::BoundaryNotFound { restart_id }        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```ignore
//! let engine = BoundaryRuleEngine::new(config.rules.clone());
//! let window = extract_window(&log, restart_id, 25, true)?;
//! let wide = extract_window(&log, restart_id, 10, false)?;
//! let found = engine.evaluate(&window, Some(&wide), &roster)?;
//! println!("{} ended at {}", found.rule, found.boundary_id);
//! ```

mod checks;
mod engine;
mod types;

pub use checks::{
    standard_checks, AttackReset, BallOutOfPlay, ChangedPossession, EffectiveClearance,
    EndOfPeriod, FoulCommitted, GoalScored, GoalkeeperSave, NewSetPiece, OffsideCalled,
};
pub use engine::BoundaryRuleEngine;
pub use types::{
    BoundaryCheck, BoundaryMatch, BoundaryRule, RuleContext, RuleEvaluationStats, RuleVerdict,
};
