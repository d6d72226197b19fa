//! # MotoMatch Intake
//!
//! Guided conversation that turns a rider's free-text answers into a browse
//! filter.
//!
//! ```rust
//! use motomatch_intake::{IntakeStage, Session};
//!
//! let mut session = Session::new();
//! session.reply("台中").unwrap();
//! session.reply("5萬").unwrap();
//! assert_eq!(session.stage, IntakeStage::AwaitUsage);
//! ```

pub mod parse;
pub mod session;

pub use parse::{
    parse_abs_preference, parse_budget, parse_location, parse_shipping_preference, parse_usage,
    parse_yes_no, City, ParseFailure, Usage,
};
pub use session::{
    transition, Answer, IntakeAnswers, IntakeError, IntakeStage, Reply, Session, SessionStore,
    DEFAULT_SESSION_TTL_HOURS,
};
