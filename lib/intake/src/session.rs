//! Intake session: a finite-state conversation plus the rider's browsing trail

use crate::parse::{
    parse_abs_preference, parse_budget, parse_location, parse_shipping_preference, parse_usage,
    City, ParseFailure, Usage,
};
use chrono::{DateTime, Duration, Utc};
use motomatch_core::{ItemFilter, ItemId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntakeError {
    #[error("Could not understand the answer: {0}")]
    Parse(#[from] ParseFailure),

    #[error("Intake is already complete")]
    AlreadyComplete,
}

/// Where the conversation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    #[default]
    AwaitLocation,
    AwaitBudget,
    AwaitUsage,
    AwaitAbsPreference,
    AwaitShippingPreference,
    Complete,
}

impl IntakeStage {
    /// Question asked in this stage
    pub fn prompt(&self) -> &'static str {
        match self {
            IntakeStage::AwaitLocation => "請問您在哪個城市看車？(例如：台北、台中、高雄)",
            IntakeStage::AwaitBudget => "您的預算大約多少？(例如：5萬、80000)",
            IntakeStage::AwaitUsage => "主要用途是什麼？通勤、運動還是休閒？",
            IntakeStage::AwaitAbsPreference => "需要 ABS 防鎖死煞車嗎？",
            IntakeStage::AwaitShippingPreference => "可以接受從外縣市分店調車嗎？",
            IntakeStage::Complete => "條件收集完成，為您挑選車款！",
        }
    }

    pub fn next(self) -> Self {
        match self {
            IntakeStage::AwaitLocation => IntakeStage::AwaitBudget,
            IntakeStage::AwaitBudget => IntakeStage::AwaitUsage,
            IntakeStage::AwaitUsage => IntakeStage::AwaitAbsPreference,
            IntakeStage::AwaitAbsPreference => IntakeStage::AwaitShippingPreference,
            IntakeStage::AwaitShippingPreference | IntakeStage::Complete => IntakeStage::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, IntakeStage::Complete)
    }
}

/// A single accepted answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Location(City),
    Budget(f64),
    Usage(Usage),
    NeedsAbs(bool),
    AcceptsShipping(bool),
}

/// Parse `input` as the answer expected in `stage`
///
/// Pure transition function: returns the next stage and the parsed answer,
/// or the failure that keeps the conversation where it is.
pub fn transition(stage: IntakeStage, input: &str) -> Result<(IntakeStage, Answer), IntakeError> {
    let answer = match stage {
        IntakeStage::AwaitLocation => Answer::Location(parse_location(input)?),
        IntakeStage::AwaitBudget => Answer::Budget(parse_budget(input)?),
        IntakeStage::AwaitUsage => Answer::Usage(parse_usage(input)?),
        IntakeStage::AwaitAbsPreference => Answer::NeedsAbs(parse_abs_preference(input)?),
        IntakeStage::AwaitShippingPreference => {
            Answer::AcceptsShipping(parse_shipping_preference(input)?)
        }
        IntakeStage::Complete => return Err(IntakeError::AlreadyComplete),
    };
    Ok((stage.next(), answer))
}

/// Answers collected so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeAnswers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<City>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_abs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepts_shipping: Option<bool>,
}

impl IntakeAnswers {
    pub fn record(&mut self, answer: Answer) {
        match answer {
            Answer::Location(city) => self.location = Some(city),
            Answer::Budget(budget) => self.budget = Some(budget),
            Answer::Usage(usage) => self.usage = Some(usage),
            Answer::NeedsAbs(abs) => self.needs_abs = Some(abs),
            Answer::AcceptsShipping(shipping) => self.accepts_shipping = Some(shipping),
        }
    }

    /// Browse filter implied by the answers
    ///
    /// The location only narrows results when the rider will not take a
    /// bike shipped from another store.
    pub fn to_filter(&self) -> ItemFilter {
        let mut filter = ItemFilter::new().with_abs(self.needs_abs.unwrap_or(false));
        if let Some(budget) = self.budget {
            filter = filter.with_max_price(budget);
        }
        if let Some(usage) = self.usage {
            filter = filter.with_styles([usage.style()]);
        }
        if let (Some(city), false) = (self.location, self.accepts_shipping.unwrap_or(false)) {
            filter = filter.with_location(city.name());
        }
        filter
    }
}

/// Outcome of a successful reply
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub accepted: Answer,
    pub stage: IntakeStage,
    pub prompt: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub stage: IntakeStage,
    pub answers: IntakeAnswers,
    /// Liked listings, first like first
    pub liked: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clicked: Option<ItemId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: IntakeStage::default(),
            answers: IntakeAnswers::default(),
            liked: Vec::new(),
            last_clicked: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current question
    pub fn prompt(&self) -> &'static str {
        self.stage.prompt()
    }

    pub fn is_complete(&self) -> bool {
        self.stage.is_complete()
    }

    /// Feed one free-text answer; on failure the stage does not move
    pub fn reply(&mut self, input: &str) -> Result<Reply, IntakeError> {
        let (stage, accepted) = transition(self.stage, input)?;
        self.answers.record(accepted);
        self.stage = stage;
        self.touch();

        Ok(Reply {
            accepted,
            stage,
            prompt: stage.prompt(),
        })
    }

    /// Filter for matching listings, once every question is answered
    pub fn filter(&self) -> Option<ItemFilter> {
        self.is_complete().then(|| self.answers.to_filter())
    }

    /// Returns false when the listing was already liked
    pub fn like(&mut self, id: ItemId) -> bool {
        if self.liked.contains(&id) {
            return false;
        }
        self.liked.push(id);
        self.touch();
        true
    }

    /// Returns false when the listing was not liked
    pub fn unlike(&mut self, id: ItemId) -> bool {
        let before = self.liked.len();
        self.liked.retain(|liked| *liked != id);
        let removed = self.liked.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn is_liked(&self, id: ItemId) -> bool {
        self.liked.contains(&id)
    }

    pub fn click(&mut self, id: ItemId) {
        self.last_clicked = Some(id);
        self.touch();
    }

    /// Restart the conversation, keeping likes
    pub fn restart(&mut self) {
        self.stage = IntakeStage::default();
        self.answers = IntakeAnswers::default();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Idle time after which a session is dropped when none is given
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// In-memory session registry
///
/// Sessions untouched for longer than the TTL are swept whenever a new
/// session is created, so abandoned conversations do not pile up.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a new session and return a copy of it
    pub fn create(&self) -> Session {
        self.evict_idle(self.ttl);
        let session = Session::new();
        debug!(session = %session.id, "session created");
        self.sessions.write().insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.sessions.read().get(id).cloned()
    }

    /// Mutate a session in place; `None` if it does not exist
    pub fn update<F, T>(&self, id: &Uuid, f: F) -> Option<T>
    where
        F: FnOnce(&mut Session) -> T,
    {
        self.sessions.write().get_mut(id).map(f)
    }

    pub fn remove(&self, id: &Uuid) -> Option<Session> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            debug!(session = %id, "session removed");
        }
        removed
    }

    /// Drop sessions whose last update is older than `max_idle`
    ///
    /// Returns how many sessions were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at >= cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
