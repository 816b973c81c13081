mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::geometry::Point;
use crate::input::{PointerInteraction, TriggerPredicate};

/// Coordinates and time of the most recent qualifying interaction in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturedContext {
    pub timestamp: u64,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextQuery {
    pub has_context: bool,
    pub timestamp: u64,
    pub age_ms: u64,
}

/// Per-frame observer of pointer interactions.
///
/// Holds a single slot that every qualifying interaction overwrites. The
/// agent never consumes the event; the host page sees it unchanged.
#[derive(Debug, Clone)]
pub struct CaptureAgent {
    trigger: TriggerPredicate,
    ttl_ms: u64,
    last: Option<CapturedContext>,
}

impl CaptureAgent {
    pub fn new(trigger: TriggerPredicate, ttl_ms: u64) -> Self {
        Self {
            trigger,
            ttl_ms,
            last: None,
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Records `interaction` when it matches the trigger. Returns whether it did.
    pub fn capture(&mut self, interaction: &PointerInteraction, now_ms: u64) -> bool {
        if !self.trigger.matches(interaction) {
            return false;
        }
        self.last = Some(CapturedContext {
            timestamp: now_ms,
            position: interaction.position,
        });
        tracing::trace!(
            timestamp = now_ms,
            x = interaction.position.x,
            y = interaction.position.y,
            "captured pointer context"
        );
        true
    }

    pub fn query(&self, now_ms: u64) -> ContextQuery {
        match self.fresh_context(now_ms) {
            Some(context) => ContextQuery {
                has_context: true,
                timestamp: context.timestamp,
                age_ms: now_ms.saturating_sub(context.timestamp),
            },
            None => ContextQuery::default(),
        }
    }

    pub fn fresh_context(&self, now_ms: u64) -> Option<CapturedContext> {
        self.last
            .filter(|context| now_ms.saturating_sub(context.timestamp) <= self.ttl_ms)
    }

    pub fn last_context(&self) -> Option<CapturedContext> {
        self.last
    }
}
