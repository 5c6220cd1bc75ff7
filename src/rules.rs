// Threshold rules evaluated against an entity's metrics

use crate::error::Result;
use crate::event::{Action, Event, EventType};
use crate::metrics::Storage;
use std::fmt;
use std::sync::Arc;

/// Comparison direction for a threshold rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Above,
    Below,
}

impl Op {
    /// Parse the operator as written in config
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            ">" => Ok(Op::Above),
            "<" => Ok(Op::Below),
            other => Err(anyhow::anyhow!("Unknown rule operator '{}', expected '>' or '<'", other)),
        }
    }

    fn breached(&self, value: f64, threshold: f64) -> bool {
        match self {
            Op::Above => value > threshold,
            Op::Below => value < threshold,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Above => ">",
            Op::Below => "<",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleState {
    Ok,
    Tripped,
}

/// A threshold rule over one metric series. Trips only after `cycles`
/// consecutive breaching samples, fires once on trip, stays silent while
/// tripped, and fires once more when the value recovers.
pub struct Rule {
    family: String,
    name: String,
    op: Op,
    threshold: f64,
    cycles: u32,
    streak: u32,
    state: RuleState,
    actions: Vec<Arc<dyn Action>>,
}

impl Rule {
    pub fn new(
        family: impl Into<String>,
        name: impl Into<String>,
        op: Op,
        threshold: f64,
        cycles: u32,
        actions: Vec<Arc<dyn Action>>,
    ) -> Self {
        Self {
            family: family.into(),
            name: name.into(),
            op,
            threshold,
            cycles: cycles.max(1),
            streak: 0,
            state: RuleState::Ok,
            actions,
        }
    }

    /// Actions to trigger for every event this rule yields, in order
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Inspect the latest sample and advance the rule's state machine.
    /// A missing metric resets the breach streak and yields nothing.
    pub fn check(&mut self, store: &Storage, source: &str, owner: &str) -> Option<Event> {
        let Some(value) = store.get(&self.family, &self.name) else {
            self.streak = 0;
            return None;
        };

        if self.op.breached(value, self.threshold) {
            self.streak += 1;
            if self.state == RuleState::Ok && self.streak >= self.cycles {
                self.state = RuleState::Tripped;
                return Some(Event::new(
                    EventType::RuleFailed,
                    source,
                    owner,
                    Some(format!("{} is {:.2} (threshold {} {})", self.metric(), value, self.op, self.threshold)),
                ));
            }
        } else {
            self.streak = 0;
            if self.state == RuleState::Tripped {
                self.state = RuleState::Ok;
                return Some(Event::new(
                    EventType::RuleRecovered,
                    source,
                    owner,
                    Some(format!("{} is back within threshold at {:.2}", self.metric(), value)),
                ));
            }
        }
        None
    }

    fn metric(&self) -> String {
        if self.name.is_empty() {
            self.family.clone()
        } else {
            format!("{}({})", self.family, self.name)
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("metric", &self.metric())
            .field("op", &self.op)
            .field("threshold", &self.threshold)
            .field("cycles", &self.cycles)
            .field("streak", &self.streak)
            .field("state", &self.state)
            .finish()
    }
}
