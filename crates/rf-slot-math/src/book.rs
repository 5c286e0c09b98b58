//! Book: the append-only event record of a round

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SlotError};
use crate::wallet::RoundWin;

/// Event kinds emitted by the engine
pub mod events {
    pub const REVEAL: &str = "reveal";
    pub const WIN_INFO: &str = "winInfo";
    pub const FREE_SPIN_TRIGGER: &str = "freeSpinTrigger";
    pub const SUPER_FREE_SPIN_TRIGGER: &str = "superFreeSpinTrigger";
    pub const FREE_SPIN_RETRIGGER: &str = "freeSpinRetrigger";
    pub const SUPER_FREE_SPIN_UPGRADE: &str = "superFreeSpinUpgrade";
    pub const FREE_SPIN_END: &str = "freeSpinEnd";
    pub const FINAL_WIN: &str = "finalWin";
}

/// Receives round events; the engine never reads them back
pub trait OutcomeLog {
    fn add_event(&mut self, kind: &str, data: Value) -> Result<()>;
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEvent {
    /// 1-based position in the book
    pub index: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

/// Event record for one simulated round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub criteria: String,
    pub events: Vec<BookEvent>,
    pub payout_multiplier: f64,
    pub basegame_wins: f64,
    pub freespins_wins: f64,
    #[serde(skip)]
    event_limit: Option<usize>,
}

impl Book {
    pub fn new(id: u64, criteria: impl Into<String>) -> Self {
        Self {
            id,
            criteria: criteria.into(),
            events: Vec::new(),
            payout_multiplier: 0.0,
            basegame_wins: 0.0,
            freespins_wins: 0.0,
            event_limit: None,
        }
    }

    /// Refuse events past `limit`
    pub fn with_event_limit(mut self, limit: usize) -> Self {
        self.event_limit = Some(limit);
        self
    }

    /// Record the round's final figures
    pub fn finalize(&mut self, win: &RoundWin) {
        self.payout_multiplier = win.total;
        self.basegame_wins = win.basegame;
        self.freespins_wins = win.freespins;
    }

    /// Clear events and figures for a replay of the same round id
    pub fn reset(&mut self) {
        self.events.clear();
        self.payout_multiplier = 0.0;
        self.basegame_wins = 0.0;
        self.freespins_wins = 0.0;
    }

    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a BookEvent> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

impl OutcomeLog for Book {
    fn add_event(&mut self, kind: &str, data: Value) -> Result<()> {
        if let Some(limit) = self.event_limit {
            if self.events.len() >= limit {
                return Err(SlotError::Book(format!(
                    "book {} exceeded {limit} events",
                    self.id
                )));
            }
        }
        self.events.push(BookEvent {
            index: self.events.len() as u32 + 1,
            kind: kind.to_string(),
            data,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_are_indexed_from_one() {
        let mut book = Book::new(7, "basegame");
        book.add_event(events::REVEAL, json!({"board": []})).unwrap();
        book.add_event(events::FINAL_WIN, json!({"amount": 0})).unwrap();
        assert_eq!(book.events[0].index, 1);
        assert_eq!(book.events[1].index, 2);
        assert_eq!(book.events_of(events::REVEAL).count(), 1);
    }

    #[test]
    fn test_event_limit() {
        let mut book = Book::new(1, "x").with_event_limit(1);
        book.add_event("a", Value::Null).unwrap();
        assert!(matches!(book.add_event("b", Value::Null), Err(SlotError::Book(_))));
    }

    #[test]
    fn test_serialized_shape() {
        let mut book = Book::new(3, "freespins");
        book.add_event(events::FREE_SPIN_TRIGGER, json!({"amount": 10})).unwrap();
        book.finalize(&RoundWin {
            total: 12.5,
            basegame: 2.5,
            freespins: 10.0,
            capped: false,
        });
        let v = serde_json::to_value(&book).unwrap();
        assert_eq!(v["payoutMultiplier"], json!(12.5));
        assert_eq!(v["events"][0]["type"], json!("freeSpinTrigger"));
        assert!(v.get("eventLimit").is_none());

        book.reset();
        assert!(book.events.is_empty());
        assert_eq!(book.payout_multiplier, 0.0);
    }
}
