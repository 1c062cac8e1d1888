//! Point-in-time notifications for presentation layers.
//!
//! The engine never holds a reference to UI code. Hosts register listeners
//! on the session's [`EventBus`] and receive each [`CombatEvent`]
//! synchronously, in registration order, at the moment it happens.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BattleOutcome, Faction, UnitId};

/// Events emitted during a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CombatEvent {
    #[serde(rename_all = "camelCase")]
    UnitAdded { unit: UnitId, faction: Faction },
    #[serde(rename_all = "camelCase")]
    EnemiesSpawned { units: Vec<UnitId> },
    #[serde(rename_all = "camelCase")]
    BattleOrderComputed { order: Vec<UnitId> },
    BattleStarted,
    #[serde(rename_all = "camelCase")]
    UnitActionStart { unit: UnitId },
    #[serde(rename_all = "camelCase")]
    UnitActionEnd { unit: UnitId },
    /// Sent for every acting unit, with `target: None` when nothing was in reach.
    #[serde(rename_all = "camelCase")]
    UnitAttacked {
        attacker: UnitId,
        target: Option<UnitId>,
        damage: i32,
        remaining_hp: Option<i32>,
    },
    /// `on_death` carries the OnDeathTrigger magnitude when the unit has
    /// that trait; the host decides what it does.
    #[serde(rename_all = "camelCase")]
    UnitDied {
        unit: UnitId,
        on_death: Option<i32>,
    },
    #[serde(rename_all = "camelCase")]
    BattleEnded { outcome: BattleOutcome },
}

/// Receives combat events as they happen.
pub trait BattleListener {
    fn on_event(&mut self, event: &CombatEvent);
}

impl<F> BattleListener for F
where
    F: FnMut(&CombatEvent),
{
    fn on_event(&mut self, event: &CombatEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Synchronous publish/subscribe dispatcher.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn BattleListener>)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: BattleListener + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &CombatEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
