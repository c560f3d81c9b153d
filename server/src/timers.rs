//! One-shot timers owned by the simulation actor
//!
//! Delayed effects (power-up expiry, cooldown resets, burn damage, pickup
//! spawning) are queued here instead of running on independent runtime
//! timers. The server loop sleeps until the earliest deadline and then feeds
//! the due events back into `GameState`, so every mutation happens on the
//! same task as the tick.

use shared::PowerUpKind;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    EffectExpired { player_id: u32, kind: PowerUpKind },
    ShootReady { player_id: u32 },
    PunchReady { player_id: u32 },
    Burn { target_id: u32, shooter_id: u32 },
    SpawnPowerUp,
    SpawnWeapon,
}

impl TimerEvent {
    /// Player whose existence the event depends on, if any
    pub fn player_id(&self) -> Option<u32> {
        match *self {
            TimerEvent::EffectExpired { player_id, .. }
            | TimerEvent::ShootReady { player_id }
            | TimerEvent::PunchReady { player_id } => Some(player_id),
            TimerEvent::Burn { target_id, .. } => Some(target_id),
            TimerEvent::SpawnPowerUp | TimerEvent::SpawnWeapon => None,
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    due: u64,
    // Insertion order breaks ties so equal deadlines fire FIFO
    seq: u64,
    event: TimerEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due, seq, event }));
    }

    /// Pops the earliest event whose deadline is at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<TimerEvent> {
        match self.heap.peek() {
            Some(Reverse(next)) if next.due <= now => self.heap.pop().map(|Reverse(s)| s.event),
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(next)| next.due)
    }

    /// Drops every pending timer that targets `player_id`
    pub fn cancel_player(&mut self, player_id: u32) {
        self.heap
            .retain(|Reverse(scheduled)| scheduled.event.player_id() != Some(player_id));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
