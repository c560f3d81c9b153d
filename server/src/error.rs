//! Rejections raised by simulation operations.
//!
//! None of these are fatal: the tick logs them and moves on to the next
//! command or entity.

use shared::PowerUpKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("player {0} does not exist")]
    MissingPlayer(u32),

    #[error("action is on cooldown")]
    OnCooldown,

    #[error("inventory slot {0} does not exist")]
    InvalidSlot(usize),

    #[error("inventory slot {0} is empty")]
    EmptySlot(usize),

    #[error("shot angle is not a finite number")]
    InvalidAim,

    #[error("no weapon equipped to drop")]
    NothingToDrop,

    #[error("inventory is full")]
    InventoryFull,

    #[error("{} power-up is already active", .0.name())]
    PowerUpAlreadyActive(PowerUpKind),

    #[error("power-up limit of {0} reached")]
    PowerUpCapReached(usize),
}
