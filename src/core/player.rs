//! Players: identity, the two seats, and the resources a player owns.
//!
//! ## PlayerId
//!
//! Seat index, `0` or `1`. Seat 0 always takes the first turn.
//!
//! ## PlayerMap
//!
//! One value per seat, indexed by `PlayerId`.
//!
//! ## Player
//!
//! Hero, hero power, weapon slot, mana counters and fatigue. Zones are
//! held by the `ZoneManager`, keyed by player.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::core::entity::EntityId;

/// Player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Both seats, in turn order.
    pub const BOTH: [PlayerId; 2] = [PlayerId(0), PlayerId(1)];

    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Seat index, `0` or `1`.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 & 1) as usize
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - (self.0 & 1))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// One value per seat.
///
/// ```
/// use tavern::core::{PlayerId, PlayerMap};
///
/// let mut fatigue: PlayerMap<i32> = PlayerMap::from_fn(|_| 0);
/// fatigue[PlayerId::new(1)] += 1;
/// assert_eq!(fatigue[PlayerId::new(1)], 1);
/// assert_eq!(fatigue[PlayerId::new(1).opponent()], 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    seats: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Build both entries from the seat id.
    pub fn from_fn(mut factory: impl FnMut(PlayerId) -> T) -> Self {
        Self {
            seats: [factory(PlayerId(0)), factory(PlayerId(1))],
        }
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.seats[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.seats[player.index()]
    }

    /// Both entries in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::BOTH.into_iter().zip(self.seats.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::BOTH.into_iter().zip(self.seats.iter_mut())
    }
}

impl<T: Default> Default for PlayerMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

/// Resources owned by one player.
///
/// Hero and hero power are fixed for the whole game; the weapon slot is
/// replaced on equip and cleared when the weapon breaks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hero: EntityId,
    pub power: EntityId,
    pub weapon: Option<EntityId>,
    pub max_mana: i32,
    pub used_mana: i32,
    /// Mana available for the current turn only (The Coin).
    pub temp_mana: i32,
    pub fatigue: i32,
    pub mulligan_done: bool,
    pub power_used: bool,
    pub lost: bool,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>, hero: EntityId, power: EntityId) -> Self {
        Self {
            name: name.into(),
            hero,
            power,
            weapon: None,
            max_mana: 0,
            used_mana: 0,
            temp_mana: 0,
            fatigue: 0,
            mulligan_done: false,
            power_used: false,
            lost: false,
        }
    }

    /// Mana left to spend this turn.
    #[must_use]
    pub fn mana(&self) -> i32 {
        (self.max_mana + self.temp_mana - self.used_mana).max(0)
    }

    /// Spend mana, consuming temporary crystals first.
    pub fn spend(&mut self, amount: i32) {
        let from_temp = amount.min(self.temp_mana).max(0);
        self.temp_mana -= from_temp;
        self.used_mana += amount - from_temp;
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
