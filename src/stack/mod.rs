//! Resolution stack.
//!
//! Everything a command sets in motion (effects, event dispatch, death
//! processing, deathrattles) is resolved by one explicit frame stack per
//! command instead of native recursion. See [`ResolutionStack`] for the
//! ordering contract.
//!
//! ## Example Usage
//!
//! ```
//! use tavern::cards::CardRegistry;
//! use tavern::core::{GameConfig, GameRng, GameState};
//! use tavern::stack::ResolutionStack;
//!
//! let registry = CardRegistry::standard();
//! let config = GameConfig::new();
//! let mut state = GameState::new();
//! let mut rng = GameRng::new(42);
//!
//! let mut stack = ResolutionStack::new(&registry, &config);
//! stack.push_death_check();
//! stack.run(&mut state, &mut rng).unwrap();
//! assert!(stack.is_empty());
//! ```

mod frame;
mod interpreter;

pub use interpreter::ResolutionStack;
