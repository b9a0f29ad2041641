// Crystal Battle Schema - Shared type definitions
// This crate contains the static enums shared by the battle engine, its data
// files and any client that renders battle snapshots.

pub use battle_types::*;
pub use elements::*;
pub use targeting::*;

pub mod battle_types;
pub mod elements;
pub mod targeting;
