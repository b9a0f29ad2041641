//! Initiative scheduling.

use crate::battle::state::TurnRef;
use crate::character::{Combatant, Party};
use crate::enemy::Enemy;
use std::cmp::Reverse;

/// Deterministic tie-break key: side prefix plus combatant id.
fn order_key(turn_ref: &TurnRef) -> String {
    format!("{}{}", turn_ref.kind.order_prefix(), turn_ref.id)
}

/// Builds the schedule for a new battle from every living combatant.
///
/// Faster units go first. Equal speeds fall back to the `p_`/`e_` prefixed id
/// in ascending order, so the result depends on nothing but speeds and ids.
pub fn compute_initial_order(party: &Party, enemies: &[Enemy]) -> Vec<TurnRef> {
    let mut entries: Vec<(u32, TurnRef)> = party
        .living_members()
        .map(|member| (member.stats.speed, TurnRef::party(&member.id)))
        .chain(
            enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| (enemy.stats.speed, TurnRef::enemy(&enemy.id))),
        )
        .collect();

    entries.sort_by_cached_key(|(speed, turn_ref)| (Reverse(*speed), order_key(turn_ref)));
    entries.into_iter().map(|(_, turn_ref)| turn_ref).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, Stats};

    fn with_speed(speed: u32) -> Stats {
        Stats {
            speed,
            ..Stats::new(10, 0)
        }
    }

    #[test]
    fn fallen_units_are_not_scheduled() {
        let mut downed = Character::new("downed", "Downed", "Warrior", 1, with_speed(50));
        downed.stats.hp = 0;
        let party = Party::new(
            "party",
            "player",
            vec![downed, Character::new("up", "Up", "Warrior", 1, with_speed(1))],
        );
        let order = compute_initial_order(&party, &[Enemy::new("slime", "Slime", None, with_speed(2))]);
        assert_eq!(order, vec![TurnRef::enemy("slime"), TurnRef::party("up")]);
    }

    #[test]
    fn speed_ties_sort_by_prefixed_id() {
        let party = Party::new(
            "party",
            "player",
            vec![Character::new("zed", "Zed", "Warrior", 1, with_speed(5))],
        );
        let order = compute_initial_order(&party, &[Enemy::new("alpha", "Alpha", None, with_speed(5))]);
        // "e_alpha" sorts before "p_zed"
        assert_eq!(order, vec![TurnRef::enemy("alpha"), TurnRef::party("zed")]);
    }
}
