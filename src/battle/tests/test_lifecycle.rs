#[cfg(test)]
mod tests {
    use crate::battle::ai::FirstLivingTarget;
    use crate::battle::engine::{
        advance_turn, execute_ability, process_command, recompute_state, start_battle, Resolution,
    };
    use crate::battle::state::{ActionFailureReason, Battle};
    use crate::battle::tests::common::{
        ability, create_test_battle, create_test_party, TestUnitBuilder, TEST_PLAYER,
    };
    use crate::battle::validation::CommandRejection;
    use crate::character::Party;
    use crate::errors::BattleStateError;
    use crate::{BattleStatus, TargetType};
    use pretty_assertions::assert_eq;

    fn count_lines(battle: &Battle, line: &str) -> usize {
        battle.log.iter().filter(|l| l.as_str() == line).count()
    }

    fn duel(slime_hp: u32) -> (Battle, Party) {
        let mut party = create_test_party(vec![
            TestUnitBuilder::new("aria", "Aria")
                .with_speed(10)
                .with_strength(10)
                .build_character(),
            TestUnitBuilder::new("sable", "Sable").with_speed(8).build_character(),
        ]);
        let slime = TestUnitBuilder::new("slime", "Slime").with_max_hp(slime_hp).build_enemy();
        let battle = create_test_battle(&mut party, vec![slime]);
        (battle, party)
    }

    #[test]
    fn test_victory_is_logged_once() {
        let (mut battle, mut party) = duel(10);

        let resolution = process_command(
            &mut battle,
            &mut party,
            TEST_PLAYER,
            &ability("aria", Some("slime"), "basic_attack"),
            &FirstLivingTarget,
        );

        assert_eq!(resolution, Ok(Resolution::Resolved));
        assert_eq!(battle.state, BattleStatus::Victory);
        assert_eq!(battle.log.last().map(String::as_str), Some("Victory!"));
        assert_eq!(count_lines(&battle, "Victory!"), 1);

        let again = process_command(
            &mut battle,
            &mut party,
            TEST_PLAYER,
            &ability("aria", Some("slime"), "basic_attack"),
            &FirstLivingTarget,
        );
        assert_eq!(again, Err(CommandRejection::NotInProgress));
        assert_eq!(count_lines(&battle, "Victory!"), 1);
    }

    #[test]
    fn test_party_wipe_is_a_defeat() {
        let mut party = create_test_party(vec![TestUnitBuilder::new("aria", "Aria").build_character()]);
        let ogre = TestUnitBuilder::new("ogre", "Ogre")
            .with_speed(20)
            .with_strength(50)
            .build_enemy();

        let battle = create_test_battle(&mut party, vec![ogre]);

        assert_eq!(battle.state, BattleStatus::Defeat);
        assert_eq!(
            battle.log,
            vec![
                "Battle started against Ogre.",
                "Ogre used Attack on Aria -54 HP",
                "Defeat.",
            ]
        );
    }

    #[test]
    fn test_mutual_knockout_resolves_as_defeat() {
        let (mut battle, mut party) = duel(20);
        party.members.iter_mut().for_each(|m| m.stats.hp = 0);
        battle.enemies[0].stats.hp = 0;

        advance_turn(&mut battle, &party);

        assert_eq!(battle.state, BattleStatus::Defeat);
        assert_eq!(count_lines(&battle, "Defeat."), 1);
        assert_eq!(count_lines(&battle, "Victory!"), 0);
        assert!(battle.turn_order.is_empty());
        assert_eq!(battle.active_turn_index, 0);
    }

    #[test]
    fn test_terminal_state_never_changes() {
        let (mut battle, party) = duel(20);
        battle.state = BattleStatus::Victory;
        assert_eq!(recompute_state(&mut battle, &party), BattleStatus::Victory);
    }

    #[test]
    fn test_flee_always_ends_in_defeat() {
        let (mut battle, mut party) = duel(1);

        let resolution = process_command(
            &mut battle,
            &mut party,
            TEST_PLAYER,
            &ability("aria", None, "flee"),
            &FirstLivingTarget,
        );

        assert_eq!(resolution, Ok(Resolution::Fled));
        assert_eq!(battle.state, BattleStatus::Defeat);
        assert_eq!(battle.log.last().map(String::as_str), Some("Aria fled the battle."));
        assert_eq!(party.members[0].stats.hp, 30);
        assert_eq!(battle.enemies[0].stats.hp, 1);
    }

    #[test]
    fn test_finished_battle_ignores_execution() {
        let (mut battle, mut party) = duel(20);
        battle.state = BattleStatus::Defeat;
        let log_len = battle.log.len();

        let resolution = execute_ability(&mut battle, &mut party, &ability("aria", Some("slime"), "basic_attack"));

        assert_eq!(resolution, Resolution::Ignored);
        assert_eq!(battle.enemies[0].stats.hp, 20);
        assert_eq!(battle.log.len(), log_len);
    }

    #[test]
    fn test_executor_soft_fails_off_turn() {
        let (mut battle, mut party) = duel(20);

        let resolution = execute_ability(&mut battle, &mut party, &ability("sable", Some("slime"), "basic_attack"));

        assert_eq!(
            resolution,
            Resolution::Failed(ActionFailureReason::NotActiveUnit {
                unit: "sable".to_string()
            })
        );
        assert_eq!(battle.state, BattleStatus::InProgress);
        assert_eq!(battle.enemies[0].stats.hp, 20);
        assert_eq!(
            battle.log.last().map(String::as_str),
            Some("Action failed: it is not sable's turn.")
        );
    }

    #[test]
    fn test_executor_soft_fails_on_missing_target() {
        let (mut battle, mut party) = duel(20);

        let resolution = execute_ability(&mut battle, &mut party, &ability("aria", Some("ghost"), "basic_attack"));

        assert_eq!(resolution, Resolution::Failed(ActionFailureReason::MissingUnit));
        assert_eq!(
            battle.log.last().map(String::as_str),
            Some("Action failed: missing source/target.")
        );
        assert!(battle.is_in_progress());
    }

    #[test]
    fn test_executor_soft_fails_without_mp() {
        let (mut battle, mut party) = duel(20);
        party.members[0].stats.mp = 1;

        let resolution = execute_ability(&mut battle, &mut party, &ability("aria", Some("slime"), "ember_strike"));

        assert_eq!(
            resolution,
            Resolution::Failed(ActionFailureReason::InsufficientMp {
                unit: "Aria".to_string(),
                ability: "Ember Strike".to_string(),
            })
        );
        assert_eq!(party.members[0].stats.mp, 1);
        assert_eq!(battle.enemies[0].stats.hp, 20);
    }

    #[test]
    fn test_executor_refuses_multi_target_abilities() {
        let mut party = create_test_party(vec![
            TestUnitBuilder::new("sable", "Sable")
                .with_class("Sage")
                .with_speed(10)
                .with_magic(10)
                .with_hp(10)
                .build_character(),
            TestUnitBuilder::new("aria", "Aria").with_speed(8).with_hp(10).build_character(),
        ]);
        let enemies = vec![
            TestUnitBuilder::new("slime", "Slime").with_max_hp(50).build_enemy(),
            TestUnitBuilder::new("bat", "Bat").with_max_hp(50).build_enemy(),
        ];
        let mut battle = create_test_battle(&mut party, enemies);

        let cases = [
            (ability("sable", Some("slime"), "inferno_wave"), "Inferno Wave", TargetType::EnemyAll),
            (ability("sable", Some("aria"), "sanctuary"), "Sanctuary", TargetType::Party),
            (ability("sable", None, "sanctuary"), "Sanctuary", TargetType::Party),
        ];
        for (command, name, target_type) in cases {
            let resolution = execute_ability(&mut battle, &mut party, &command);

            assert_eq!(
                resolution,
                Resolution::Failed(ActionFailureReason::UnsupportedTargetType {
                    ability: name.to_string(),
                    target_type,
                })
            );
            assert_eq!(battle.enemies[0].stats.hp, 50);
            assert_eq!(battle.enemies[1].stats.hp, 50);
            assert_eq!(party.members[0].stats.hp, 10);
            assert_eq!(party.members[1].stats.hp, 10);
            assert_eq!(party.members[0].stats.mp, 20);
            assert!(party.members.iter().all(|m| m.status_effects.is_empty()));
            assert_eq!(battle.active_ref().map(|r| r.id.as_str()), Some("sable"));
            assert!(battle.is_in_progress());
        }
    }

    #[test]
    fn test_battle_with_no_living_party_starts_defeated() {
        let mut party = create_test_party(vec![TestUnitBuilder::new("aria", "Aria").with_hp(0).build_character()]);
        let slime = TestUnitBuilder::new("slime", "Slime").with_speed(5).build_enemy();

        let battle = create_test_battle(&mut party, vec![slime]);

        assert_eq!(battle.state, BattleStatus::Defeat);
        assert_eq!(count_lines(&battle, "Defeat."), 1);
        assert!(!battle.log.iter().any(|line| line.starts_with("Slime used")));
    }

    #[test]
    fn test_nobody_schedulable_leaves_an_empty_order() {
        let mut party = create_test_party(vec![TestUnitBuilder::new("aria", "Aria").with_hp(0).build_character()]);
        let slime = TestUnitBuilder::new("slime", "Slime").with_hp(0).build_enemy();

        let battle = create_test_battle(&mut party, vec![slime]);

        assert_eq!(battle.state, BattleStatus::Defeat);
        assert!(battle.turn_order.is_empty());
        assert_eq!(battle.active_ref(), None);
    }

    #[test]
    fn test_malformed_rosters_are_rejected() {
        let slime = || TestUnitBuilder::new("slime", "Slime").build_enemy();

        let mut empty = create_test_party(vec![]);
        assert_eq!(
            start_battle("b".to_string(), &mut empty, vec![slime()]).unwrap_err(),
            BattleStateError::EmptyParty("party-1".to_string())
        );

        let mut party = create_test_party(vec![TestUnitBuilder::new("aria", "Aria").build_character()]);
        assert_eq!(
            start_battle("b".to_string(), &mut party, vec![]).unwrap_err(),
            BattleStateError::NoEnemies
        );

        let impostor = TestUnitBuilder::new("aria", "Mimic").build_enemy();
        assert_eq!(
            start_battle("b".to_string(), &mut party, vec![slime(), impostor]).unwrap_err(),
            BattleStateError::DuplicateCombatantId("aria".to_string())
        );
    }
}
