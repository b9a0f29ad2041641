use crystal_battle::battle::snapshot::BattleSnapshot;
use crystal_battle::mcp_interface::{
    battle_status_summary, create_demo_session, list_enemies_display, DEMO_PLAYER,
};
use crystal_battle::{BattleResult, GameSession, PlayerCommand, ServerConfig, UnitKind};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const MAX_COMMANDS: usize = 100;

/// Picks a command for the active party member: the sage mends anyone
/// below half health, everybody else hits the first standing enemy.
fn choose_command(snapshot: &BattleSnapshot) -> Option<PlayerCommand> {
    let active = snapshot.active.as_ref().filter(|a| a.kind == UnitKind::Party)?;
    let actor = snapshot.party.iter().find(|m| m.id == active.id)?;

    if actor.class_name == "Sage" && actor.stats.mp >= 5 {
        let wounded = snapshot
            .party
            .iter()
            .filter(|m| m.stats.hp > 0 && m.stats.hp * 2 < m.stats.max_hp)
            .min_by_key(|m| m.stats.hp);
        if let Some(wounded) = wounded {
            return Some(PlayerCommand::ability(&actor.id, Some(&wounded.id), "sage_mend"));
        }
    }

    let target = snapshot.enemies.iter().find(|e| e.stats.hp > 0)?;
    Some(PlayerCommand::ability(&actor.id, Some(&target.id), "basic_attack"))
}

fn play_battle(session: &mut GameSession, enemy_ids: &[&str]) -> BattleResult<()> {
    let mut outcome = session.engage(DEMO_PLAYER, enemy_ids)?;
    println!("{}", battle_status_summary(&outcome.snapshot));

    let battle_id = outcome.snapshot.id.clone();
    for _ in 0..MAX_COMMANDS {
        if outcome.snapshot.state.is_terminal() {
            break;
        }
        let Some(command) = choose_command(&outcome.snapshot) else {
            break;
        };
        outcome = session.submit_command(&battle_id, DEMO_PLAYER, command)?;
        println!("{}", battle_status_summary(&outcome.snapshot));
    }

    for event in &outcome.story_events {
        println!("Story event: {:?}", event);
    }
    match outcome.snapshot.to_json() {
        Ok(json) => println!("Final snapshot:\n{}", json),
        Err(e) => println!("Could not serialize snapshot: {}", e),
    }
    Ok(())
}

fn main() {
    let config = match ServerConfig::load_or_default(Path::new("config/server.ron")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut session = create_demo_session(config);
    println!("{}", list_enemies_display(&session));

    if let Err(e) = play_battle(&mut session, &["slime-1", "bat-1"]) {
        println!("Battle error: {}", e);
        return;
    }

    println!("{}", list_enemies_display(&session));
    if let Err(e) = play_battle(&mut session, &["cinder-wyrm"]) {
        println!("Battle error: {}", e);
    }
}
