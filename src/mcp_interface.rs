//! Text front end over a `GameSession`, used by the MCP server binary and
//! the demo. Every function returns display text for a single player.

use crate::ability_data::{abilities_available_to, all_abilities, Ability, EffectKind, FLEE};
use crate::battle::snapshot::BattleSnapshot;
use crate::config::ServerConfig;
use crate::player::PlayerCommand;
use crate::prefabs::{demo_party, get_enemy_templates};
use crate::session::{GameSession, SubmitOutcome};
use crate::{StatusEffect, UnitKind};

pub const DEMO_PLAYER: &str = "player-1";
pub const DEMO_PARTY: &str = "party-1";

/// A session with the demo party registered and the demo map populated.
pub fn create_demo_session(config: ServerConfig) -> GameSession {
    let mut session = GameSession::new(config);
    if let Err(e) = session.register_party(demo_party(DEMO_PARTY, DEMO_PLAYER)) {
        tracing::warn!("demo party not registered: {}", e);
    }
    for template in get_enemy_templates() {
        session.spawn_enemy(template);
    }
    session
}

fn describe_ability(ability: &Ability) -> String {
    let mut line = format!(
        "  {} ({}) - {} {}, power {}, {} MP, targets {}",
        ability.name,
        ability.id,
        ability.element,
        match ability.effect {
            EffectKind::Heal => "heal",
            EffectKind::Damage => "damage",
            EffectKind::StatusOnly => "status",
            EffectKind::NoOp => "utility",
        },
        ability.power,
        ability.mp_cost,
        ability.target_type,
    );
    if let Some(status) = ability.status_effect {
        line.push_str(&format!(", inflicts {}", status));
    }
    if !ability.target_type.is_supported() {
        line.push_str(" [not usable in battle yet]");
    }
    line
}

/// Lists the catalog, or only what one party member can use.
pub fn list_abilities_display(session: &GameSession, member_id: Option<&str>) -> String {
    let member = member_id.and_then(|id| {
        session
            .party_for_player(DEMO_PLAYER)
            .and_then(|party| party.member(id))
    });
    match (member_id, member) {
        (Some(id), None) => format!("No party member named '{}'.", id),
        (_, Some(member)) => {
            let mut output = format!("Abilities for {} (Lv.{} {}):\n", member.name, member.level, member.class_name);
            for ability in abilities_available_to(&member.class_name, member.level) {
                output.push_str(&describe_ability(ability));
                output.push('\n');
            }
            output
        }
        (None, None) => {
            let mut output = String::from("Ability catalog:\n");
            for ability in all_abilities() {
                output.push_str(&describe_ability(ability));
                output.push('\n');
            }
            output
        }
    }
}

/// Enemies on the map that are free to engage.
pub fn list_enemies_display(session: &GameSession) -> String {
    let mut templates: Vec<_> = session
        .world_enemies()
        .filter(|template| !session.is_engaged(&template.id))
        .collect();
    templates.sort_by(|a, b| a.id.cmp(&b.id));
    if templates.is_empty() {
        return "No enemies left to engage.".to_string();
    }
    let mut output = String::from("Enemies nearby:\n");
    for template in templates {
        let element = template
            .element
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no element".to_string());
        output.push_str(&format!(
            "  {} - {} ({}, {} HP){}\n",
            template.id,
            template.name,
            element,
            template.stats.max_hp,
            if template.boss_target().is_some() { " [BOSS]" } else { "" }
        ));
    }
    output
}

/// Renders a snapshot for a player.
pub fn battle_status_summary(snapshot: &BattleSnapshot) -> String {
    let mut output = format!("Battle {} - {}\n", snapshot.id, snapshot.state);

    output.push_str("Party:\n");
    for member in &snapshot.party {
        output.push_str(&format!(
            "  {} [{}] Lv.{} {} HP {}/{} MP {}/{}",
            member.name,
            member.id,
            member.level,
            member.class_name,
            member.stats.hp,
            member.stats.max_hp,
            member.stats.mp,
            member.stats.max_mp
        ));
        push_statuses(&mut output, &member.status_effects);
    }

    output.push_str("Enemies:\n");
    for enemy in &snapshot.enemies {
        output.push_str(&format!(
            "  {} [{}] HP {}/{}",
            enemy.name, enemy.id, enemy.stats.hp, enemy.stats.max_hp
        ));
        if let Some(element) = enemy.element {
            output.push_str(&format!(" {}", element));
        }
        push_statuses(&mut output, &enemy.status_effects);
    }

    if let Some(active) = snapshot.active.as_ref().filter(|_| !snapshot.state.is_terminal()) {
        if active.kind == UnitKind::Party {
            output.push_str(&format!("Your turn: {}\n", active.id));
        } else {
            output.push_str(&format!("Waiting on {}\n", active.id));
        }
    }

    if !snapshot.log.is_empty() {
        output.push_str("Recent log:\n");
        for line in &snapshot.log {
            output.push_str(&format!("  {}\n", line));
        }
    }
    output
}

fn push_statuses(output: &mut String, statuses: &[StatusEffect]) {
    if !statuses.is_empty() {
        let tags: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        output.push_str(&format!(" ({})", tags.join(", ")));
    }
    output.push('\n');
}

fn outcome_text(outcome: &SubmitOutcome) -> String {
    let mut output = String::new();
    if let Some(reason) = &outcome.rejection {
        output.push_str(&format!("Command rejected: {}\n\n", reason));
    }
    output.push_str(&battle_status_summary(&outcome.snapshot));
    for event in &outcome.story_events {
        output.push_str(&format!("Story progress: defeated {}\n", event.target_id()));
    }
    output
}

/// Engages the listed enemies. Returns the battle id and display text.
pub fn start_battle(session: &mut GameSession, enemy_ids: &[&str]) -> Result<(String, String), String> {
    let outcome = session
        .engage(DEMO_PLAYER, enemy_ids)
        .map_err(|e| format!("Could not start battle: {}", e))?;
    Ok((outcome.snapshot.id.clone(), outcome_text(&outcome)))
}

pub fn use_ability(
    session: &mut GameSession,
    battle_id: &str,
    source_id: &str,
    target_id: Option<&str>,
    ability_id: &str,
) -> Result<(String, bool), String> {
    let command = PlayerCommand::ability(source_id, target_id, ability_id);
    let outcome = session
        .submit_command(battle_id, DEMO_PLAYER, command)
        .map_err(|e| format!("Error: {}", e))?;
    Ok((outcome_text(&outcome), outcome.snapshot.state.is_terminal()))
}

/// Flees with whichever party member is up.
pub fn flee(session: &mut GameSession, battle_id: &str) -> Result<String, String> {
    let snapshot = session.snapshot(battle_id).map_err(|e| format!("Error: {}", e))?;
    let source = snapshot
        .active
        .map(|active| active.id)
        .ok_or_else(|| "Nobody is able to flee.".to_string())?;
    use_ability(session, battle_id, &source, None, FLEE).map(|(text, _)| text)
}
