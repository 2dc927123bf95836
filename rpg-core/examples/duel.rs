//! A short duel against a random catalog enemy.
//!
//! Run with: `RUST_LOG=debug RPG_SEED=7 cargo run -p rpg-core --example duel`

use rpg_core::{EntityId, GameSession, InMemoryCatalog, SessionConfig};
use tracing_subscriber::EnvFilter;

const MAX_ROUNDS: usize = 20;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SessionConfig::from_env().with_player_name("Example");
    let mut session =
        GameSession::new_player(config, InMemoryCatalog::standard(), "Thorin", "Warrior")?;

    // Longsword and chainmail
    for id in [EntityId(1), EntityId(4)] {
        session.acquire_item(id)?;
        let outcome = session.equip(id)?;
        println!("Equipped {} (AC {}, max HP {})", outcome.item_name, outcome.armor_class, outcome.max_hp);
    }
    session.acquire_item(EntityId(5))?;
    println!("{}\n", session.character());

    let Some(mut enemy) = session.spawn_enemy() else {
        println!("The catalog has no enemies.");
        return Ok(());
    };
    println!("A wild {} appears!", enemy);
    if let Some(line) = enemy.npc_details().and_then(|n| n.dialogue.clone()) {
        println!("{}: \"{line}\"", enemy.name);
    }

    for round in 1..=MAX_ROUNDS {
        println!("\n=== Round {round} ===");
        println!("{}", session.attack(&mut enemy));
        if enemy.is_dead() {
            break;
        }

        println!("{}", session.defend(&enemy));
        if session.character().is_dead() {
            println!("{} has fallen.", session.character().name);
            return Ok(());
        }

        let hurt = session.character().current_hp() * 2 < session.character().max_hp();
        if hurt && session.character().inventory.contains(EntityId(5)) {
            let drink = session.consume(EntityId(5))?;
            println!("Drank {} and healed {} HP.", drink.item_name, drink.healed);
        }
    }

    if enemy.is_dead() {
        let gain = session.gain_experience(300)?;
        println!("\nVictory! {} XP total.", gain.total);
        if let Some(level) = gain.new_level {
            println!("{} reached level {level}!", session.character().name);
        }
    }

    let path = session.save()?;
    println!("Saved to {}", path.display());
    for save in session.list_saves()? {
        println!(
            "  {} (level {} {}) at {}",
            save.character_name,
            save.level,
            save.class_name,
            save.locator.display()
        );
    }
    Ok(())
}
