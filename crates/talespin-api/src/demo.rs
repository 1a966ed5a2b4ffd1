//! Built-in demo content: a short harbor story.

use std::sync::Arc;

use serde_json::json;
use talespin_content::domain::event::AuthoredEvent;
use talespin_content::domain::pack::ContentPack;
use talespin_content::domain::script::ScriptApi;
use talespin_core::error::DomainError;
use talespin_core::interrupt::ScriptResult;
use talespin_core::presentation::Choice;
use talespin_core::script::ScriptRef;
use talespin_core::world::WorldState;
use talespin_world_state::domain::action::Action;
use talespin_world_state::domain::location::{Location, StaticLinks};

pub const PROLOGUE: &str = "prologue";
pub const LIGHTHOUSE: &str = "lighthouse";
pub const MARKET: &str = "market_rumors";

async fn prologue(api: Arc<dyn ScriptApi>) -> ScriptResult<()> {
    api.set_background("harbor-dusk.png");
    api.show_text(None, "Fog rolls in over the harbor.").await?;
    api.show_text(Some("Keeper"), "You came. I wasn't sure you would.")
        .await?;
    let answer = api
        .show_choices(vec![
            Choice::new("help", "Offer to help"),
            Choice::new("refuse", "Turn away"),
        ])
        .await?;
    api.state().update(|s| s.set_flag("prologue_done", true));
    if answer == "help" {
        api.jump(ScriptRef::branch(PROLOGUE, "accept")).await?;
    }
    api.show_text(Some("Keeper"), "Suit yourself. The light won't keep itself.")
        .await
}

async fn accept(api: Arc<dyn ScriptApi>) -> ScriptResult<()> {
    api.state().update(|s| s.set_flag("keeper_trust", true));
    api.set_foreground(Some("keeper.png"));
    api.show_text(Some("Keeper"), "Then meet me at the lighthouse.")
        .await?;
    api.set_foreground(None);
    Ok(())
}

async fn lighthouse(api: Arc<dyn ScriptApi>) -> ScriptResult<()> {
    api.set_background("lighthouse-stairs.png");
    api.show_text(None, "The stairs wind up into the dark.")
        .await?;
    let outcome = api
        .run_custom_logic("trim_wick", json!({ "difficulty": 2 }))
        .await?;
    if outcome["success"].as_bool().unwrap_or(false) {
        api.state().update(|s| s.set_flag("lamp_lit", true));
        api.show_text(Some("Keeper"), "There. Ships will see us now.")
            .await
    } else {
        api.show_text(Some("Keeper"), "Not quite. Come back and try again.")
            .await
    }
}

async fn market_rumors(api: Arc<dyn ScriptApi>) -> ScriptResult<()> {
    api.set_background("market.png");
    api.show_text(Some("Fishmonger"), "They say the old keeper never sleeps.")
        .await?;
    api.state().update(|s| {
        s.set_flag("heard_rumors", true);
        s.clock.advance(20);
    });
    Ok(())
}

fn initial_state() -> WorldState {
    let mut state = WorldState {
        location: Some("harbor".into()),
        ..WorldState::default()
    };
    state.player.insert("name".into(), json!("Wren"));
    state
}

/// Assembles the demo pack.
///
/// # Errors
///
/// Returns `DomainError::Validation` if an id is registered twice.
pub fn content_pack() -> Result<ContentPack, DomainError> {
    Ok(ContentPack::new()
        .with_event(
            AuthoredEvent::new(PROLOGUE, prologue)
                .with_locked(|s| s.is_flag_set("prologue_done"))
                .with_branch("accept", accept),
        )?
        .with_event(
            AuthoredEvent::new(LIGHTHOUSE, lighthouse)
                .with_conditions(|s| s.is_at("lighthouse"))
                .with_locked(|s| s.is_flag_set("lamp_lit")),
        )?
        .with_event(
            AuthoredEvent::new(MARKET, market_rumors)
                .with_conditions(|s| s.is_at("market"))
                .with_locked(|s| s.is_flag_set("heard_rumors")),
        )?
        .with_action(Action::new("wait", "Wait an hour", |s| s.clock.advance(60)))
        .with_location(Location::new("harbor", "The Harbor").with_action(Action::new(
            "fish",
            "Fish off the pier",
            |s| {
                s.increment("fish_caught", 1);
                s.clock.advance(45);
            },
        )))?
        .with_location(Location::new("lighthouse", "The Lighthouse"))?
        .with_location(Location::new("market", "The Market"))?
        .with_linker(
            StaticLinks::new()
                .with("harbor", "lighthouse")
                .with("harbor", "market"),
        )
        .with_initial_state(initial_state()))
}

#[cfg(test)]
mod tests {
    use talespin_content::application::registry::EventRegistry;

    use super::*;

    fn eligible(events: &EventRegistry, state: &WorldState) -> Option<String> {
        events.first_eligible(state).map(|e| e.id().to_owned())
    }

    #[test]
    fn test_new_game_opens_with_prologue() {
        let pack = content_pack().unwrap();

        let first = eligible(&pack.events, &pack.initial_state);

        assert_eq!(first.as_deref(), Some(PROLOGUE));
    }

    #[test]
    fn test_nothing_is_eligible_at_harbor_after_prologue() {
        let pack = content_pack().unwrap();
        let mut state = pack.initial_state.clone();

        state.set_flag("prologue_done", true);

        assert_eq!(eligible(&pack.events, &state), None);
    }

    #[test]
    fn test_lighthouse_event_runs_until_lamp_is_lit() {
        // Arrange
        let pack = content_pack().unwrap();
        let mut state = pack.initial_state.clone();
        state.set_flag("prologue_done", true);
        state.location = Some("lighthouse".into());

        // Act
        let before = eligible(&pack.events, &state);
        state.set_flag("lamp_lit", true);
        let after = eligible(&pack.events, &state);

        // Assert
        assert_eq!(before.as_deref(), Some(LIGHTHOUSE));
        assert_eq!(after, None);
    }

    #[test]
    fn test_accept_branch_is_registered() {
        let pack = content_pack().unwrap();

        let resolved = pack
            .events
            .resolve(&ScriptRef::branch(PROLOGUE, "accept"));

        assert!(resolved.is_ok());
    }
}
