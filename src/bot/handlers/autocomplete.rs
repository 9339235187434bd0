//! Autocomplete handlers for Discord slash command parameters.
//!
//! Drinks and foods come from the menu loaded at startup, participants from the
//! ledger. Discord shows at most 25 suggestions.

use crate::{
    bot::BotData,
    core::{
        catalog::{ItemKind, Menu, NONE_ITEM},
        ledger,
    },
    errors::Error,
};

const MAX_SUGGESTIONS: usize = 25;

fn matching_items(menu: &Menu, kind: ItemKind, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    std::iter::once(NONE_ITEM)
        .chain(menu.items_of(kind).map(|item| item.name.as_str()))
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .map(ToString::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggests drinks on the menu, `none` first.
pub async fn autocomplete_drink(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_items(&ctx.data().menu, ItemKind::Drink, partial)
}

/// Suggests foods on the menu, `none` first.
pub async fn autocomplete_food(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_items(&ctx.data().menu, ItemKind::Food, partial)
}

/// Suggests visible participants from the ledger.
pub async fn autocomplete_participant(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(participants) = ledger::list_participants(&ctx.data().database, false).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    participants
        .into_iter()
        .filter(|participant| participant.name.to_lowercase().contains(&partial_lower))
        .map(|participant| participant.name)
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_menu;

    #[test]
    fn test_matching_items_filters_by_kind_and_text() {
        let menu = sample_menu();

        let drinks = matching_items(&menu, ItemKind::Drink, "");
        assert_eq!(drinks[0], NONE_ITEM);
        assert!(drinks.contains(&"Cortado".to_string()));
        assert!(!drinks.contains(&"Yogurt".to_string()));

        let palmeras = matching_items(&menu, ItemKind::Food, "palm");
        assert_eq!(
            palmeras,
            vec!["Palmera chocolate".to_string(), "Palmera chocolate blanco".to_string()]
        );
    }
}
