//! Order Discord commands - `order`, `orders`, `unorder` and `menu`.
//!
//! These commands edit the live session while it is open and show the cafeteria menu.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, reply_error},
        core::{
            catalog::{ItemKind, NONE_ITEM},
            session,
            tally::format_euros,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Orders a drink and a food for the current breakfast.
    ///
    /// Either item may be `none`. The order is placed for you unless another
    /// participant is given.
    #[poise::command(slash_command)]
    pub async fn order(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink, or none"]
        #[autocomplete = "autocomplete::autocomplete_drink"]
        drink: String,
        #[description = "Food, or none"]
        #[autocomplete = "autocomplete::autocomplete_food"]
        food: String,
        #[description = "Who the order is for (defaults to you)"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        participant: Option<String>,
    ) -> Result<()> {
        let participant = participant.unwrap_or_else(|| ctx.author().name.clone());
        let data = ctx.data();

        match session::add_order(&data.database, &data.menu, &participant, &drink, &food).await {
            Ok(order) => {
                ctx.say(format!(
                    "✅ Order #{} for **{}**: {} + {}",
                    order.id, order.participant, order.drink, order.food
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Lists the orders of the current breakfast.
    #[poise::command(slash_command)]
    pub async fn orders(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let current = session::current_session(db).await?;
        let orders = session::list_orders(db, current.id).await?;

        if orders.is_empty() {
            ctx.say("No orders yet. Use `/order` to place one.").await?;
            return Ok(());
        }

        let state = session::SessionState::parse(&current.state)?;
        let mut text = format!("**Orders** ({state})\n");
        for order in &orders {
            let _ = writeln!(
                text,
                "`#{}` **{}**: {} + {}",
                order.id, order.participant, order.drink, order.food
            );
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Removes one of the current orders by its number.
    #[poise::command(slash_command)]
    pub async fn unorder(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number shown by /orders"] id: i64,
    ) -> Result<()> {
        match session::remove_order(&ctx.data().database, id).await {
            Ok(order) => {
                ctx.say(format!(
                    "✅ Removed order #{} ({}: {} + {})",
                    order.id, order.participant, order.drink, order.food
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Shows the menu with prices and combos.
    #[poise::command(slash_command)]
    pub async fn menu(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let menu = &ctx.data().menu;
        let mut text = String::from("☕ **Drinks**\n");
        for item in menu.items_of(ItemKind::Drink) {
            let _ = writeln!(text, "• {} - {}", item.name, format_euros(item.price));
        }

        text.push_str("\n🥐 **Food**\n");
        for item in menu.items_of(ItemKind::Food) {
            let _ = writeln!(text, "• {} - {}", item.name, format_euros(item.price));
        }

        text.push_str("\n🏷️ **Combos**\n");
        for rule in menu.rules() {
            let drinks: Vec<&str> = rule.drink_categories.iter().map(String::as_str).collect();
            let foods: Vec<&str> = rule.food_categories.iter().map(String::as_str).collect();
            let _ = write!(
                text,
                "• {}: {} + {} - {}",
                rule.name,
                drinks.join("/"),
                foods.join("/"),
                format_euros(rule.price)
            );
            if let Some(discount) = rule.discount_price {
                let secondary: Vec<&str> =
                    rule.secondary_categories.iter().map(String::as_str).collect();
                let _ = write!(
                    text,
                    " ({} with {})",
                    format_euros(discount),
                    secondary.join("/")
                );
            }
            text.push('\n');
        }
        let _ = write!(text, "\nUse `{NONE_ITEM}` to skip the drink or the food.");

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
