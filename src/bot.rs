//! Discord event routing: gateway events in, feedback reports out.

use anyhow::{Context as _, Result};
use serenity::async_trait;
use serenity::client::{Client, Context, EventHandler};
use serenity::model::channel::{Channel, Message, MessageType, Reaction, ReactionType};
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::ChannelId;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::command::ParsedCommand;
use crate::config::Config;
use crate::dedup::SubmittedLog;
use crate::filter::{decide_message, decide_reaction, Decision, MessageView, ReactionView};
use crate::forwarder::{FeedbackClient, FeedbackReport};

struct Handler {
    config: Config,
    feedback: FeedbackClient,
    submitted: Mutex<SubmittedLog>,
}

/// Connect to the gateway and dispatch events until the client stops.
pub async fn run(config: Config, submitted: SubmittedLog) -> Result<()> {
    let token = config.discord.bot_token.clone();
    let feedback = FeedbackClient::new(&config.feedback, config.test_mode);

    let handler = Handler {
        config,
        feedback,
        submitted: Mutex::new(submitted),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")?;

    client.start().await.context("Discord client error")?;

    Ok(())
}

/// Lower-cased channel name and parent-category name, or `None` for
/// anything that is not a guild channel.
async fn channel_context(ctx: &Context, channel_id: ChannelId) -> Option<(String, Option<String>)> {
    let channel = match channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(gc)) => gc,
        Ok(_) => return None,
        Err(e) => {
            debug!("Could not resolve channel {}: {}", channel_id, e);
            return None;
        }
    };

    let name = channel.name.to_lowercase();
    let category = match channel.parent_id {
        Some(parent_id) => match parent_id.to_channel(ctx).await {
            Ok(Channel::Guild(parent)) => Some(parent.name.to_lowercase()),
            Ok(_) => None,
            Err(e) => {
                debug!("Could not resolve category of {}: {}", channel_id, e);
                None
            }
        },
        None => None,
    };

    Some((name, category))
}

impl Handler {
    /// Submit a report, and on success record the message id, acknowledge
    /// the author, and pin the message. Failures are logged only; the
    /// user never sees them and nothing is retried.
    async fn forward(&self, ctx: &Context, msg: &Message, report: FeedbackReport) {
        let kind = report.kind;
        if let Err(e) = self.feedback.submit(&report).await {
            error!("Feedback submission for message {} failed: {:#}", msg.id, e);
            return;
        }

        info!(
            "Forwarded {} from {} (message {})",
            kind.as_str(),
            report.user_tag,
            msg.id
        );

        {
            let mut submitted = self.submitted.lock().await;
            if let Err(e) = submitted.record(&msg.id.to_string()) {
                warn!("Failed to persist submitted log: {:#}", e);
            }
        }

        let ack = format!(
            "thanks! Your {} was logged to Ventuz's internal system.",
            kind.as_str().to_uppercase()
        );
        if let Err(e) = msg.reply(&ctx.http, ack).await {
            warn!("Failed to acknowledge message {}: {}", msg.id, e);
        }
        if let Err(e) = msg.pin(&ctx.http).await {
            warn!("Failed to pin message {}: {}", msg.id, e);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Bot has started as {} in {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let parsed = ParsedCommand::parse(&msg.content);
        let context = channel_context(&ctx, msg.channel_id).await;
        let category = context.as_ref().and_then(|(_, c)| c.as_deref());

        let view = MessageView {
            author_is_bot: msg.author.bot,
            is_pin_notice: msg.kind == MessageType::PinsAdd,
            has_prefix: self.config.has_prefix(&msg.content),
            command: &parsed.command,
            category,
        };

        match decide_message(&view, self.config.test_mode) {
            Decision::DeletePinNotice => {
                if let Err(e) = msg.delete(&ctx.http).await {
                    warn!("Failed to delete pin notice {}: {}", msg.id, e);
                }
            }
            Decision::Forward(kind) => {
                let Some((channel_label, _)) = context else {
                    return;
                };
                debug!(
                    "Command {} from {} in #{}: {}",
                    parsed.command, msg.author.name, channel_label, parsed.payload
                );
                let report = FeedbackReport {
                    kind,
                    payload: parsed.payload,
                    channel_label,
                    user_tag: msg.author.name.clone(),
                    version: self.config.feedback.version.clone(),
                };
                self.forward(&ctx, &msg, report).await;
            }
            Decision::Ignore => {}
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let emoji_name = match &reaction.emoji {
            ReactionType::Custom { name: Some(name), .. } => name.to_lowercase(),
            ReactionType::Unicode(name) => name.to_lowercase(),
            _ => return,
        };

        // Reactions can target messages the cache never saw; resolve them
        // with a fetch before filtering. A failed fetch drops the event.
        let cached = ctx
            .cache
            .message(reaction.channel_id, reaction.message_id)
            .map(|m| m.clone());
        let msg = match cached {
            Some(m) => m,
            None => match ctx
                .http
                .get_message(reaction.channel_id, reaction.message_id)
                .await
            {
                Ok(m) => m,
                Err(e) => {
                    debug!(
                        "Dropping reaction on unresolvable message {}: {}",
                        reaction.message_id, e
                    );
                    return;
                }
            },
        };

        let reactor_is_bot = match reaction.user(&ctx).await {
            Ok(user) => user.bot,
            Err(e) => {
                debug!("Dropping reaction with unresolvable user: {}", e);
                return;
            }
        };

        let Some((channel_label, category)) = channel_context(&ctx, reaction.channel_id).await
        else {
            return;
        };

        let already_submitted = {
            let submitted = self.submitted.lock().await;
            submitted.contains(&msg.id.to_string())
        };

        let view = ReactionView {
            reactor_is_bot,
            message_has_prefix: self.config.has_prefix(&msg.content),
            emoji_name: &emoji_name,
            category: category.as_deref(),
            already_submitted,
        };

        if let Decision::Forward(kind) = decide_reaction(&view, self.config.test_mode) {
            debug!(
                "Reaction :{}: marks message {} in #{} for forwarding",
                emoji_name, msg.id, channel_label
            );
            let report = FeedbackReport {
                kind,
                payload: msg.content.trim().to_string(),
                channel_label,
                user_tag: msg.author.name.clone(),
                version: self.config.feedback.version.clone(),
            };
            self.forward(&ctx, &msg, report).await;
        }
    }
}
