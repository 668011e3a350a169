//! # Main Entry Point
//!
//! Wires the command relay together:
//! - Domain: Command model, configuration and collaborator traits
//! - Infrastructure: Matrix, PullRequestService, fortune
//! - Application: Parser, Router, Executor, Dispatcher, Outbox, Logging
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client, RoomState,
    config::SyncSettings,
    room::Room,
    ruma::{
        RoomId,
        events::room::{
            member::{MembershipState, StrippedRoomMemberEvent},
            message::SyncRoomMessageEvent,
        },
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::dispatcher::Dispatcher;
use crate::application::executor::CommandExecutor;
use crate::application::router::MessageRouter;
use crate::application::search::MessageIndex;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::matrix::{MatrixService, inbound_message, should_route};
use crate::infrastructure::pr_service::PrServiceClient;
use crate::strings::{logs, messages};

/// Chat-driven command relay for a Matrix room.
#[derive(Parser, Debug)]
#[command(name = "mtflow", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load and validate configuration
    let config = AppConfig::load(&args.config)?;
    config.validate()?;
    let password = config.matrix_password()?;
    let pr_settings = config.pr_service_settings()?;
    let mention = config.mention();

    // 2. Logging Setup
    let _guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", logs::STARTING);
    tracing::info!(
        "{}",
        logs::config_loaded(&config.services.matrix.username, &config.services.matrix.room)
    );

    // 3. Command core: router -> dispatcher -> outbox
    let index = Arc::new(MessageIndex::new());
    let pr_service = Arc::new(PrServiceClient::new(pr_settings)?);
    let executor = Arc::new(CommandExecutor::new(pr_service, index.clone()));

    let (command_tx, command_rx) = mpsc::channel(config.dispatch.queue_capacity);
    let (result_tx, result_rx) = mpsc::channel(config.dispatch.queue_capacity);

    let dispatcher = Dispatcher::new(executor, config.dispatch_timeout())
        .with_max_in_flight(config.dispatch.max_in_flight);
    tokio::spawn(dispatcher.run(command_rx, result_tx.clone()));

    let router = Arc::new(
        MessageRouter::new(&mention, command_tx, result_tx)
            .with_user_id(&config.services.matrix.username)
            .with_index(index),
    );

    // 4. Matrix Setup
    let matrix = &config.services.matrix;
    let client = Client::builder()
        .homeserver_url(&matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(&matrix.username, &password)
        .send()
        .await?;
    tracing::info!("{}", logs::LOGIN_SUCCESS);

    if let Some(name) = &matrix.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    let room_id = RoomId::parse(&matrix.room)
        .with_context(|| format!("Invalid room id '{}'", matrix.room))?;

    // Handle Invites (only to our own room)
    let invite_room = room_id.clone();
    client.add_event_handler(move |ev: StrippedRoomMemberEvent, room: Room| {
        let invite_room = invite_room.clone();
        async move {
            if ev.content.membership == MembershipState::Invite
                && room.room_id().as_str() == invite_room.as_str()
            {
                tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
                if let Err(e) = room.join().await {
                    tracing::error!("{}", logs::join_invite_fail(&e.to_string()));
                }
            }
        }
    });

    let initial = client.sync_once(SyncSettings::default()).await?;

    let room = match client.get_room(&room_id) {
        Some(room) if room.state() == RoomState::Joined => room,
        _ => client
            .join_room_by_id(&room_id)
            .await
            .with_context(|| logs::room_not_joined(room_id.as_str()))?,
    };

    let chat: Arc<dyn ChatProvider> = Arc::new(MatrixService::new(room));
    if let Err(e) = chat.post(messages::GREETING, "").await {
        tracing::warn!("{}", logs::greeting_fail(&e));
    }
    tokio::spawn(application::outbox::deliver(result_rx, chat.clone()));

    // 5. Event Loop
    let start_time = std::time::SystemTime::now();
    let listen_room = room_id.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();
        let listen_room = listen_room.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };
            if !should_route(
                original_msg,
                room.room_id(),
                &listen_room,
                room.own_user_id(),
                start_time,
            ) {
                return;
            }

            let Some(message) = inbound_message(original_msg) else {
                return;
            };
            tracing::info!(
                "{}",
                logs::message_received(original_msg.sender.as_str(), &message.body)
            );

            if let Err(e) = router.route(&message).await {
                tracing::error!("{}", logs::route_fail(&e.to_string()));
            }
        }
    });

    tracing::info!("{}", logs::listening(room_id.as_str(), &mention));
    tracing::info!("{}", logs::SYNC_LOOP_START);
    let settings = SyncSettings::default().token(initial.next_batch);
    if let Err(e) = client.sync(settings).await {
        tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
        return Err(e.into());
    }

    Ok(())
}
