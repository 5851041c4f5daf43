//! Loopback initiator demo.
//!
//! Drives an initiator session against an in-process counterparty: the
//! Logon handshake, a forwarded execution report, and a sequence gap that
//! triggers a Resend Request.
//!
//! Run with `RUST_LOG=debug cargo run --example loopback_initiator` for the
//! full session trace.

use async_trait::async_trait;
use fixlink::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

struct PrintingApplication;

#[async_trait]
impl Application for PrintingApplication {
    async fn on_create(&self, session_id: &SessionId, connection: ConnectionId) {
        info!(%connection, session = %session_id, "session created");
    }

    async fn on_logon(&self, session_id: &SessionId, connection: ConnectionId) {
        info!(%connection, session = %session_id, "logon complete");
    }

    async fn on_disconnect(&self, connection: ConnectionId) {
        info!(%connection, "disconnected");
    }

    async fn from_admin(&self, message: &FixMessage, connection: ConnectionId) {
        info!(%connection, "admin <- {message}");
    }

    async fn from_app(&self, message: &FixMessage, connection: ConnectionId) {
        info!(%connection, "app <- {message}");
    }

    async fn on_out_of_order(&self, message: FixMessage, connection: ConnectionId) {
        info!(%connection, "held until gap is filled: {message}");
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

fn inbound(msg_type: MsgType, seq: u64) -> FixMessage {
    FixMessage::new(msg_type).with_msg_seq_num(seq)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = SessionSettings::new("CLIENT".parse()?, "BROKER".parse()?, "FIXT.1.1")
        .with_heartbeat_interval(Duration::from_secs(30))
        .with_sender_sub_id("DESK1");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let engine = EngineBuilder::new()
        .with_settings(settings)
        .with_sequence_provider(Arc::new(MemorySequenceStore::with_initial_seqs(1, 1)))
        .with_credentials(Arc::new(|| Some(Credentials::new("demo", "demo-secret"))))
        .with_event_sink(Arc::new(events_tx))
        .with_application(PrintingApplication)
        .build()?;

    let (connection, mut wire) = ChannelConnection::new(ConnectionId::next());
    let (inbound_tx, inbound_rx) = mpsc::channel(32);
    let worker = engine.spawn_connection(Arc::new(connection), inbound_rx);

    // Counterparty: answer the Logon, then skip sequence numbers 3 and 4.
    let mut inbound_tx = Some(inbound_tx);
    while let Some(outbound) = wire.recv().await {
        let Outbound::Message(message) = outbound else {
            info!("transport closed by engine");
            break;
        };
        info!("wire -> {message}");
        let Some(tx) = inbound_tx.as_ref() else {
            continue;
        };
        match message.msg_type() {
            MsgType::Logon => {
                tx.send(inbound(MsgType::Logon, 1)).await?;
                tx.send(inbound(MsgType::ExecutionReport, 2)).await?;
                tx.send(inbound(MsgType::Heartbeat, 5)).await?;
            }
            MsgType::ResendRequest => {
                info!(
                    begin = ?message.get_field_u64(tags::BEGIN_SEQ_NO),
                    end = ?message.get_field_u64(tags::END_SEQ_NO),
                    "counterparty received resend request"
                );
                inbound_tx = None;
            }
            _ => {}
        }
        if inbound_tx.is_none() {
            break;
        }
    }

    worker.await?;

    while let Ok(event) = events_rx.try_recv() {
        match event {
            SessionEvent::Established { session, .. } => {
                info!(session = %session.id(), "event: established");
            }
            SessionEvent::Terminated {
                session_id, reason, ..
            } => {
                info!(session = %session_id, %reason, "event: terminated");
            }
        }
    }

    Ok(())
}
