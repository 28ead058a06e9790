//! Actor System Core
//!
//! Run-loop glue around the supervision cells: behavior dispatch, lifecycle
//! management, and system-wide metrics. The run loop is the only place the
//! terminate signal is caught; it never crosses actor boundaries.
//!
//! Restart policies live with outer supervisors, not here. A behavior that
//! fails simply terminates with `UNHANDLED_FAILURE` and its linked peers
//! are notified like any other exit.

use crate::cell::{ActorCell, ActorRef};
use crate::error::{ActorError, Result};
use crate::exit_code;
use crate::mailbox::MailboxReceiver;
use crate::messages::{ActorMessage, ExitNotification};
use crate::registry::{ActorId, ActorRegistry};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Trait for actor behavior
#[async_trait]
pub trait ActorBehavior: Send + 'static {
    type Message: Send + Sync + 'static;

    /// Handle an application message
    async fn handle(&mut self, msg: Arc<Self::Message>, ctx: &ActorRef) -> Result<()>;

    /// Called when the actor starts
    async fn on_start(&mut self, _ctx: &ActorRef) -> Result<()> {
        Ok(())
    }

    /// Called after the run loop ends, with the exit state already terminal
    async fn on_stop(&mut self, _ctx: &ActorRef) -> Result<()> {
        Ok(())
    }

    /// Handle the exit of a linked peer
    ///
    /// Linked actors share fate: the default implementation terminates with
    /// the peer's reason. Override to trap exits and outlive peers.
    async fn on_peer_exit(&mut self, exit: ExitNotification, ctx: &ActorRef) -> Result<()> {
        ctx.quit(exit.reason)
    }
}

/// System-wide metrics
#[derive(Debug, Default)]
pub struct SystemMetrics {
    pub actors_spawned: AtomicU64,
    pub actors_stopped: AtomicU64,
    pub messages_processed: AtomicU64,
    pub total_processing_time_ns: AtomicU64,
    pub exit_notifications_handled: AtomicU64,
}

impl SystemMetrics {
    pub fn record_message_handled(&self, duration: Duration) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn avg_processing_time_ns(&self) -> f64 {
        let count = self.messages_processed.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let total = self.total_processing_time_ns.load(Ordering::Relaxed);
        total as f64 / count as f64
    }

    /// Get metrics snapshot
    pub fn get_stats(&self) -> SystemStats {
        SystemStats {
            actors_spawned: self.actors_spawned.load(Ordering::Relaxed),
            actors_stopped: self.actors_stopped.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            exit_notifications_handled: self.exit_notifications_handled.load(Ordering::Relaxed),
            avg_processing_time_ns: self.avg_processing_time_ns(),
        }
    }
}

/// Snapshot of system statistics
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub actors_spawned: u64,
    pub actors_stopped: u64,
    pub messages_processed: u64,
    pub exit_notifications_handled: u64,
    pub avg_processing_time_ns: f64,
}

/// Core actor system managing actor lifecycles
pub struct ActorSystem {
    /// Live actors for id-based lookup
    registry: Arc<ActorRegistry>,

    /// Task registry for proper cleanup on shutdown
    task_registry: Arc<RwLock<HashMap<ActorId, JoinHandle<()>>>>,

    /// System-wide metrics
    metrics: Arc<SystemMetrics>,

    /// System ID for debugging
    system_id: String,
}

impl ActorSystem {
    /// Create new actor system
    pub fn new() -> Self {
        let system_id = format!("system-{}", Uuid::new_v4());
        info!(system_id = %system_id, "creating actor system");

        Self {
            registry: Arc::new(ActorRegistry::new()),
            task_registry: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(SystemMetrics::default()),
            system_id,
        }
    }

    /// Spawn a new actor
    pub async fn spawn<B>(&self, behavior: B) -> ActorRef
    where
        B: ActorBehavior,
    {
        let (actor_ref, receiver) = ActorCell::new(ActorId::new());
        self.start_task(actor_ref.clone(), receiver, behavior).await;

        info!(
            actor_id = %actor_ref.id(),
            system_id = %self.system_id,
            actor_type = std::any::type_name::<B>(),
            "actor spawned"
        );
        actor_ref
    }

    /// Spawn an actor already linked to `peer`
    ///
    /// The link is established before the run loop starts, so a child of an
    /// already-exited peer finds the exit notification waiting in its
    /// mailbox instead of a live link.
    pub async fn spawn_linked<B>(&self, behavior: B, peer: &ActorRef) -> ActorRef
    where
        B: ActorBehavior,
    {
        let (actor_ref, receiver) = ActorCell::new(ActorId::new());
        if !actor_ref.link_to(peer) {
            debug!(
                actor_id = %actor_ref.id(),
                peer_id = %peer.id(),
                "spawned without live link"
            );
        }
        self.start_task(actor_ref.clone(), receiver, behavior).await;

        info!(
            actor_id = %actor_ref.id(),
            system_id = %self.system_id,
            peer_id = %peer.id(),
            actor_type = std::any::type_name::<B>(),
            "linked actor spawned"
        );
        actor_ref
    }

    async fn start_task<B>(&self, actor_ref: ActorRef, receiver: MailboxReceiver, behavior: B)
    where
        B: ActorBehavior,
    {
        self.registry.register_actor(actor_ref.clone()).await;

        let task = ActorTask {
            self_ref: actor_ref.clone(),
            behavior,
            receiver,
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
        };
        let handle = tokio::spawn(task.run());

        self.task_registry
            .write()
            .await
            .insert(actor_ref.id().clone(), handle);
        self.metrics.actors_spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// Stop an actor with a forced `KILLED` exit and join its task
    pub async fn stop_actor(&self, id: &ActorId) -> Result<()> {
        let Some(target) = self.registry.find_actor(id).await else {
            warn!(actor_id = %id, "attempted to stop unknown actor");
            return Err(ActorError::UnknownActor { actor: id.clone() });
        };

        target.force_exit(exit_code::KILLED);

        let handle = self.task_registry.write().await.remove(id);
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(actor_id = %id, error = %e, "actor task ended abnormally");
                }
            }
        }

        info!(actor_id = %id, "actor stopped");
        Ok(())
    }

    /// Shut down the entire system, stopping every live actor
    pub async fn shutdown(&self) {
        info!(system_id = %self.system_id, "shutting down actor system");

        let actor_ids = self.registry.list_actors().await;
        let stop_futures: Vec<_> = actor_ids.iter().map(|id| self.stop_actor(id)).collect();
        for (i, stop_result) in futures::future::join_all(stop_futures)
            .await
            .into_iter()
            .enumerate()
        {
            if let Err(e) = stop_result {
                warn!(actor_id = %actor_ids[i], error = %e, "error stopping actor during shutdown");
            }
        }

        // Anything that slipped past the registry sweep gets aborted.
        let remaining: Vec<_> = self.task_registry.write().await.drain().collect();
        for (actor_id, handle) in remaining {
            handle.abort();
            debug!(actor_id = %actor_id, "aborted straggler task");
        }

        info!(system_id = %self.system_id, "actor system shutdown complete");
    }

    /// List all live actors
    pub async fn list_actors(&self) -> Vec<ActorId> {
        self.registry.list_actors().await
    }

    /// Get system metrics
    pub fn metrics(&self) -> Arc<SystemMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ActorSystem {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            task_registry: Arc::clone(&self.task_registry),
            metrics: Arc::clone(&self.metrics),
            system_id: self.system_id.clone(),
        }
    }
}

/// Actor task runner
struct ActorTask<B: ActorBehavior> {
    self_ref: ActorRef,
    behavior: B,
    receiver: MailboxReceiver,
    registry: Arc<ActorRegistry>,
    metrics: Arc<SystemMetrics>,
}

impl<B: ActorBehavior> ActorTask<B> {
    async fn run(mut self) {
        let actor_id = self.self_ref.id().clone();
        debug!(actor_id = %actor_id, "actor task starting");

        if let Err(e) = self.behavior.on_start(&self.self_ref).await {
            let reason = e.exit_reason().unwrap_or(exit_code::UNHANDLED_FAILURE);
            error!(actor_id = %actor_id, error = %e, "actor failed during startup");
            self.finish(reason).await;
            return;
        }

        let reason = loop {
            let Some(msg) = self.receiver.recv().await else {
                // Every mailbox sender is gone; nothing can reach this actor.
                break exit_code::NORMAL;
            };
            if self.self_ref.exited() {
                // Force-exited; the wake-up message is discarded.
                break self.self_ref.exit_reason();
            }

            let start = Instant::now();
            let outcome = match msg {
                ActorMessage::Exit(note) => {
                    self.metrics
                        .exit_notifications_handled
                        .fetch_add(1, Ordering::Relaxed);
                    self.behavior.on_peer_exit(note, &self.self_ref).await
                }
                ActorMessage::User(payload) => match payload.downcast::<B::Message>() {
                    Ok(msg) => self.behavior.handle(msg, &self.self_ref).await,
                    Err(_) => {
                        warn!(
                            actor_id = %actor_id,
                            expected_type = std::any::type_name::<B::Message>(),
                            "dropping message of unexpected type"
                        );
                        Ok(())
                    }
                },
            };

            match outcome {
                Ok(()) => self.metrics.record_message_handled(start.elapsed()),
                Err(ActorError::Exited { reason }) => break reason,
                Err(e) => {
                    error!(actor_id = %actor_id, error = %e, "actor message processing failed");
                    break exit_code::UNHANDLED_FAILURE;
                }
            }
        };

        self.finish(reason).await;
    }

    async fn finish(&mut self, reason: u32) {
        // Idempotent when quit or force_exit already ran it.
        self.self_ref.cleanup(reason);

        if let Err(e) = self.behavior.on_stop(&self.self_ref).await {
            error!(actor_id = %self.self_ref.id(), error = %e, "actor failed to stop cleanly");
        }

        self.registry.unregister_actor(self.self_ref.id()).await;
        self.metrics.actors_stopped.fetch_add(1, Ordering::Relaxed);

        info!(
            actor_id = %self.self_ref.id(),
            reason = self.self_ref.exit_reason(),
            "actor task completed"
        );
    }
}
