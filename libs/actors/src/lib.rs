//! Actor Linking and Exit-Propagation Infrastructure
//!
//! Supervision primitive for an actor runtime: bidirectional links between
//! concurrently executing actors, one-shot exit-reason propagation, and a
//! registry of lifecycle observers ("attachables") notified exactly once
//! when an actor terminates.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────┐      ┌────────────────────────────┐
//! │          Actor A           │      │          Actor B           │
//! │  ┌──────────────────────┐  │      │  ┌──────────────────────┐  │
//! │  │ ActorCell            │  │ link │  │ ActorCell            │  │
//! │  │  exit reason         │  │      │  │  exit reason         │  │
//! │  │  link set ───────────┼──┼──────┼──┼─ link set            │  │
//! │  │  attachables         │  │      │  │  attachables         │  │
//! │  └──────────────────────┘  │      │  └──────────────────────┘  │
//! │                            │      │                            │
//! │  run loop ◄── mailbox ◄────┼──────┼── exit notification        │
//! └────────────────────────────┘      └────────────────────────────┘
//! ```
//!
//! Links are symmetric: `link_to` cooperates with the peer's
//! `establish_backlink` so both link sets agree, without ever holding one
//! actor's lock while taking the other's. Termination runs `cleanup`,
//! which drains the link set and attachable registry as one atomic
//! snapshot under the cell's single lock and performs every side effect
//! after releasing it.
//!
//! # Examples
//!
//! ```no_run
//! use linked_actors::{exit_code, ActorBehavior, ActorRef, ActorSystem, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Worker;
//!
//! #[async_trait]
//! impl ActorBehavior for Worker {
//!     type Message = u32;
//!
//!     async fn handle(&mut self, msg: Arc<u32>, ctx: &ActorRef) -> Result<()> {
//!         if *msg == 0 {
//!             return ctx.quit(exit_code::NORMAL);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let system = ActorSystem::new();
//! let worker = system.spawn(Worker).await;
//! let sibling = system.spawn_linked(Worker, &worker).await;
//!
//! // The worker exits; the sibling is notified and follows it down.
//! worker.send(0u32).unwrap();
//! # let _ = sibling;
//! # }
//! ```

pub mod attachable;
pub mod cell;
pub mod error;
pub mod exit_code;
pub mod mailbox;
pub mod messages;
pub mod registry;
pub mod system;

mod links;

pub use attachable::{AttachToken, Attachable, ExitHook};
pub use cell::{ActorCell, ActorRef};
pub use error::{ActorError, Result};
pub use mailbox::{Mailbox, MailboxReceiver};
pub use messages::{ActorMessage, ExitNotification};
pub use registry::{ActorId, ActorRegistry};
pub use system::{ActorBehavior, ActorSystem, SystemMetrics, SystemStats};
