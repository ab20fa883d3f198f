//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - The pipeline owns a [`Batch`] and lends it to a sink for one `consume` call
//! - A [`Codec`] turns each [`Event`] into one self-contained fragment
//! - The sink answers with `Option<SinkResult>`; `None` means "nothing to do"

mod blueprint;
mod codec;
mod error;
mod event;
mod sink;

pub use blueprint::*;
pub use codec::Codec;
pub use error::*;
pub use event::{Batch, Event};
pub use sink::*;
