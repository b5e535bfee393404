//! Exchange-agnostic domain logic.
//!
//! Holds the data model (addresses, positions, snapshots, subscriptions),
//! the change-detection engine and the notification renderer. Nothing in
//! here performs I/O.

pub mod diff;
pub mod error;
pub mod id;
pub mod position;
pub mod render;
pub mod snapshot;
pub mod subscription;

pub use diff::{detect, ChangeEvent, DetectionPolicy, DiffReport, SizeDirection};
pub use id::{shorten, Address, RecipientId};
pub use position::{CumulativeFunding, Leverage, Position, Side};
pub use snapshot::{AccountSnapshot, AccountState};
pub use subscription::{Subscription, DEFAULT_DISPLAY_NAME};
