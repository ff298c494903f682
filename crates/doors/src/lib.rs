//! Reader/writer "doors" guarding shared session state.
//!
//! A door is an integer-identified lock slot (timeline, receivers,
//! transmitters, ...). Operations that mutate session state acquire the
//! doors covering that state exclusively; readers acquire them shared.
//!
//! # Architecture
//!
//! ```text
//! LockManager
//! ┌───────────────────────────────┐
//! │ Mutex<DoorTable>              │   one mutex guards every transition,
//! │   [DoorState; MAX_DOORS]      │   multi-door requests are granted
//! │ Condvar (released)            │   as a single indivisible step
//! └───────────────────────────────┘
//!            ▲            │
//!   acquire_*│            │ DoorGuard (RAII, releases on drop)
//! ```

mod door;
mod guard;
mod manager;

pub use door::{DoorSet, MAX_DOORS};
pub use guard::{Access, DoorGuard};
pub use manager::{DoorSnapshot, LockManager};
