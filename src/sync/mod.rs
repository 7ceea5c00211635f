//! Local-then-remote synchronization of profile updates.

/// Persist-then-mirror coordinator.
pub mod coordinator;
/// Event stream types emitted by the coordinator.
pub mod events;
/// Remote mirror port and in-memory implementation.
pub mod remote;
