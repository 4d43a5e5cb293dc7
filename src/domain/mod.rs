// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Plain records and the rules that govern them. Nothing in here talks to the
// database or the network; repositories and services sit on top.
//
// ============================================================================

pub mod delivery;
pub mod medicine;
pub mod order;
