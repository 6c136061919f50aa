//! Concierge - Embeddable AI chat assistant engine
//!
//! This crate implements the conversation orchestration core of a
//! customer-facing chat widget: intent detection, generated replies with
//! confidence scoring, and deterministic hand-off to lead capture or human
//! escalation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
