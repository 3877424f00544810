//! Multi-modal transit journey planner.
//!
//! Answers: "what is the fastest way from this stop to that one, changing
//! at most N times?" over a metro, commuter rail and tram network joined
//! by walking correspondences.

pub mod config;
pub mod domain;
pub mod geometry;
pub mod planner;
pub mod topology;
pub mod walkable;
pub mod web;
