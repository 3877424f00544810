//! Domain types for the transit journey planner.
//!
//! This module contains the core domain model types that represent
//! validated network data. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod error;
mod journey;
mod leg;
mod route;
mod stop;

pub use error::DomainError;
pub use journey::Journey;
pub use leg::{Leg, TransitLeg, WalkingLeg};
pub use route::{InvalidColor, InvalidMode, LineColor, Route, SpeedClass, TransportMode};
pub use stop::{InvalidId, PlaceId, RouteId, Stop, StopId, StopPoint};
