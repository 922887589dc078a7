//! Data Transfer Objects (DTOs)
//!
//! Wire types at the engine boundary: the snapshot going in and the
//! report coming out.

mod leg_dto;
mod report;
mod snapshot;

pub use leg_dto::LegDto;
pub use report::{GroupReport, PortfolioReport};
pub use snapshot::{PositionGroupDto, RejectedLegDto, Snapshot, ValidatedSnapshot};
