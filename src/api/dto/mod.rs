//! Data Transfer Objects for REST request/response serialization.
//!
//! Response bodies use camelCase keys, which is what the browser clients
//! consuming the trigger and proxy endpoints expect.

pub mod diagnostic_dto;
pub mod proxy_dto;
pub mod snapshot_dto;
pub mod sync_dto;

pub use diagnostic_dto::*;
pub use proxy_dto::*;
pub use snapshot_dto::*;
pub use sync_dto::*;
