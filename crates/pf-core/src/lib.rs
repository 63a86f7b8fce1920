//! pf-core: shared foundation for pipeflow.
//!
//! Contains:
//! - units (uom SI types + constructors for the quantities a pipe network needs)
//! - numeric (Real + tolerances + float guards)
//! - ids (compact IDs for nodes, elements and networks)
//! - error (shared error type)
//! - warning (advisory outcomes that never abort a calculation)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;
pub mod warning;

pub use error::{PfError, PfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
pub use warning::{Warning, WarningKind};
