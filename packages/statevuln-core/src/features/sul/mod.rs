/*
 * System Under Learning
 *
 * Port to the live implementation plus the session-limit wrapper.
 */

pub mod error;
pub mod limits;
pub mod ports;

pub use error::{SulError, SulResult};
pub use limits::LimitedSul;
pub use ports::{OutputQuery, SystemUnderLearning};
