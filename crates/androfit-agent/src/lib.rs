//! Session assembly and job dispatch for the Androfit voice coach.
//!
//! [`CoachSession`] wires the hosted capability clients and the persona
//! into one conversational session per call; [`Worker`] registers the
//! async entrypoint that runs when the media provider dispatches a job.

pub mod error;
pub mod session;
pub mod worker;

pub use error::AgentError;
pub use session::CoachSession;
pub use worker::{JobContext, Worker};
