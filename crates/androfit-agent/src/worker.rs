//! Job dispatch.
//!
//! The media provider hands the worker one job per call; the worker runs
//! the registered entrypoint for each, logging failures per job rather
//! than dying with them.

use crate::error::AgentError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Context for one dispatched job.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: Uuid,
    pub room_name: String,
}

impl JobContext {
    pub fn new(room_name: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            room_name: room_name.into(),
        }
    }
}

type JobFuture = Pin<Box<dyn Future<Output = Result<(), AgentError>> + Send>>;

/// Runs a registered async entrypoint once per dispatched job.
pub struct Worker {
    entrypoint: Arc<dyn Fn(JobContext) -> JobFuture + Send + Sync>,
}

impl Worker {
    /// Registers the job entrypoint.
    pub fn new<F, Fut>(entrypoint: F) -> Self
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AgentError>> + Send + 'static,
    {
        Self {
            entrypoint: Arc::new(move |ctx| Box::pin(entrypoint(ctx))),
        }
    }

    /// Consumes dispatched jobs until the channel closes.
    ///
    /// Jobs run one at a time; a failing entrypoint is logged and the
    /// worker moves on to the next job.
    pub async fn run(&self, mut jobs: mpsc::Receiver<JobContext>) {
        info!("worker ready, waiting for jobs");

        while let Some(ctx) = jobs.recv().await {
            let job_id = ctx.job_id;
            info!(%job_id, room = %ctx.room_name, "dispatching job");

            match (self.entrypoint)(ctx).await {
                Ok(()) => info!(%job_id, "job completed"),
                Err(e) => error!(%job_id, error = %e, "job failed"),
            }
        }

        info!("job channel closed, worker stopping");
    }
}
