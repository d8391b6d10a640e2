use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{JoinError, JoinSet};

use crate::http_probe::prelude::*;
use crate::http_probe::probe;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("probe could not be scheduled")]
    Scheduling(#[from] AcquireError),
    #[error("probe worker failed")]
    Worker(#[from] JoinError),
}

/// Results of a batch of probes, handed out in completion order.
pub struct ProbeRun {
    tasks: JoinSet<Result<ProbeResult, AcquireError>>,
}

impl ProbeRun {
    /// Waits for the next probe to finish. `Ok(None)` once every submitted
    /// probe has been yielded.
    pub async fn next(&mut self) -> Result<Option<ProbeResult>, RunError> {
        match self.tasks.join_next().await {
            None => Ok(None),
            Some(joined) => {
                let result = joined.map_err(|e| {
                    log::error!("Probe worker failed: {e}");
                    RunError::from(e)
                })??;
                Ok(Some(result))
            }
        }
    }

    /// Number of probes not yet yielded.
    pub fn remaining(&self) -> usize {
        self.tasks.len()
    }
}

/// Submits `count` probes up front, numbered from 1, with at most
/// `max(1, concurrency)` of them connected at any time.
///
/// Must be called from within a tokio runtime.
pub fn run_all<C: Connector>(
    count: usize,
    concurrency: usize,
    template: &ProbeTemplate,
    connector: Arc<C>,
) -> ProbeRun {
    let workers = concurrency.clamp(1, Semaphore::MAX_PERMITS);
    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks: JoinSet<Result<ProbeResult, AcquireError>> = JoinSet::new();

    log::info!(
        "Submitting {count} probes to {}:{}{} with {workers} workers",
        template.host(),
        template.port(),
        template.path()
    );

    for id in 1..=count as u64 {
        let request = template.request(id);
        let permits = Arc::clone(&permits);
        let connector = Arc::clone(&connector);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            Ok::<_, AcquireError>(probe::run(connector.as_ref(), &request).await)
        });
    }

    ProbeRun { tasks }
}
