//! End-to-end create → poll → execute flow.

use tracing::{error, info};

use crate::Result;
use crate::config::PollConfig;
use crate::error::{Error, Status};
use crate::rfq::client::RfqApi;
use crate::rfq::poller::poll_quotes;
use crate::rfq::types::{ExecutionResult, Quote, RfqHandle};

/// What each stage of a successful run produced.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOutcome {
    pub rfq: RfqHandle,
    pub quote: Quote,
    pub execution: ExecutionResult,
}

/// Runs one RFQ to execution. Any stage failing aborts the run; nothing is resumed.
#[derive(Debug)]
pub struct Workflow<'api, A: ?Sized> {
    api: &'api A,
    poll: PollConfig,
}

impl<'api, A> Workflow<'api, A>
where
    A: RfqApi + ?Sized,
{
    #[must_use]
    pub fn new(api: &'api A, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    pub async fn run(&self) -> Result<WorkflowOutcome> {
        let rfq = self.api.create_rfq().await?;
        let quote = poll_quotes(self.api, &rfq, self.poll).await?;

        let execution = match self.api.execute_quote(&rfq, &quote.quote_id).await {
            Ok(execution) => execution,
            Err(e) => {
                report_execute_failure(&e);
                return Err(e);
            }
        };

        info!(rfq = %rfq, quote_id = %quote.quote_id, "workflow complete");
        Ok(WorkflowOutcome {
            rfq,
            quote,
            execution,
        })
    }
}

/// Logs an execute failure together with its request/response snapshot, when one is attached.
fn report_execute_failure(err: &Error) {
    let Some(status) = err.downcast_ref::<Status>() else {
        error!(error = %err, "execute failed");
        return;
    };

    error!(
        status = status.status_code.as_u16(),
        method = %status.method,
        path = %status.path,
        body = %status.message,
        "execute rejected"
    );
    if let Some(diagnostics) = &status.diagnostics {
        error!("\n{diagnostics}");
    }
}
