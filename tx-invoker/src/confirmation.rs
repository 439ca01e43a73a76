//! Confirmation polling of submitted transactions

use std::time::Duration;

use strum_macros::Display;
use tracing::{event, span, Instrument, Level};

use crate::error::{Error, Result};
use crate::network::{Network, SubmissionHandle};

/// How many times and how often the status of a submitted transaction is queried
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(3_000),
        }
    }
}

#[derive(Display)]
enum Event {
    Waiting,
    StatusObserved,
    Confirmed,
    AttemptsExhausted,
}

/// Poll the ledger until the handle reaches a terminal status.
///
/// Every attempt waits `policy.interval` before querying, attempts are sequential.
/// A handle that is already terminal is returned untouched.
/// Running out of attempts while still pending is a `ConfirmationTimeout`: the
/// transaction may still land, its outcome is unknown.
pub async fn await_confirmation(
    network: &impl Network,
    handle: &mut SubmissionHandle,
    policy: &PollPolicy,
) -> Result<()> {
    let mut attempt = 0;

    while !handle.status().is_terminal() && attempt < policy.max_attempts {
        attempt += 1;

        let span = span!(Level::DEBUG, "PollAttempt", attempt, max = policy.max_attempts);
        async {
            event!(Level::DEBUG, label=%Event::Waiting, status=%handle.status(), wait=?policy.interval);
            tokio::time::sleep(policy.interval).await;

            let next = network
                .get_transaction_status(handle.transaction_id())
                .await
                .map_err(Error::Network)?;

            event!(Level::DEBUG, label=%Event::StatusObserved, status=%next.status);
            handle.observe(next);
            Ok::<_, Error>(())
        }
        .instrument(span)
        .await?;
    }

    if handle.status().is_terminal() {
        event!(Level::DEBUG, label=%Event::Confirmed, status=%handle.status(), attempts=attempt);
        Ok(())
    } else {
        event!(Level::WARN, label=%Event::AttemptsExhausted, tx_id=%handle.transaction_id(), attempts=attempt);
        Err(Error::ConfirmationTimeout {
            transaction_id: handle.transaction_id().clone(),
            attempts: attempt,
        })
    }
}
