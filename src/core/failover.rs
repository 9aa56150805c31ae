//! Mirror failover for one fetch item.
//!
//! Candidates are consumed front to back exactly once. The first skip
//! decision or successful transfer ends the item; any retryable error moves
//! on to the next candidate. Running out of candidates is the only way a
//! retryable error escapes this module.

use crate::core::dest::DestinationSpec;
use crate::core::error::{FetchError, Result};
use crate::core::executor;
use crate::core::freshness::should_fetch;
use crate::core::options::TaskOptions;
use crate::core::output;
use crate::core::report::{AttemptOutcome, FetchAttempt, ItemReport};
use crate::core::source::FetchItem;
use crate::transport::Transport;
use std::time::Instant;

/// Fetch `item` into `destination`, falling over between its candidates.
pub fn fetch_with_failover(
    transport: &dyn Transport,
    item: &FetchItem,
    destination: &DestinationSpec,
    options: &TaskOptions,
) -> Result<ItemReport> {
    let total = item.candidates().len();
    let mut attempts = Vec::with_capacity(total);
    let mut last_error = None;

    for (index, candidate) in item.candidates().iter().enumerate() {
        let dest_file = destination.file_for(candidate);
        let started = Instant::now();
        let mut record = |outcome: AttemptOutcome| {
            attempts.push(FetchAttempt {
                location: candidate.to_string(),
                destination: dest_file.clone(),
                outcome,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        };

        if total > 1 && !options.quiet {
            output::attempt(index + 1, total, &candidate.to_string());
        }

        // A failed probe says as much about this mirror as a failed transfer
        let outcome = should_fetch(transport, candidate, &dest_file, options).and_then(|decision| {
            if decision.fetch {
                executor::fetch(transport, candidate, &dest_file, options)
                    .map(|result| (decision, Some(result)))
            } else {
                Ok((decision, None))
            }
        });

        match outcome {
            Ok((decision, Some(result))) => {
                record(AttemptOutcome::Success {
                    bytes: result.bytes,
                });
                return Ok(ItemReport {
                    destination: dest_file,
                    executed: true,
                    reason: decision.reason,
                    attempts,
                });
            }
            Ok((decision, None)) => {
                record(AttemptOutcome::Skip {
                    reason: decision.reason,
                });
                return Ok(ItemReport {
                    destination: dest_file,
                    executed: false,
                    reason: decision.reason,
                    attempts,
                });
            }
            Err(err) if err.is_retryable() => {
                // Retryable errors already name the location
                output::warning(&err.to_string());
                record(AttemptOutcome::TransientFailure {
                    error: err.to_string(),
                });
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    let Some(last) = last_error else {
        return Err(FetchError::config("no candidate sources to fetch from"));
    };
    Err(FetchError::AllCandidatesFailed {
        tried: attempts.len(),
        last: Box::new(last),
    })
}
