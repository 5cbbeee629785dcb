//! The poll loop: drives status queries for one order until it resolves.

use super::config::PollOptions;
use crate::providers::traits::Provider;
use crate::types::{Order, OrderId, OrderStatus, PollOutcome, RejectionReason};
use crate::utils::sleep::sleep;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, warn};

/// How a poll run ended.
#[derive(Debug)]
pub(crate) enum PollExit {
    /// The loop produced its single terminal outcome.
    Resolved(PollOutcome),
    /// The caller's token fired first. No remote cancel was issued.
    Cancelled,
}

/// Result of a poll run with its counters.
#[derive(Debug)]
pub(crate) struct PollRun {
    pub(crate) exit: PollExit,
    pub(crate) poll_count: u32,
    pub(crate) elapsed: Duration,
}

enum Step {
    Continue,
    Done(PollOutcome),
}

/// Decide what one status means for the loop.
fn evaluate(status: OrderStatus, options: &PollOptions) -> Step {
    match status {
        OrderStatus::Finished(code) => Step::Done(PollOutcome::Success(code)),
        OrderStatus::Received(Some(code)) if options.complete_on_received => {
            Step::Done(PollOutcome::Success(code))
        }
        OrderStatus::Pending | OrderStatus::Received(_) => Step::Continue,
        OrderStatus::Canceled => Step::Done(PollOutcome::Rejected(RejectionReason::Canceled)),
        OrderStatus::Banned => Step::Done(PollOutcome::Rejected(RejectionReason::Banned)),
        OrderStatus::Expired => Step::Done(PollOutcome::Rejected(RejectionReason::Expired)),
        OrderStatus::Unknown(_raw) => {
            #[cfg(feature = "tracing")]
            warn!(status = %_raw, "Unrecognized order status, continuing");
            Step::Continue
        }
    }
}

/// Sleep, query, evaluate; until a terminal status or a failed query.
///
/// Returns `None` when the sleep was interrupted by `token`.
async fn drive<P: Provider>(
    provider: &P,
    order_id: &OrderId,
    options: &PollOptions,
    token: &CancellationToken,
    poll_count: &AtomicU32,
) -> Option<PollOutcome> {
    loop {
        sleep(options.poll_interval, token).await.ok()?;

        let _attempt = poll_count.fetch_add(1, Ordering::Relaxed) + 1;
        match provider.query_status(order_id).await {
            Ok(status) => {
                #[cfg(feature = "tracing")]
                debug!(attempt = _attempt, status = ?status, "Polled order status");

                if let Step::Done(outcome) = evaluate(status, options) {
                    return Some(outcome);
                }
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                error!(error = %e, attempt = _attempt, "Status query failed, polling halted");

                return Some(PollOutcome::TransportFailure(e));
            }
        }
    }
}

/// Run the loop for `order_id` under a deadline and a cancellation token.
///
/// The deadline timer lives inside this call and is dropped on every exit
/// path. On `TimedOut` with `cancel_on_timeout` set, exactly one cancel call
/// is made and its result is ignored.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "sms_order.poll",
        skip_all,
        fields(provider = provider.name(), order_id = %order_id)
    )
)]
pub(crate) async fn run<P: Provider>(
    provider: &P,
    order_id: &OrderId,
    options: &PollOptions,
    token: &CancellationToken,
) -> PollRun {
    let start = Instant::now();
    let poll_count = AtomicU32::new(0);

    #[cfg(feature = "tracing")]
    debug!(
        deadline_secs = %options.deadline.as_secs_f64(),
        interval_ms = %options.poll_interval.as_millis(),
        "Starting status polling"
    );

    let deadline = tokio::time::sleep(options.deadline);
    tokio::pin!(deadline);

    let exit = tokio::select! {
        biased;
        _ = token.cancelled() => PollExit::Cancelled,
        _ = &mut deadline => PollExit::Resolved(PollOutcome::TimedOut),
        outcome = drive(provider, order_id, options, token, &poll_count) => match outcome {
            Some(outcome) => PollExit::Resolved(outcome),
            None => PollExit::Cancelled,
        },
    };

    if matches!(exit, PollExit::Resolved(PollOutcome::TimedOut)) && options.cancel_on_timeout {
        #[cfg(feature = "tracing")]
        warn!(
            deadline_secs = %options.deadline.as_secs_f64(),
            "Deadline reached, cancelling order"
        );

        if let Err(_e) = provider.cancel(order_id).await {
            #[cfg(feature = "tracing")]
            warn!(error = %_e, "Failed to cancel order after timeout");
        }
    }

    let result = PollRun {
        exit,
        poll_count: poll_count.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    };

    #[cfg(feature = "tracing")]
    if let PollExit::Resolved(PollOutcome::Success(code)) = &result.exit {
        info!(
            code = %code,
            poll_count = result.poll_count,
            elapsed_secs = %result.elapsed.as_secs_f64(),
            "SMS code received"
        );
    }

    result
}

/// Poll `order` until it resolves, with no external cancellation.
///
/// Sleeps `poll_interval` before every status query and stops at the first
/// terminal status, the first failed query or the deadline, whichever comes
/// first. Exactly one [`PollOutcome`] is produced.
///
/// ```rust,ignore
/// use sms_rental::{poll_until_resolved, PollOptions, PollOutcome};
///
/// match poll_until_resolved(&provider, &order, &PollOptions::default()).await {
///     PollOutcome::Success(code) => println!("code: {code}"),
///     other => println!("no code: {other:?}"),
/// }
/// ```
pub async fn poll_until_resolved<P: Provider>(
    provider: &P,
    order: &Order,
    options: &PollOptions,
) -> PollOutcome {
    let token = CancellationToken::new();
    match run(provider, &order.order_id, options, &token).await.exit {
        PollExit::Resolved(outcome) => outcome,
        // The token is local and never cancelled.
        PollExit::Cancelled => PollOutcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{Script, ScriptedProvider};
    use crate::types::SmsCode;

    fn options(interval_ms: u64, deadline_ms: u64) -> PollOptions {
        PollOptions::default()
            .with_poll_interval(Duration::from_millis(interval_ms))
            .with_deadline(Duration::from_millis(deadline_ms))
    }

    fn finished(code: &str) -> Script {
        Script::Status(OrderStatus::Finished(SmsCode::from(code)))
    }

    #[tokio::test]
    async fn test_success_after_pending() {
        let provider = ScriptedProvider::new(vec![
            Script::Status(OrderStatus::Pending),
            Script::Status(OrderStatus::Pending),
            finished("1234"),
        ]);
        let token = CancellationToken::new();

        let result = run(&provider, &OrderId::from("1"), &options(0, 5_000), &token).await;

        match result.exit {
            PollExit::Resolved(PollOutcome::Success(code)) => assert_eq!(code.as_str(), "1234"),
            other => panic!("Expected success, got {other:?}"),
        }
        assert_eq!(result.poll_count, 3);
        assert_eq!(provider.queries(), 3);
        assert_eq!(provider.cancels(), 0);
    }

    #[tokio::test]
    async fn test_received_continues_by_default() {
        let provider = ScriptedProvider::new(vec![
            Script::Status(OrderStatus::Received(Some(SmsCode::from("11")))),
            finished("22"),
        ]);

        let outcome =
            poll_until_resolved(&provider, &provider.sample_order(), &options(0, 5_000)).await;

        assert_eq!(outcome.code(), Some(&SmsCode::from("22")));
        assert_eq!(provider.queries(), 2);
    }

    #[tokio::test]
    async fn test_received_completes_when_enabled() {
        let provider = ScriptedProvider::new(vec![
            Script::Status(OrderStatus::Received(Some(SmsCode::from("11")))),
            finished("22"),
        ]);
        let options = options(0, 5_000).with_complete_on_received(true);

        let outcome = poll_until_resolved(&provider, &provider.sample_order(), &options).await;

        assert_eq!(outcome.code(), Some(&SmsCode::from("11")));
        assert_eq!(provider.queries(), 1);
    }

    #[tokio::test]
    async fn test_timeout_cancels_once() {
        let provider = ScriptedProvider::pending_forever();

        let outcome =
            poll_until_resolved(&provider, &provider.sample_order(), &options(10, 60)).await;

        assert!(matches!(outcome, PollOutcome::TimedOut));
        assert_eq!(provider.cancels(), 1);
        let queries = provider.queries();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(provider.queries(), queries, "polling continued after timeout");
    }

    #[tokio::test]
    async fn test_timeout_without_cancel() {
        let provider = ScriptedProvider::pending_forever();
        let options = options(10, 40).with_cancel_on_timeout(false);

        let outcome = poll_until_resolved(&provider, &provider.sample_order(), &options).await;

        assert!(matches!(outcome, PollOutcome::TimedOut));
        assert_eq!(provider.cancels(), 0);
    }

    #[tokio::test]
    async fn test_cancel_failure_is_swallowed() {
        let provider = ScriptedProvider::pending_forever().failing_cancel();

        let outcome =
            poll_until_resolved(&provider, &provider.sample_order(), &options(10, 40)).await;

        assert!(matches!(outcome, PollOutcome::TimedOut));
        assert_eq!(provider.cancels(), 1);
    }

    #[tokio::test]
    async fn test_terminal_rejections_stop_polling() {
        let cases = [
            (OrderStatus::Banned, RejectionReason::Banned),
            (OrderStatus::Canceled, RejectionReason::Canceled),
            (OrderStatus::Expired, RejectionReason::Expired),
        ];

        for (status, reason) in cases {
            let provider = ScriptedProvider::new(vec![
                Script::Status(status),
                finished("never"),
            ]);

            let outcome =
                poll_until_resolved(&provider, &provider.sample_order(), &options(0, 5_000)).await;

            match outcome {
                PollOutcome::Rejected(r) => assert_eq!(r, reason),
                other => panic!("Expected rejection, got {other:?}"),
            }
            assert_eq!(provider.queries(), 1);
            assert_eq!(provider.cancels(), 0);
        }
    }

    #[tokio::test]
    async fn test_query_failure_halts() {
        let provider = ScriptedProvider::new(vec![
            Script::Status(OrderStatus::Pending),
            Script::Fail,
            finished("never"),
        ]);

        let outcome =
            poll_until_resolved(&provider, &provider.sample_order(), &options(0, 5_000)).await;

        assert!(matches!(outcome, PollOutcome::TransportFailure(_)));
        assert_eq!(provider.queries(), 2);
        assert_eq!(provider.cancels(), 0);
    }

    #[tokio::test]
    async fn test_unknown_status_continues() {
        let provider = ScriptedProvider::new(vec![
            Script::Status(OrderStatus::Unknown("7".into())),
            finished("99"),
        ]);

        let outcome =
            poll_until_resolved(&provider, &provider.sample_order(), &options(0, 5_000)).await;

        assert!(outcome.is_success());
        assert_eq!(provider.queries(), 2);
    }

    #[tokio::test]
    async fn test_external_cancellation_skips_remote_cancel() {
        let provider = ScriptedProvider::pending_forever();
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            canceller.cancel();
        });

        let result = run(&provider, &OrderId::from("1"), &options(10, 5_000), &token).await;

        assert!(matches!(result.exit, PollExit::Cancelled));
        assert!(result.elapsed < Duration::from_secs(5));
        assert_eq!(provider.cancels(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_in_flight_query() {
        let provider = ScriptedProvider::pending_forever().with_query_delay(Duration::from_secs(10));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = run(&provider, &OrderId::from("1"), &options(0, 60_000), &token).await;

        assert!(matches!(result.exit, PollExit::Cancelled));
        assert_eq!(result.poll_count, 1);
        assert!(result.elapsed < Duration::from_secs(10));
    }
}
