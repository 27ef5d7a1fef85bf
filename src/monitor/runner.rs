//! Monitor loop: connect, stream, evaluate, dispatch once

use super::{crossed, AlertTarget, MonitorSession, SessionOutcome};
use crate::feed::{FeedConnection, FeedConnector, FeedError, Instrument, PriceTick};
use crate::notify::{format_alert, AlertDispatcher};
use crate::shutdown::{self, sleep_or_shutdown};
use crate::telemetry::{record_dispatch, record_feed_event, record_tick, FeedEvent};
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument as _;

/// Timing knobs for the monitor loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Read window for a single `next_tick` call
    pub tick_timeout: Duration,
    /// Fixed delay between failed connection attempts
    pub connect_retry_delay: Duration,
    /// Pause after a lost connection before reconnecting
    pub reconnect_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_timeout: Duration::from_secs(5),
            connect_retry_delay: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

enum StreamExit {
    /// Transport failed, go back to connecting
    Lost,
    /// Session is over
    Done(SessionOutcome),
}

/// Drives one session at a time for a single instrument.
///
/// Feed errors are absorbed: failed connects are retried forever with a fixed
/// backoff, lost connections are reopened, read timeouts are waited out. The
/// only ways out are the first crossing tick (after exactly one dispatch
/// attempt, successful or not) and the shutdown signal.
pub struct Monitor<C, D> {
    connector: C,
    dispatcher: D,
    config: MonitorConfig,
}

impl<C, D> Monitor<C, D>
where
    C: FeedConnector,
    D: AlertDispatcher,
{
    pub fn new(connector: C, dispatcher: D, config: MonitorConfig) -> Self {
        Self {
            connector,
            dispatcher,
            config,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Monitor `target` until it is crossed or `shutdown` flips to true
    pub async fn run(
        &self,
        target: AlertTarget,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionOutcome {
        self.run_observed(target, shutdown, |_| {}).await
    }

    /// Like `run`, calling `on_tick` with every accepted tick before it is
    /// evaluated
    pub async fn run_observed<F>(
        &self,
        target: AlertTarget,
        shutdown: &mut watch::Receiver<bool>,
        mut on_tick: F,
    ) -> SessionOutcome
    where
        F: FnMut(&PriceTick) + Send,
    {
        let mut session = MonitorSession::new(target);
        let span = tracing::info_span!(
            "session",
            id = %session.id,
            instrument = %session.target.instrument,
        );

        async {
            tracing::info!(
                target_price = %session.target.target_price,
                direction = %session.target.direction,
                "Monitoring started"
            );
            let outcome = self.run_session(&mut session, shutdown, &mut on_tick).await;
            tracing::info!(
                outcome = outcome_label(&outcome),
                elapsed_secs = (chrono::Utc::now() - session.started_at).num_seconds(),
                "Monitoring finished"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_session<F>(
        &self,
        session: &mut MonitorSession,
        shutdown: &mut watch::Receiver<bool>,
        on_tick: &mut F,
    ) -> SessionOutcome
    where
        F: FnMut(&PriceTick) + Send,
    {
        loop {
            let instrument = session.target.instrument.clone();
            let Some(mut conn) = self.connect(&instrument, shutdown).await else {
                return SessionOutcome::Cancelled;
            };

            let exit = self.stream(session, &mut conn, shutdown, on_tick).await;
            conn.close().await;

            match exit {
                StreamExit::Done(outcome) => return outcome,
                StreamExit::Lost => {
                    if !sleep_or_shutdown(self.config.reconnect_delay, shutdown).await {
                        return SessionOutcome::Cancelled;
                    }
                }
            }
        }
    }

    /// Returns `None` only on shutdown
    async fn connect(
        &self,
        instrument: &Instrument,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<C::Connection> {
        let mut attempt: u32 = 0;

        loop {
            if shutdown::is_requested(shutdown) {
                return None;
            }

            attempt += 1;
            record_feed_event(FeedEvent::ConnectAttempt);

            let result = tokio::select! {
                result = self.connector.open(instrument) => result,
                _ = shutdown::wait(shutdown) => return None,
            };

            match result {
                Ok(conn) => {
                    tracing::info!(attempt, "Feed connected");
                    return Some(conn);
                }
                Err(e) => {
                    record_feed_event(FeedEvent::ConnectFailure);
                    tracing::warn!(
                        error = %e,
                        attempt,
                        retry_in = ?self.config.connect_retry_delay,
                        "Feed connection failed, retrying"
                    );
                    if !sleep_or_shutdown(self.config.connect_retry_delay, shutdown).await {
                        return None;
                    }
                }
            }
        }
    }

    async fn stream<F>(
        &self,
        session: &mut MonitorSession,
        conn: &mut C::Connection,
        shutdown: &mut watch::Receiver<bool>,
        on_tick: &mut F,
    ) -> StreamExit
    where
        F: FnMut(&PriceTick) + Send,
    {
        loop {
            let next = tokio::select! {
                next = conn.next_tick(self.config.tick_timeout) => next,
                _ = shutdown::wait(shutdown) => {
                    return StreamExit::Done(SessionOutcome::Cancelled);
                }
            };

            match next {
                Ok(tick) => {
                    record_tick(&tick);
                    tracing::debug!(price = %tick.last_price, "Price update");
                    on_tick(&tick);

                    if session.is_triggered() || !crossed(tick.last_price, &session.target) {
                        continue;
                    }
                    return StreamExit::Done(self.dispatch(session, tick).await);
                }
                Err(FeedError::Timeout) => {
                    record_feed_event(FeedEvent::Timeout);
                    tracing::info!(
                        timeout = ?self.config.tick_timeout,
                        "No price update within read window, still waiting"
                    );
                }
                Err(e) => {
                    record_feed_event(FeedEvent::ConnectionLost);
                    tracing::warn!(
                        error = %e,
                        retry_in = ?self.config.reconnect_delay,
                        "Feed connection lost, reconnecting"
                    );
                    return StreamExit::Lost;
                }
            }
        }
    }

    async fn dispatch(&self, session: &mut MonitorSession, tick: PriceTick) -> SessionOutcome {
        tracing::info!(
            price = %tick.last_price,
            target_price = %session.target.target_price,
            "Target crossed, sending alert"
        );

        let message = format_alert(&session.target, &tick);
        let result = self.dispatcher.send(&message).await;
        session.mark_triggered();
        record_dispatch(result.is_ok());

        match result {
            Ok(()) => {
                tracing::info!("Alert sent");
                SessionOutcome::Alerted(tick)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Alert dispatch failed, ending session");
                SessionOutcome::DispatchFailed(tick)
            }
        }
    }
}

fn outcome_label(outcome: &SessionOutcome) -> &'static str {
    match outcome {
        SessionOutcome::Alerted(_) => "alerted",
        SessionOutcome::DispatchFailed(_) => "dispatch_failed",
        SessionOutcome::Cancelled => "cancelled",
    }
}
