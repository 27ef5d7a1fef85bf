//! Scripted feed and dispatcher doubles for driving the monitor

use async_trait::async_trait;
use price_alert::feed::{FeedConnection, FeedConnector, FeedError, Instrument, PriceTick};
use price_alert::notify::{AlertDispatcher, DispatchError};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What a scripted connection yields on each `next_tick`
#[derive(Debug, Clone)]
pub enum Step {
    Tick(Decimal),
    Timeout,
    Lost,
}

/// Outcome of one `open` call
pub enum Plan {
    Refuse,
    Accept(Vec<Step>),
}

/// Everything the monitor did to the feed, timestamped on the tokio clock
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OpenFailed { at: Duration },
    Opened { id: usize, instrument: Instrument, at: Duration },
    Read { id: usize },
    Closed { id: usize },
}

struct Shared {
    plans: VecDeque<Plan>,
    events: Vec<Event>,
    next_id: usize,
}

#[derive(Clone)]
pub struct ScriptedConnector {
    shared: Arc<Mutex<Shared>>,
    start: Instant,
}

impl ScriptedConnector {
    /// Once the plans run out, `open` hands out silent connections
    pub fn new(plans: Vec<Plan>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                plans: plans.into(),
                events: Vec::new(),
                next_id: 0,
            })),
            start: Instant::now(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.shared.lock().unwrap().events.clone()
    }

    pub fn open_times(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::OpenFailed { at } | Event::Opened { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

#[async_trait]
impl FeedConnector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn open(&self, instrument: &Instrument) -> Result<ScriptedConnection, FeedError> {
        let at = self.start.elapsed();
        let mut shared = self.shared.lock().unwrap();

        match shared.plans.pop_front() {
            Some(Plan::Refuse) => {
                shared.events.push(Event::OpenFailed { at });
                Err(FeedError::Connect("connection refused".into()))
            }
            plan => {
                let steps = match plan {
                    Some(Plan::Accept(steps)) => steps.into(),
                    _ => VecDeque::new(),
                };
                let id = shared.next_id;
                shared.next_id += 1;
                shared.events.push(Event::Opened {
                    id,
                    instrument: instrument.clone(),
                    at,
                });
                Ok(ScriptedConnection {
                    id,
                    instrument: instrument.clone(),
                    steps,
                    shared: Arc::clone(&self.shared),
                })
            }
        }
    }
}

pub struct ScriptedConnection {
    id: usize,
    instrument: Instrument,
    steps: VecDeque<Step>,
    shared: Arc<Mutex<Shared>>,
}

#[async_trait]
impl FeedConnection for ScriptedConnection {
    async fn next_tick(&mut self, timeout: Duration) -> Result<PriceTick, FeedError> {
        self.shared
            .lock()
            .unwrap()
            .events
            .push(Event::Read { id: self.id });

        match self.steps.pop_front() {
            Some(Step::Tick(price)) => Ok(PriceTick::now(self.instrument.clone(), price)),
            Some(Step::Lost) => Err(FeedError::ConnectionLost("reset by peer".into())),
            Some(Step::Timeout) | None => {
                tokio::time::sleep(timeout).await;
                Err(FeedError::Timeout)
            }
        }
    }

    async fn close(&mut self) {
        self.shared
            .lock()
            .unwrap()
            .events
            .push(Event::Closed { id: self.id });
    }
}

/// Records every message; optionally fails every send
#[derive(Default)]
pub struct RecordingDispatcher {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertDispatcher for RecordingDispatcher {
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            Err(DispatchError::Status {
                status: 502,
                body: "Bad Gateway".into(),
            })
        } else {
            Ok(())
        }
    }
}
