#![allow(dead_code)]

use async_trait::async_trait;
use portal::transport::{Invocation, Response, Results, Subscription, Transport};
use portal::{ParentWindow, PortalConfig, PortalError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use zvariant::{OwnedValue, Value};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Keeps every log record so tests can look for the warnings they expect.
/// Installed instead of env_logger; a test binary can only have one.
struct Collector;

static RECORDS: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());
static COLLECTOR: Collector = Collector;

impl log::Log for Collector {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

pub fn capture_logs() {
    if log::set_logger(&COLLECTOR).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

/// Messages logged at `level` that mention `needle`.
pub fn logged(level: log::Level, needle: &str) -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(logged, message)| *logged == level && message.contains(needle))
        .map(|(_, message)| message.clone())
        .collect()
}

pub fn owned<'a>(value: impl Into<Value<'a>>) -> OwnedValue {
    OwnedValue::try_from(value.into()).unwrap()
}

pub fn results<const N: usize>(entries: [(&str, OwnedValue); N]) -> Results {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Everything the lifecycle did to the bus, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Subscribe(String),
    Invoke(String),
    Close(String),
    Unsubscribe(String),
    Unexport,
}

/// What the fake portal does when a method is invoked.
#[derive(Debug)]
pub enum Reply {
    /// Emit `Response` right away.
    Respond(u32, Results),
    /// Accept the call and never answer.
    Hold,
    /// Reject the call.
    Reject(String),
}

#[derive(Debug)]
pub struct Recorded {
    pub interface: &'static str,
    pub method: &'static str,
    pub parent_handle: String,
    pub handle_token: String,
    pub request_path: String,
    pub arguments: Vec<Value<'static>>,
    pub options: HashMap<&'static str, Value<'static>>,
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    responders: HashMap<String, async_channel::Sender<Response>>,
    invocations: Vec<Recorded>,
    replies: VecDeque<Reply>,
    unsubscribes: usize,
}

/// An in-process stand-in for the portal, recording what it was asked.
pub struct MockTransport {
    sender: String,
    prefix: String,
    state: Arc<Mutex<State>>,
    invoked_tx: async_channel::Sender<String>,
    invoked_rx: async_channel::Receiver<String>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        let (invoked_tx, invoked_rx) = async_channel::unbounded();
        Arc::new(Self {
            sender: "1_42".to_string(),
            prefix: PortalConfig::default().request_path_prefix,
            state: Arc::new(Mutex::new(State::default())),
            invoked_tx,
            invoked_rx,
        })
    }

    /// Queue how the next invocation is answered. Invocations without a
    /// queued reply are held.
    pub fn reply(&self, reply: Reply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    pub fn respond_with(&self, code: u32, results: Results) {
        self.reply(Reply::Respond(code, results));
    }

    /// Emit a `Response` on `request_path`, as the portal would.
    pub fn emit(&self, request_path: &str, code: u32, results: Results) {
        let responder = self.state.lock().unwrap().responders.get(request_path).cloned();
        if let Some(responder) = responder {
            let _ = responder.try_send(Response::new(code, results));
        }
    }

    /// Wait until a method has been invoked; yields its request path.
    pub async fn invoked(&self) -> String {
        self.invoked_rx.recv().await.unwrap()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn record(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }

    /// Drain the invocations recorded so far.
    pub fn take_invocations(&self) -> Vec<Recorded> {
        std::mem::take(&mut self.state.lock().unwrap().invocations)
    }

    pub fn invocation_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Invoke(_)))
    }

    pub fn closes(&self) -> usize {
        self.count(|event| matches!(event, Event::Close(_)))
    }

    pub fn subscribes(&self) -> usize {
        self.count(|event| matches!(event, Event::Subscribe(_)))
    }

    pub fn unsubscribes(&self) -> usize {
        self.state.lock().unwrap().unsubscribes
    }

    fn count(&self, filter: impl Fn(&Event) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|event| filter(event))
            .count()
    }

    /// A parent window whose unexport shows up in the event log.
    pub fn parent(self: &Arc<Self>) -> RecordingWindow {
        RecordingWindow {
            transport: Arc::clone(self),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn sender(&self) -> &str {
        &self.sender
    }

    async fn subscribe(&self, request_path: &str) -> Result<Subscription> {
        let (tx, rx) = async_channel::unbounded();
        let path = request_path.to_string();
        {
            let mut state = self.state.lock().unwrap();
            state.events.push(Event::Subscribe(path.clone()));
            state.responders.insert(path.clone(), tx);
        }
        let state = Arc::clone(&self.state);
        Ok(Subscription::new(rx).on_unsubscribe(move || {
            let mut state = state.lock().unwrap();
            state.unsubscribes += 1;
            state.responders.remove(&path);
            state.events.push(Event::Unsubscribe(path));
        }))
    }

    async fn invoke(&self, invocation: Invocation) -> Result<()> {
        let handle_token = invocation.handle_token().unwrap_or_default().to_string();
        let request_path = format!("{}/{}/{}", self.prefix, self.sender, handle_token);
        let reply = {
            let mut state = self.state.lock().unwrap();
            state
                .events
                .push(Event::Invoke(invocation.method.to_string()));
            state.invocations.push(Recorded {
                interface: invocation.interface,
                method: invocation.method,
                parent_handle: invocation.parent_handle.clone(),
                handle_token,
                request_path: request_path.clone(),
                arguments: invocation.arguments,
                options: invocation.options.into_inner(),
            });
            state.replies.pop_front().unwrap_or(Reply::Hold)
        };
        let _ = self.invoked_tx.try_send(request_path.clone());
        match reply {
            Reply::Respond(code, results) => {
                self.emit(&request_path, code, results);
                Ok(())
            }
            Reply::Hold => Ok(()),
            Reply::Reject(reason) => Err(PortalError::transport(reason)),
        }
    }

    async fn close(&self, request_path: &str) -> Result<()> {
        self.record(Event::Close(request_path.to_string()));
        Ok(())
    }
}

pub struct RecordingWindow {
    transport: Arc<MockTransport>,
}

#[async_trait]
impl ParentWindow for RecordingWindow {
    async fn export(&self) -> Result<String> {
        Ok("wayland:exported".to_string())
    }

    fn unexport(&self) {
        self.transport.record(Event::Unexport);
    }
}
