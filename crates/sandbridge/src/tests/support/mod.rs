//! In-memory host used by the bridge tests.
//!
//! Every fake records what the bridge asked of it in a shared [`Journal`] so
//! tests can assert on ordering across collaborators.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::{self, FutureExt};
use serde_json::Value;

use sandbridge_config::{BridgeSettings, StartupArgs, StartupError, WINDOW_CONFIG_ARG};

use crate::configuration::WindowConfiguration;
use crate::environment::LiveEnvironment;
use crate::error::{BridgeError, HostError};
use crate::host::{
    ContextBridge, EnvMap, FileHandle, GlobalScope, HostFuture, HostServices, IpcEvent,
    IpcTransport, Listener, MemoryInfo, MessagePort, ProcessCallback, ProcessHost, WebFrame,
    WebUtils, WindowMessenger,
};
use crate::loader::{LoadedBridge, Publishers, load_bridge};
use crate::reporter::LifecycleReporter;
use crate::surface::CapabilitySurface;

pub const CONFIG_CHANNEL: &str = "vscode:window-config-1";
pub const SHELL_CHANNEL: &str = "vscode:fetchShellEnv";

/// Ordered record of host interactions.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|candidate| candidate == entry)
    }
}

type Reply = Result<Value, HostError>;

struct Registration {
    channel: String,
    listener: Listener,
    once: bool,
}

/// Controller transport double.
///
/// Channels with a scripted reply answer immediately; other invocations stay
/// pending until [`FakeIpc::complete`] or [`FakeIpc::reject`] is called.
pub struct FakeIpc {
    journal: Journal,
    registrations: RefCell<Vec<Registration>>,
    sent: RefCell<Vec<(String, Vec<Value>)>>,
    scripted: RefCell<HashMap<String, Reply>>,
    pending: RefCell<Vec<(String, oneshot::Sender<Reply>)>>,
    invocations: RefCell<Vec<String>>,
}

impl FakeIpc {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            registrations: RefCell::new(Vec::new()),
            sent: RefCell::new(Vec::new()),
            scripted: RefCell::new(HashMap::new()),
            pending: RefCell::new(Vec::new()),
            invocations: RefCell::new(Vec::new()),
        }
    }

    pub fn script_reply(&self, channel: &str, reply: Value) {
        self.scripted
            .borrow_mut()
            .insert(channel.to_owned(), Ok(reply));
    }

    pub fn script_rejection(&self, channel: &str, message: &str) {
        self.scripted
            .borrow_mut()
            .insert(channel.to_owned(), Err(HostError::new(message)));
    }

    /// Answers the oldest pending invocation on `channel`.
    pub fn complete(&self, channel: &str, reply: Value) {
        self.settle(channel, Ok(reply));
    }

    /// Rejects the oldest pending invocation on `channel`.
    pub fn reject(&self, channel: &str, message: &str) {
        self.settle(channel, Err(HostError::new(message)));
    }

    fn settle(&self, channel: &str, reply: Reply) {
        let sender = {
            let mut pending = self.pending.borrow_mut();
            let index = pending
                .iter()
                .position(|(candidate, _)| candidate == channel)
                .unwrap_or_else(|| panic!("no pending invocation on {channel}"));
            pending.remove(index).1
        };
        sender
            .send(reply)
            .unwrap_or_else(|_| panic!("invocation on {channel} was dropped"));
    }

    /// Delivers a message to every listener registered on `channel`.
    pub fn emit(&self, channel: &str, event: &IpcEvent, args: &[Value]) {
        let targets: Vec<Listener> = {
            let mut registrations = self.registrations.borrow_mut();
            let targets = registrations
                .iter()
                .filter(|registration| registration.channel == channel)
                .map(|registration| Rc::clone(&registration.listener))
                .collect();
            registrations.retain(|registration| !(registration.channel == channel && registration.once));
            targets
        };
        for listener in targets {
            listener(event, args);
        }
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|registration| registration.channel == channel)
            .count()
    }

    pub fn invocation_count(&self, channel: &str) -> usize {
        self.invocations
            .borrow()
            .iter()
            .filter(|candidate| candidate.as_str() == channel)
            .count()
    }

    pub fn sent(&self) -> Vec<(String, Vec<Value>)> {
        self.sent.borrow().clone()
    }

    pub fn has_pending(&self, channel: &str) -> bool {
        self.pending
            .borrow()
            .iter()
            .any(|(candidate, _)| candidate == channel)
    }
}

impl IpcTransport for FakeIpc {
    fn send(&self, channel: &str, args: &[Value]) {
        self.journal.record(format!("send:{channel}"));
        self.sent
            .borrow_mut()
            .push((channel.to_owned(), args.to_vec()));
    }

    fn invoke(&self, channel: &str, _args: &[Value]) -> HostFuture<Value> {
        self.journal.record(format!("invoke:{channel}"));
        self.invocations.borrow_mut().push(channel.to_owned());
        if let Some(reply) = self.scripted.borrow().get(channel) {
            return future::ready(reply.clone()).boxed_local();
        }
        let (sender, receiver) = oneshot::channel();
        self.pending
            .borrow_mut()
            .push((channel.to_owned(), sender));
        receiver
            .map(|outcome| {
                outcome.unwrap_or_else(|_| Err(HostError::new("controller dropped the request")))
            })
            .boxed_local()
    }

    fn on(&self, channel: &str, listener: Listener) {
        self.journal.record(format!("on:{channel}"));
        self.registrations.borrow_mut().push(Registration {
            channel: channel.to_owned(),
            listener,
            once: false,
        });
    }

    fn once(&self, channel: &str, listener: Listener) {
        self.journal.record(format!("once:{channel}"));
        self.registrations.borrow_mut().push(Registration {
            channel: channel.to_owned(),
            listener,
            once: true,
        });
    }

    fn remove_listener(&self, channel: &str, listener: &Listener) {
        self.journal.record(format!("remove_listener:{channel}"));
        let mut registrations = self.registrations.borrow_mut();
        if let Some(index) = registrations.iter().position(|registration| {
            registration.channel == channel && Rc::ptr_eq(&registration.listener, listener)
        }) {
            registrations.remove(index);
        }
    }
}

/// Web frame double recording every zoom change.
#[derive(Default)]
pub struct FakeFrame {
    zoom_levels: RefCell<Vec<f64>>,
}

impl FakeFrame {
    pub fn zoom_levels(&self) -> Vec<f64> {
        self.zoom_levels.borrow().clone()
    }
}

impl WebFrame for FakeFrame {
    fn set_zoom_level(&self, level: f64) {
        self.zoom_levels.borrow_mut().push(level);
    }
}

/// File helper double mapping handles to synthetic paths.
#[derive(Default)]
pub struct FakeUtils;

impl WebUtils for FakeUtils {
    fn path_for_file(&self, file: &FileHandle) -> String {
        format!("/host/files/{}", file.id())
    }
}

/// Process metadata double.
pub struct FakeProcess {
    platform: RefCell<String>,
    exec_path: RefCell<String>,
    callbacks: RefCell<Vec<(String, ProcessCallback)>>,
    memory_requests: Cell<usize>,
}

impl Default for FakeProcess {
    fn default() -> Self {
        Self {
            platform: RefCell::new("linux".to_owned()),
            exec_path: RefCell::new("/opt/app/bin/app".to_owned()),
            callbacks: RefCell::new(Vec::new()),
            memory_requests: Cell::new(0),
        }
    }
}

impl FakeProcess {
    pub fn set_platform(&self, platform: &str) {
        *self.platform.borrow_mut() = platform.to_owned();
    }

    pub fn set_exec_path(&self, path: &str) {
        *self.exec_path.borrow_mut() = path.to_owned();
    }

    pub fn fire(&self, event_type: &str, args: &[Value]) {
        let targets: Vec<ProcessCallback> = self
            .callbacks
            .borrow()
            .iter()
            .filter(|(candidate, _)| candidate == event_type)
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in targets {
            callback(args);
        }
    }

    pub fn memory_requests(&self) -> usize {
        self.memory_requests.get()
    }
}

impl ProcessHost for FakeProcess {
    fn platform(&self) -> String {
        self.platform.borrow().clone()
    }

    fn arch(&self) -> String {
        "x64".to_owned()
    }

    fn versions(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("chrome".to_owned(), "120.0.0".to_owned()),
            ("electron".to_owned(), "28.0.0".to_owned()),
        ])
    }

    fn exec_path(&self) -> String {
        self.exec_path.borrow().clone()
    }

    fn memory_info(&self) -> HostFuture<MemoryInfo> {
        self.memory_requests.set(self.memory_requests.get() + 1);
        future::ready(Ok(MemoryInfo {
            private: 1024,
            resident_set: 2048,
            shared: 512,
        }))
        .boxed_local()
    }

    fn on(&self, event_type: &str, callback: ProcessCallback) {
        self.callbacks
            .borrow_mut()
            .push((event_type.to_owned(), callback));
    }
}

/// A message posted into the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Posted {
    pub message: Value,
    pub target_origin: String,
    pub ports: Vec<MessagePort>,
}

/// Window messenger double.
#[derive(Default)]
pub struct FakeMessenger {
    posted: RefCell<Vec<Posted>>,
}

impl FakeMessenger {
    pub fn posted(&self) -> Vec<Posted> {
        self.posted.borrow().clone()
    }
}

impl WindowMessenger for FakeMessenger {
    fn post_message(&self, message: Value, target_origin: &str, ports: Vec<MessagePort>) {
        self.posted.borrow_mut().push(Posted {
            message,
            target_origin: target_origin.to_owned(),
            ports,
        });
    }
}

/// Isolation bridge double; refuses publication when given a failure.
pub struct FakeContextBridge {
    journal: Journal,
    failure: Option<String>,
    exposed: RefCell<Vec<(String, Rc<CapabilitySurface>)>>,
}

impl FakeContextBridge {
    pub fn exposed_keys(&self) -> Vec<String> {
        self.exposed
            .borrow()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn exposed_surface(&self) -> Option<Rc<CapabilitySurface>> {
        self.exposed
            .borrow()
            .first()
            .map(|(_, surface)| Rc::clone(surface))
    }
}

impl ContextBridge for FakeContextBridge {
    fn expose_in_main_world(
        &self,
        key: &str,
        surface: Rc<CapabilitySurface>,
    ) -> Result<(), HostError> {
        self.journal.record(format!("expose:{key}"));
        if let Some(message) = &self.failure {
            return Err(HostError::new(message.clone()));
        }
        self.exposed.borrow_mut().push((key.to_owned(), surface));
        Ok(())
    }
}

/// Shared global namespace double.
pub struct FakeGlobalScope {
    journal: Journal,
    bound: RefCell<Vec<String>>,
}

impl FakeGlobalScope {
    pub fn bound_keys(&self) -> Vec<String> {
        self.bound.borrow().clone()
    }
}

impl GlobalScope for FakeGlobalScope {
    fn bind(&self, key: &str, _surface: Rc<CapabilitySurface>) {
        self.journal.record(format!("bind:{key}"));
        self.bound.borrow_mut().push(key.to_owned());
    }
}

/// Reporter writing lifecycle events into the journal.
pub struct RecordingReporter {
    journal: Journal,
}

impl LifecycleReporter for RecordingReporter {
    fn loading(&self) {
        self.journal.record("report:loading");
    }

    fn configuration_resolved(&self, _configuration: &WindowConfiguration) {
        self.journal.record("report:configuration_resolved");
    }

    fn configuration_failed(&self, _error: &BridgeError) {
        self.journal.record("report:configuration_failed");
    }

    fn published(&self, isolated: bool) {
        self.journal.record(format!("report:published:{isolated}"));
    }

    fn publication_failed(&self, _error: &BridgeError) {
        self.journal.record("report:publication_failed");
    }
}

/// Fake host plus the executor driving the bridge's background tasks.
pub struct Harness {
    pub journal: Journal,
    pub ipc: Rc<FakeIpc>,
    pub frame: Rc<FakeFrame>,
    pub utils: Rc<FakeUtils>,
    pub process: Rc<FakeProcess>,
    pub messenger: Rc<FakeMessenger>,
    pub environment: LiveEnvironment,
    pub context_bridge: FakeContextBridge,
    pub global_scope: FakeGlobalScope,
    pub pool: LocalPool,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let journal = Journal::default();
        let environment = LiveEnvironment::from_map(env_map(vars));
        Self {
            ipc: Rc::new(FakeIpc::new(journal.clone())),
            frame: Rc::new(FakeFrame::default()),
            utils: Rc::new(FakeUtils),
            process: Rc::new(FakeProcess::default()),
            messenger: Rc::new(FakeMessenger::default()),
            environment,
            context_bridge: FakeContextBridge {
                journal: journal.clone(),
                failure: None,
                exposed: RefCell::new(Vec::new()),
            },
            global_scope: FakeGlobalScope {
                journal: journal.clone(),
                bound: RefCell::new(Vec::new()),
            },
            journal,
            pool: LocalPool::new(),
        }
    }

    /// Makes the isolation bridge refuse publication with `message`.
    pub fn refuse_publication(&mut self, message: &str) {
        self.context_bridge.failure = Some(message.to_owned());
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            ipc: self.ipc.clone(),
            web_frame: self.frame.clone(),
            web_utils: self.utils.clone(),
            process: self.process.clone(),
            messenger: self.messenger.clone(),
            environment: self.environment.clone(),
        }
    }

    /// Runs the load sequence against this host.
    pub fn load(
        &self,
        startup: Result<StartupArgs, StartupError>,
        context_isolation: bool,
    ) -> Result<LoadedBridge, BridgeError> {
        let settings = BridgeSettings::default().with_context_isolation(context_isolation);
        let reporter: Rc<dyn LifecycleReporter> = Rc::new(RecordingReporter {
            journal: self.journal.clone(),
        });
        load_bridge(
            startup,
            &settings,
            &self.services(),
            Publishers {
                bridge: &self.context_bridge,
                scope: &self.global_scope,
            },
            &self.pool.spawner(),
            &reporter,
        )
    }

    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }
}

/// Startup arguments naming the test configuration channel.
pub fn startup() -> Result<StartupArgs, StartupError> {
    startup_with_channel(CONFIG_CHANNEL)
}

pub fn startup_with_channel(channel: &str) -> Result<StartupArgs, StartupError> {
    StartupArgs::parse([
        "--enable-sandbox".to_owned(),
        format!("--{WINDOW_CONFIG_ARG}={channel}"),
    ])
}

pub fn env_map(vars: &[(&str, &str)]) -> EnvMap {
    vars.iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}
