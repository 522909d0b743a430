//! In-memory collaborators for driving `FormController` in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::config::FormConfig;
use crate::controller::FormController;
use crate::net::api::Backend;
use crate::net::types::{
    ApiError, DeviceLookupRequest, DeviceLookupResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use crate::util::storage::MemoryStore;
use crate::util::timer::Timer;

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Login(LoginRequest),
    Register(RegisterRequest),
    Lookup(DeviceLookupRequest),
}

/// Scripted backend. Unscripted calls fail with a network error.
#[derive(Default)]
pub struct MockBackend {
    pub login_reply: RefCell<Option<Result<LoginResponse, ApiError>>>,
    pub register_reply: RefCell<Option<Result<RegisterResponse, ApiError>>>,
    pub lookup_reply: RefCell<Option<Result<DeviceLookupResponse, ApiError>>>,
    /// Per-call lookup replies, taken in call order before `lookup_reply`.
    pub lookup_queue: RefCell<VecDeque<Result<DeviceLookupResponse, ApiError>>>,
    pub calls: RefCell<Vec<Call>>,
    gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
}

impl MockBackend {
    /// Hold the next not-yet-held call open until the returned sender fires.
    /// Repeated calls hold successive backend calls.
    pub fn hold_next_call(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    async fn wait_gate(&self) {
        let gate = self.gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

fn unscripted<T>() -> Result<T, ApiError> {
    Err(ApiError::Network("unscripted call".to_owned()))
}

#[async_trait(?Send)]
impl Backend for MockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Login(request.clone()));
        self.wait_gate().await;
        self.login_reply.borrow().clone().unwrap_or_else(unscripted)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Register(request.clone()));
        self.wait_gate().await;
        self.register_reply.borrow().clone().unwrap_or_else(unscripted)
    }

    async fn lookup_device(&self, request: &DeviceLookupRequest) -> Result<DeviceLookupResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Lookup(request.clone()));
        let queued = self.lookup_queue.borrow_mut().pop_front();
        self.wait_gate().await;
        queued.or_else(|| self.lookup_reply.borrow().clone()).unwrap_or_else(unscripted)
    }
}

/// Timer whose callbacks only run when fired explicitly.
#[derive(Default)]
pub struct ManualTimer {
    pending: RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>,
}

impl ManualTimer {
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.pending.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Run the `index`-th pending callback (in scheduling order).
    pub fn fire(&self, index: usize) {
        let (_, task) = self.pending.borrow_mut().remove(index);
        task();
    }

    pub fn fire_all(&self) {
        let tasks = std::mem::take(&mut *self.pending.borrow_mut());
        for (_, task) in tasks {
            task();
        }
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.pending.borrow_mut().push((delay, task));
    }
}

pub struct Harness {
    pub controller: FormController,
    pub backend: Rc<MockBackend>,
    pub store: Rc<MemoryStore>,
    pub timer: Rc<ManualTimer>,
}

pub fn harness() -> Harness {
    let backend = Rc::new(MockBackend::default());
    let store = Rc::new(MemoryStore::new());
    let timer = Rc::new(ManualTimer::default());
    let controller = FormController::new(FormConfig::default(), backend.clone(), store.clone(), timer.clone());
    Harness { controller, backend, store, timer }
}
