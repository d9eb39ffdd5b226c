//! Reactive Runtime
//!
//! The runtime is a reactivity domain: it owns an identity registry, the
//! collaborators that hear about reads and writes, and the factory that turns
//! raw objects into wrappers.
//!
//! # How It Works
//!
//! `reactive(target)` runs four checks in order:
//!
//! 1. Primitives are returned unchanged.
//! 2. A raw object that already has a live wrapper gets that wrapper back.
//! 3. An object that is itself one of our wrappers is returned unchanged.
//! 4. Anything else gets a new proxy bound to a [`MutableHandler`], which is
//!    registered before it is returned.
//!
//! Steps 2 through 4 run under the registry lock, so two threads racing on
//! the same raw object still end up with a single wrapper.
//!
//! # Domains
//!
//! There is no global registry. Each [`Runtime`] is independent: wrapping the
//! same raw object in two runtimes yields two different wrappers, and a
//! wrapper from one runtime is raw data as far as the other is concerned.
//! Cloning a `Runtime` shares its domain.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::handlers::MutableHandler;
use super::notifier::{ChangeNotifier, DependencyTracker, NoopTracker, TracingNotifier};
use super::registry::IdentityRegistry;
use crate::config::RuntimeConfig;
use crate::object::{ObjectRef, Value};

/// Unique identifier for a runtime, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeId(u64);

impl RuntimeId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct RegistryState {
    registry: IdentityRegistry,
    /// Registrations since the last sweep.
    since_sweep: usize,
}

/// State shared by a runtime and every handler it installs.
///
/// Handlers hold this strongly while the registry only holds weak
/// references to wrappers, so no reference cycle forms.
pub(crate) struct RuntimeInner {
    id: RuntimeId,
    config: RuntimeConfig,
    state: Mutex<RegistryState>,
    notifier: Arc<dyn ChangeNotifier>,
    tracker: Arc<dyn DependencyTracker>,
}

impl RuntimeInner {
    pub(crate) fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) fn notifier(&self) -> &dyn ChangeNotifier {
        &*self.notifier
    }

    pub(crate) fn tracker(&self) -> &dyn DependencyTracker {
        &*self.tracker
    }

    /// The factory proper, for object targets.
    pub(crate) fn reactive_object(self: &Arc<Self>, target: &ObjectRef) -> ObjectRef {
        let mut state = self.state.lock();

        if let Some(wrapper) = state.registry.lookup_wrapper_for(target) {
            return wrapper;
        }
        if state.registry.is_known_wrapper(target) {
            return target.clone();
        }

        let handler = MutableHandler::new(Arc::clone(self));
        let wrapper = ObjectRef::proxy(target.clone(), Arc::new(handler));
        state.registry.register(target, &wrapper);
        state.since_sweep += 1;

        tracing::debug!(
            runtime = self.id.raw(),
            raw = target.id().raw(),
            wrapper = wrapper.id().raw(),
            "created reactive wrapper"
        );

        let interval = self.config.sweep_interval;
        if interval > 0 && state.since_sweep >= interval {
            Self::sweep_locked(self.id, &mut state);
        }

        wrapper
    }

    /// Swap a wrapper from this runtime for its raw object.
    pub(crate) fn raw_value(&self, value: Value) -> Value {
        match value {
            Value::Object(obj) => {
                let raw = self.state.lock().registry.raw_of(&obj);
                Value::Object(raw.unwrap_or(obj))
            }
            primitive => primitive,
        }
    }

    fn sweep_locked(id: RuntimeId, state: &mut RegistryState) -> usize {
        state.since_sweep = 0;
        let removed = state.registry.sweep();
        if removed > 0 {
            tracing::debug!(runtime = id.raw(), removed, "swept dead reactive pairs");
        }
        removed
    }
}

/// A reactivity domain.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = Runtime::builder().notifier(|change: &Change| {
///     println!("{} {}", change.kind, change.key);
/// }).build();
///
/// let state = runtime.reactive(Value::from_json(json!({"count": 0})));
/// state.as_object().unwrap().set("count", 1)?; // prints "set count"
/// ```
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// Create a runtime with the default configuration and collaborators.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    pub fn id(&self) -> RuntimeId {
        self.inner.id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Get the reactive view of `target`.
    ///
    /// Primitives and this runtime's own wrappers come back unchanged. Any
    /// other object gets its unique wrapper, created on first use.
    pub fn reactive(&self, target: impl Into<Value>) -> Value {
        match target.into() {
            Value::Object(obj) => Value::Object(self.inner.reactive_object(&obj)),
            primitive => primitive,
        }
    }

    /// Object-typed form of [`reactive`](Self::reactive).
    pub fn reactive_object(&self, target: &ObjectRef) -> ObjectRef {
        self.inner.reactive_object(target)
    }

    /// Whether `value` is a wrapper created by this runtime.
    pub fn is_reactive(&self, value: &Value) -> bool {
        match value {
            Value::Object(obj) => self.inner.state.lock().registry.is_known_wrapper(obj),
            _ => false,
        }
    }

    /// The raw object behind a wrapper. Anything else is returned unchanged.
    pub fn to_raw(&self, value: &Value) -> Value {
        self.inner.raw_value(value.clone())
    }

    /// Drop registry entries whose wrappers are gone. Returns the number of
    /// pairs removed.
    pub fn sweep(&self) -> usize {
        let mut state = self.inner.state.lock();
        RuntimeInner::sweep_locked(self.inner.id, &mut state)
    }

    /// Number of registered pairs, including dead ones not yet swept.
    pub fn registered(&self) -> usize {
        self.inner.state.lock().registry.len()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("registered", &self.registered())
            .finish()
    }
}

/// Builder for a [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    notifier: Arc<dyn ChangeNotifier>,
    tracker: Arc<dyn DependencyTracker>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self {
            config: RuntimeConfig::default(),
            notifier: Arc::new(TracingNotifier),
            tracker: Arc::new(NoopTracker),
        }
    }
}

impl RuntimeBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the collaborator told about observable writes.
    pub fn notifier(mut self, notifier: impl ChangeNotifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Set the collaborator told about reads through wrappers.
    pub fn tracker(mut self, tracker: impl DependencyTracker + 'static) -> Self {
        self.tracker = Arc::new(tracker);
        self
    }

    pub fn build(self) -> Runtime {
        Runtime {
            inner: Arc::new(RuntimeInner {
                id: RuntimeId::next(),
                config: self.config,
                state: Mutex::new(RegistryState {
                    registry: IdentityRegistry::new(),
                    since_sweep: 0,
                }),
                notifier: self.notifier,
                tracker: self.tracker,
            }),
        }
    }
}
