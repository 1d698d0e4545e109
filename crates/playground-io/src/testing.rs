//! In-memory DOM, registry and zone for exercising binders without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use futures::executor::LocalPool;
use futures_channel::oneshot;
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};

use crate::{Error, Value};
use crate::binder::Runtime;
use crate::clock::TestClock;
use crate::dom::{Control, ControlEvent, Dom, HostElement};
use crate::resolver::{
    ApplicationHandle, ApplicationRegistry, Component, Mutation, MutationContext, Resolver,
};

thread_local! {
    /// Set while a `FakeZone` is running a mutation.
    static IN_ZONE: Cell<bool> = const { Cell::new(false) };
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ControlKind {
    Select,
    Number,
    Checkbox,
    Text,
    Button,
}

type Handler = Rc<RefCell<Box<dyn FnMut()>>>;

struct ControlState {
    kind: ControlKind,
    value: String,
    checked: bool,
    options: Vec<String>,
    label: String,
    next_listener: u64,
    listeners: Vec<(u64, ControlEvent, Handler)>,
}

#[derive(Clone)]
pub(crate) struct FakeControl {
    state: Rc<RefCell<ControlState>>,
}

impl FakeControl {
    fn new(kind: ControlKind) -> Self {
        Self {
            state: Rc::new(RefCell::new(ControlState {
                kind,
                value: String::new(),
                checked: false,
                options: Vec::new(),
                label: String::new(),
                next_listener: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub(crate) fn kind(&self) -> ControlKind {
        self.state.borrow().kind
    }

    pub(crate) fn options(&self) -> Vec<String> {
        self.state.borrow().options.clone()
    }

    pub(crate) fn label(&self) -> String {
        self.state.borrow().label.clone()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Change the value without emitting events.
    pub(crate) fn set_value(&self, value: &str) {
        self.state.borrow_mut().value = value.to_owned();
    }

    /// A keystroke: new field text followed by `input`.
    pub(crate) fn enter(&self, value: &str) {
        self.set_value(value);
        self.fire(ControlEvent::Input);
    }

    /// A checkbox click: flips the state, then `input` and `change`.
    pub(crate) fn toggle(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.checked = !state.checked;
        }
        self.fire(ControlEvent::Input);
        self.fire(ControlEvent::Change);
    }

    /// Pick an option of a select: `input` then `change`.
    pub(crate) fn choose(&self, value: &str) {
        self.set_value(value);
        self.fire(ControlEvent::Input);
        self.fire(ControlEvent::Change);
    }

    pub(crate) fn click(&self) {
        self.fire(ControlEvent::Click);
    }

    pub(crate) fn fire(&self, event: ControlEvent) {
        // Handlers may touch the control, so none of its state stays borrowed
        let handlers: Vec<Handler> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(_, listened, _)| *listened == event)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            (&mut *handler.borrow_mut())();
        }
    }
}

pub(crate) struct FakeListener {
    state: Weak<RefCell<ControlState>>,
    id: u64,
}

impl Drop for FakeListener {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().listeners.retain(|(id, _, _)| *id != self.id);
        }
    }
}

impl Control for FakeControl {
    type Listener = FakeListener;

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn value_as_number(&self) -> f64 {
        let state = self.state.borrow();
        match state.kind {
            ControlKind::Number => state.value.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    fn checked(&self) -> bool {
        self.state.borrow().checked
    }

    fn listen(
        &self,
        event: ControlEvent,
        handler: Box<dyn FnMut()>,
    ) -> Result<FakeListener, Error> {
        let mut state = self.state.borrow_mut();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push((id, event, Rc::new(RefCell::new(handler))));
        Ok(FakeListener {
            state: Rc::downgrade(&self.state),
            id,
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeDom {
    created: Rc<Cell<usize>>,
}

impl FakeDom {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// How many controls this DOM has created.
    pub(crate) fn created(&self) -> usize {
        self.created.get()
    }

    fn create(&self, kind: ControlKind) -> FakeControl {
        self.created.set(self.created.get() + 1);
        FakeControl::new(kind)
    }
}

impl Dom for FakeDom {
    type Control = FakeControl;

    fn select(&self, choices: &[String], selected: Option<&str>) -> Result<FakeControl, Error> {
        let control = self.create(ControlKind::Select);
        let value = selected
            .filter(|selected| choices.iter().any(|choice| choice.as_str() == *selected))
            .or(choices.first().map(String::as_str))
            .unwrap_or_default()
            .to_owned();
        {
            let mut state = control.state.borrow_mut();
            state.options = choices.to_vec();
            state.value = value;
        }
        Ok(control)
    }

    fn number_input(&self, value: f64) -> Result<FakeControl, Error> {
        let control = self.create(ControlKind::Number);
        if !value.is_nan() {
            control.set_value(&value.to_string());
        }
        Ok(control)
    }

    fn checkbox(&self, checked: bool) -> Result<FakeControl, Error> {
        let control = self.create(ControlKind::Checkbox);
        control.state.borrow_mut().checked = checked;
        Ok(control)
    }

    fn text_input(&self, value: &str) -> Result<FakeControl, Error> {
        let control = self.create(ControlKind::Text);
        control.set_value(value);
        Ok(control)
    }

    fn button(&self, label: &str) -> Result<FakeControl, Error> {
        let control = self.create(ControlKind::Button);
        control.state.borrow_mut().label = label.to_owned();
        Ok(control)
    }
}

struct HostState {
    dom: FakeDom,
    attributes: HashMap<String, String>,
    text: RefCell<String>,
    children: RefCell<Vec<FakeControl>>,
}

#[derive(Clone)]
pub(crate) struct FakeHost {
    state: Rc<HostState>,
}

impl FakeHost {
    pub(crate) fn new(attributes: &[(&str, &str)], text: &str) -> Self {
        Self {
            state: Rc::new(HostState {
                dom: FakeDom::new(),
                attributes: attributes
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                text: RefCell::new(text.to_owned()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn children(&self) -> Vec<FakeControl> {
        self.state.children.borrow().clone()
    }

    /// The only child. Panics unless there is exactly one.
    pub(crate) fn child(&self) -> FakeControl {
        let children = self.children();
        assert_eq!(children.len(), 1, "host should hold exactly one control");
        children[0].clone()
    }

    pub(crate) fn fake_dom(&self) -> &FakeDom {
        &self.state.dom
    }
}

impl HostElement for FakeHost {
    type Dom = FakeDom;

    fn dom(&self) -> &FakeDom {
        &self.state.dom
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.attributes.get(name).cloned()
    }

    fn text_content(&self) -> String {
        self.state.text.borrow().clone()
    }

    fn replace_children(&self, control: &FakeControl) -> Result<(), Error> {
        self.state.text.borrow_mut().clear();
        *self.state.children.borrow_mut() = vec![control.clone()];
        Ok(())
    }
}

#[derive(Default)]
struct ComponentState {
    inputs: Vec<(String, Value)>,
    invocations: Vec<String>,
    writes_outside_zone: usize,
}

/// Root component that records what it was asked to do.
#[derive(Clone, Default)]
pub(crate) struct RecordingComponent {
    state: Rc<RefCell<ComponentState>>,
}

impl RecordingComponent {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every value set on input `name`, oldest first.
    pub(crate) fn inputs(&self, name: &str) -> Vec<Value> {
        self.state
            .borrow()
            .inputs
            .iter()
            .filter(|(input, _)| input == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub(crate) fn invocations(&self, method: &str) -> usize {
        self.state
            .borrow()
            .invocations
            .iter()
            .filter(|invoked| *invoked == method)
            .count()
    }

    pub(crate) fn writes_outside_zone(&self) -> usize {
        self.state.borrow().writes_outside_zone
    }

    fn check_zone(&self) {
        if !IN_ZONE.with(Cell::get) {
            self.state.borrow_mut().writes_outside_zone += 1;
        }
    }
}

impl Component for RecordingComponent {
    fn set_input(&self, name: &str, value: Value) -> Result<(), Error> {
        self.check_zone();
        self.state.borrow_mut().inputs.push((name.to_owned(), value));
        Ok(())
    }

    fn invoke(&self, method: &str) -> Result<(), Error> {
        self.check_zone();
        self.state.borrow_mut().invocations.push(method.to_owned());
        Ok(())
    }
}

struct FakeApplication {
    root: Option<RecordingComponent>,
}

impl ApplicationHandle for FakeApplication {
    fn root_component(&self) -> Option<Rc<dyn Component>> {
        self.root
            .clone()
            .map(|root| Rc::new(root) as Rc<dyn Component>)
    }
}

type Slot = Shared<oneshot::Receiver<Rc<FakeApplication>>>;

/// Registry whose slots resolve when a test calls `bootstrap`.
#[derive(Clone)]
pub(crate) struct FakeRegistry {
    slots: Rc<Vec<Slot>>,
    senders: Rc<RefCell<Vec<Option<oneshot::Sender<Rc<FakeApplication>>>>>>,
}

impl FakeRegistry {
    pub(crate) fn new(len: usize) -> Self {
        let (senders, slots) = (0..len)
            .map(|_| {
                let (sender, receiver) = oneshot::channel();
                (Some(sender), receiver.shared())
            })
            .unzip();
        Self {
            slots: Rc::new(slots),
            senders: Rc::new(RefCell::new(senders)),
        }
    }

    /// Finish bootstrapping the application at `index`.
    pub(crate) fn bootstrap(&self, index: usize, root: Option<RecordingComponent>) {
        let sender = self.senders.borrow_mut()[index].take();
        if let Some(sender) = sender {
            let _ = sender.send(Rc::new(FakeApplication { root }));
        }
    }
}

impl ApplicationRegistry for FakeRegistry {
    fn application(
        &self,
        index: usize,
    ) -> LocalBoxFuture<'static, Result<Rc<dyn ApplicationHandle>, Error>> {
        let Some(slot) = self.slots.get(index).cloned() else {
            return async move { Err(Error::UnknownApplication(index)) }.boxed_local();
        };
        async move {
            let application = slot
                .await
                .map_err(|_| Error::host("application bootstrap abandoned"))?;
            Ok(application as Rc<dyn ApplicationHandle>)
        }
        .boxed_local()
    }
}

/// Zone that counts batches and marks them for `RecordingComponent`.
#[derive(Clone, Default)]
pub(crate) struct FakeZone {
    runs: Rc<Cell<usize>>,
}

impl FakeZone {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn runs(&self) -> usize {
        self.runs.get()
    }
}

impl MutationContext for FakeZone {
    fn run(&self, mutation: Mutation) -> Result<(), Error> {
        self.runs.set(self.runs.get() + 1);
        let outer = IN_ZONE.with(|in_zone| in_zone.replace(true));
        let result = mutation();
        IN_ZONE.with(|in_zone| in_zone.set(outer));
        result
    }
}

/// Everything a binder needs, wired to fakes, plus the executor driving it.
pub(crate) struct Harness {
    pub(crate) pool: LocalPool,
    pub(crate) clock: TestClock,
    pub(crate) registry: FakeRegistry,
    pub(crate) zone: FakeZone,
    pub(crate) runtime: Runtime,
}

impl Harness {
    pub(crate) fn new(applications: usize) -> Self {
        init_logger();
        let pool = LocalPool::new();
        let clock = TestClock::new();
        let registry = FakeRegistry::new(applications);
        let zone = FakeZone::new();
        let runtime = Runtime::new(
            Resolver::new(Rc::new(registry.clone()), Rc::new(zone.clone())),
            Rc::new(pool.spawner()),
            Rc::new(clock.clone()),
        );
        Self {
            pool,
            clock,
            registry,
            zone,
            runtime,
        }
    }

    /// A registry slot 0 already bootstrapped with a recording root.
    pub(crate) fn with_component() -> (Self, RecordingComponent) {
        let harness = Self::new(1);
        let component = RecordingComponent::new();
        harness.registry.bootstrap(0, Some(component.clone()));
        (harness, component)
    }

    /// Run spawned commits until they all wait on something.
    pub(crate) fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Advance virtual time, then settle.
    pub(crate) fn advance(&mut self, ms: u64) {
        self.clock.advance_by(ms);
        self.settle();
    }
}
