use std::rc::Rc;

use crate::Error;
use crate::binder::{Attachable, Identity, Runtime};
use crate::dom::{Control, ControlEvent, Dom, HostElement};

type ControlOf<H> = <<H as HostElement>::Dom as Dom>::Control;

/// Controller of a custom action element: a button that calls a zero-argument
/// method on the root component.
///
/// Clicks are neither debounced nor guarded against overlap. Every click is
/// one invocation, however many are still waiting for the application.
pub struct ActionBinder<H: HostElement> {
    host: H,
    runtime: Runtime,
    processed: bool,
    attached: Option<Attached<ControlOf<H>>>,
}

struct Attached<C: Control> {
    identity: Identity,
    button: C,
    _listener: C::Listener,
}

impl<H: HostElement> ActionBinder<H> {
    pub fn new(host: H, runtime: Runtime) -> Self {
        Self {
            host,
            runtime,
            processed: false,
            attached: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.attached.as_ref().map(|attached| &attached.identity)
    }

    pub fn button(&self) -> Option<&ControlOf<H>> {
        self.attached.as_ref().map(|attached| &attached.button)
    }

    fn process(&mut self) -> Result<(), Error> {
        let identity = Identity::read(&self.host)?;
        let button = self.host.dom().button(&format!("{}()", identity.name))?;
        self.host.replace_children(&button)?;

        let invoker = Rc::new(Invoker {
            identity: identity.clone(),
            runtime: self.runtime.clone(),
        });
        let listener = button.listen(
            ControlEvent::Click,
            Box::new(move || invoker.invoke()),
        )?;

        log::debug!("bound button to {identity}");
        self.attached = Some(Attached {
            identity,
            button,
            _listener: listener,
        });
        Ok(())
    }
}

impl<H: HostElement> Attachable for ActionBinder<H> {
    fn on_attach(&mut self) -> Result<(), Error> {
        if self.processed {
            return Ok(());
        }
        self.processed = true;
        self.process()
    }

    fn on_detach(&mut self) {}
}

struct Invoker {
    identity: Identity,
    runtime: Runtime,
}

impl Invoker {
    fn invoke(&self) {
        let resolution = self.runtime.resolver.resolve(self.identity.index);
        let method = self.identity.name.clone();
        let spawned = self.runtime.spawn("call of", &self.identity, async move {
            let resolved = resolution.await?;
            resolved.mutate_root(move |root| {
                log::debug!("calling `{method}()`");
                root.invoke(&method)
            })
        });
        if let Err(error) = spawned {
            log::error!("cannot call {}: {error}", self.identity);
        }
    }
}
