use std::rc::{Rc, Weak};

use crate::Error;
use crate::binder::{Attachable, Identity, Runtime};
use crate::descriptor::Descriptor;
use crate::dom::{Control, ControlEvent, Dom, HostElement};
use crate::scheduler::Debouncer;
use crate::widget::{Widget, synthesize};

type ControlOf<H> = <<H as HostElement>::Dom as Dom>::Control;

/// Controller of a custom input element.
///
/// The element's text content is a descriptor. On first attach the content is
/// replaced by the synthesized widget, whose `change` events commit right away
/// and whose `input` events commit after the quiet period.
pub struct ValueBinder<H: HostElement> {
    host: H,
    runtime: Runtime,
    processed: bool,
    attached: Option<Attached<ControlOf<H>>>,
}

struct Attached<C: Control> {
    identity: Identity,
    widget: Rc<Widget<C>>,
    debouncer: Rc<Debouncer>,
    _listeners: Vec<C::Listener>,
}

impl<H: HostElement> ValueBinder<H> {
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

    pub fn widget(&self) -> Option<&Rc<Widget<ControlOf<H>>>> {
        self.attached.as_ref().map(|attached| &attached.widget)
    }

    /// Whether a debounced commit is waiting for its quiet period to end.
    pub fn has_pending_commit(&self) -> bool {
        self.attached
            .as_ref()
            .is_some_and(|attached| attached.debouncer.is_pending())
    }

    fn process(&mut self) -> Result<(), Error> {
        let identity = Identity::read(&self.host)?;
        let descriptor = Descriptor::parse(&self.host.text_content())?;
        let widget = Rc::new(synthesize(self.host.dom(), &descriptor)?);
        self.host.replace_children(widget.control())?;

        let committer = Rc::new(Committer {
            identity: identity.clone(),
            widget: Rc::downgrade(&widget),
            runtime: self.runtime.clone(),
        });
        let debouncer = Rc::new(Debouncer::new(
            self.runtime.clock.clone(),
            self.runtime.quiet_period,
        ));

        let on_change = widget.control().listen(ControlEvent::Change, {
            let committer = committer.clone();
            Box::new(move || committer.commit())
        })?;
        let on_input = widget.control().listen(ControlEvent::Input, {
            let debouncer = debouncer.clone();
            Box::new(move || {
                let committer = committer.clone();
                log::trace!("debouncing commit of {}", committer.identity);
                if let Err(error) = debouncer.schedule(move || committer.commit()) {
                    log::error!("cannot schedule commit: {error}");
                }
            })
        })?;

        log::debug!("bound {:?} widget to {identity}", widget.accessor());
        self.attached = Some(Attached {
            identity,
            widget,
            debouncer,
            _listeners: vec![on_change, on_input],
        });
        Ok(())
    }
}

impl<H: HostElement> Attachable for ValueBinder<H> {
    fn on_attach(&mut self) -> Result<(), Error> {
        if self.processed {
            return Ok(());
        }
        // Set before anything can fail: a broken element is not retried
        self.processed = true;
        self.process()
    }

    fn on_detach(&mut self) {
        if let Some(attached) = &self.attached {
            if attached.debouncer.cancel() {
                log::debug!("dropped pending commit of {}", attached.identity);
            }
        }
    }
}

/// Pushes the widget's value into the target input.
///
/// Holds the widget weakly: the listeners that own this committer live on the
/// widget's control.
struct Committer<C: Control> {
    identity: Identity,
    widget: Weak<Widget<C>>,
    runtime: Runtime,
}

impl<C: Control> Committer<C> {
    fn commit(&self) {
        if let Err(error) = self.try_commit() {
            log::error!("cannot commit {}: {error}", self.identity);
        }
    }

    fn try_commit(&self) -> Result<(), Error> {
        let resolution = self.runtime.resolver.resolve(self.identity.index);
        let widget = self.widget.clone();
        let name = self.identity.name.clone();
        self.runtime.spawn("commit of", &self.identity, async move {
            let resolved = resolution.await?;
            // The value is read when the mutation runs, so whichever commit
            // lands last writes the widget's latest value.
            resolved.mutate_root(move |root| match widget.upgrade() {
                Some(widget) => {
                    let value = widget.value();
                    log::debug!("setting `{name}` to {value}");
                    root.set_input(&name, value)
                }
                None => Ok(()),
            })
        })
    }
}
