//! Custom element controllers.
//!
//! A binder owns the content of one host element. `on_attach` renders its
//! control the first time the element is connected and is a no-op afterwards;
//! `on_detach` releases what must not outlive the element's presence in the
//! document.

mod action;
mod value;

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures_util::task::{LocalSpawn, LocalSpawnExt};

use crate::Error;
use crate::clock::Clock;
use crate::dom::HostElement;
use crate::resolver::Resolver;
use crate::scheduler::QUIET_PERIOD;

pub use action::ActionBinder;
pub use value::ValueBinder;

/// Lifecycle hooks driven by the host's custom element runtime.
pub trait Attachable {
    fn on_attach(&mut self) -> Result<(), Error>;

    fn on_detach(&mut self);
}

/// Which component member a binder targets: `(name, index)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Input or method name on the root component.
    pub name: String,
    /// Slot in the application registry.
    pub index: usize,
}

impl Identity {
    /// Read the `name` and `index` attributes.
    pub fn read(host: &impl HostElement) -> Result<Self, Error> {
        let name = host.attribute("name").ok_or(Error::MissingAttribute("name"))?;
        let index = host.attribute("index").ok_or(Error::MissingAttribute("index"))?;
        let index = index
            .trim()
            .parse()
            .map_err(|_| Error::InvalidIndex(index.clone()))?;
        Ok(Self { name, index })
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` of application {}", self.name, self.index)
    }
}

/// The collaborators every binder is built with.
#[derive(Clone)]
pub struct Runtime {
    pub resolver: Resolver,
    pub spawner: Rc<dyn LocalSpawn>,
    pub clock: Rc<dyn Clock>,
    pub quiet_period: Duration,
}

impl Runtime {
    pub fn new(resolver: Resolver, spawner: Rc<dyn LocalSpawn>, clock: Rc<dyn Clock>) -> Self {
        Self {
            resolver,
            spawner,
            clock,
            quiet_period: QUIET_PERIOD,
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Spawn `task`, reporting its failure against `identity`.
    fn spawn(
        &self,
        what: &'static str,
        identity: &Identity,
        task: impl Future<Output = Result<(), Error>> + 'static,
    ) -> Result<(), Error> {
        let identity = identity.clone();
        self.spawner.spawn_local(async move {
            if let Err(error) = task.await {
                log::error!("{what} {identity} failed: {error}");
            }
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("quiet_period", &self.quiet_period)
            .finish_non_exhaustive()
    }
}
