//! Application lookup and the shared mutation context.
//!
//! The page owns an ordered registry of application handles, each behind a
//! future because applications bootstrap asynchronously, and one batching
//! context ("zone"). Every write to component state has to run inside that
//! context or the host framework never re-renders.

use std::future::Future;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;

use crate::{Error, Value};

/// A component instance inside a running application.
pub trait Component {
    /// Set a named input to `value`.
    fn set_input(&self, name: &str, value: Value) -> Result<(), Error>;

    /// Call a named zero-argument method.
    fn invoke(&self, method: &str) -> Result<(), Error>;
}

/// A running application.
pub trait ApplicationHandle {
    /// The first root component, if the application has one.
    fn root_component(&self) -> Option<Rc<dyn Component>>;
}

/// Process-wide, append-only, ordered collection of application handles.
pub trait ApplicationRegistry {
    /// The handle at `index`. Looking up must not block; the returned future
    /// completes once the application has bootstrapped. An index that never
    /// gets an application may leave the future pending forever.
    fn application(
        &self,
        index: usize,
    ) -> LocalBoxFuture<'static, Result<Rc<dyn ApplicationHandle>, Error>>;
}

/// A state change that must run inside the mutation context.
pub type Mutation = Box<dyn FnOnce() -> Result<(), Error>>;

/// The host framework's batching primitive.
pub trait MutationContext {
    /// Run `mutation` batched, returning its result.
    fn run(&self, mutation: Mutation) -> Result<(), Error>;
}

/// Looks up applications by index and pairs them with the mutation context.
#[derive(Clone)]
pub struct Resolver {
    registry: Rc<dyn ApplicationRegistry>,
    zone: Rc<dyn MutationContext>,
}

impl Resolver {
    pub fn new(registry: Rc<dyn ApplicationRegistry>, zone: Rc<dyn MutationContext>) -> Self {
        Self { registry, zone }
    }

    /// Start resolving the application at `index`.
    ///
    /// The registry is consulted immediately; only waiting for bootstrap is
    /// deferred to the returned future. Nothing is cached here.
    pub fn resolve(&self, index: usize) -> impl Future<Output = Result<Resolved, Error>> + 'static {
        let application = self.registry.application(index);
        let zone = self.zone.clone();
        async move {
            Ok(Resolved {
                index,
                application: application.await?,
                zone,
            })
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

/// A bootstrapped application and the context to mutate it in.
pub struct Resolved {
    index: usize,
    application: Rc<dyn ApplicationHandle>,
    zone: Rc<dyn MutationContext>,
}

impl Resolved {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn application(&self) -> &Rc<dyn ApplicationHandle> {
        &self.application
    }

    pub fn zone(&self) -> &Rc<dyn MutationContext> {
        &self.zone
    }

    /// Run `mutation` against the first root component, inside the zone.
    pub fn mutate_root(
        &self,
        mutation: impl FnOnce(&dyn Component) -> Result<(), Error> + 'static,
    ) -> Result<(), Error> {
        let component = self
            .application
            .root_component()
            .ok_or(Error::NoRootComponent(self.index))?;
        self.zone.run(Box::new(move || mutation(component.as_ref())))
    }
}
