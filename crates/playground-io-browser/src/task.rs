use futures_util::task::{LocalFutureObj, LocalSpawn, SpawnError};

/// Runs commits on zoon's task executor, i.e. the page's microtask queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskSpawner;

impl LocalSpawn for TaskSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        zoon::Task::start(future);
        Ok(())
    }
}
