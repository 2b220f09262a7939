use futures::future::BoxFuture;

/// Spawns detached background work; lets services stay runtime agnostic.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, future: BoxFuture<'static, ()>);
}
