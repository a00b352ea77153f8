use crate::error::RemoteError;
use ballista_proto::{QueueEntry, ShootRequest, ShootResponse};
use std::collections::HashMap;

/// The game API as seen by the engine. Implementations only report transport failures
/// as errors; game-level status codes are returned to the caller to interpret.
#[allow(async_fn_in_trait)]
pub trait Remote {
    /// Current pigment stock, keyed by packed color as a decimal string.
    async fn colors(&self) -> Result<HashMap<String, u64>, RemoteError>;

    async fn shoot(&self, request: &ShootRequest) -> Result<ShootResponse, RemoteError>;

    async fn queue(&self, id: i64) -> Result<Vec<QueueEntry>, RemoteError>;

    /// Starts a pigment generation round and returns its tick.
    async fn generate(&self) -> Result<i64, RemoteError>;

    async fn pick(&self, num: u32, tick: i64) -> Result<(), RemoteError>;
}

impl<R: Remote> Remote for &R {
    async fn colors(&self) -> Result<HashMap<String, u64>, RemoteError> {
        (**self).colors().await
    }

    async fn shoot(&self, request: &ShootRequest) -> Result<ShootResponse, RemoteError> {
        (**self).shoot(request).await
    }

    async fn queue(&self, id: i64) -> Result<Vec<QueueEntry>, RemoteError> {
        (**self).queue(id).await
    }

    async fn generate(&self) -> Result<i64, RemoteError> {
        (**self).generate().await
    }

    async fn pick(&self, num: u32, tick: i64) -> Result<(), RemoteError> {
        (**self).pick(num, tick).await
    }
}
