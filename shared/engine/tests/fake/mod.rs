#![allow(dead_code)]

use ballista_engine::error::RemoteError;
use ballista_engine::remote::Remote;
use ballista_engine::shutdown::ShutdownHandle;
use ballista_proto::{QueueEntry, ShootReceipt, ShootRequest, ShootResponse};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// In-memory game API. Shots succeed with `success` unless a status has been scripted.
pub struct FakeRemote {
    pub success: i64,
    pub colors: HashMap<String, u64>,
    pub statuses: RefCell<VecDeque<i64>>,
    pub transport_down: Cell<bool>,
    pub shots: RefCell<Vec<ShootRequest>>,
    pub next_id: Cell<Option<i64>>,
    pub queue: RefCell<VecDeque<Vec<QueueEntry>>>,
    pub queue_polls: Cell<u32>,
    pub tick: Cell<i64>,
    pub picks: RefCell<Vec<(u32, i64)>>,
    pub stop_after_rounds: Option<(usize, ShutdownHandle)>,
}

impl FakeRemote {
    pub fn new(success: i64) -> FakeRemote {
        FakeRemote {
            success,
            colors: HashMap::new(),
            statuses: RefCell::new(VecDeque::new()),
            transport_down: Cell::new(false),
            shots: RefCell::new(Vec::new()),
            next_id: Cell::new(None),
            queue: RefCell::new(VecDeque::new()),
            queue_polls: Cell::new(0),
            tick: Cell::new(100),
            picks: RefCell::new(Vec::new()),
            stop_after_rounds: None,
        }
    }

    pub fn script(&self, statuses: &[i64]) {
        self.statuses.borrow_mut().extend(statuses.iter().copied());
    }

    pub fn shot_count(&self) -> usize {
        self.shots.borrow().len()
    }

    fn check_transport(&self) -> Result<(), RemoteError> {
        if self.transport_down.get() {
            Err(anyhow::anyhow!("connection refused").into())
        } else {
            Ok(())
        }
    }
}

impl Remote for FakeRemote {
    async fn colors(&self) -> Result<HashMap<String, u64>, RemoteError> {
        self.check_transport()?;
        Ok(self.colors.clone())
    }

    async fn shoot(&self, request: &ShootRequest) -> Result<ShootResponse, RemoteError> {
        self.check_transport()?;
        self.shots.borrow_mut().push(request.clone());
        let status = self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.success);
        Ok(ShootResponse {
            status,
            response: Some(ShootReceipt {
                id: self.next_id.get(),
            }),
        })
    }

    async fn queue(&self, _id: i64) -> Result<Vec<QueueEntry>, RemoteError> {
        self.check_transport()?;
        self.queue_polls.set(self.queue_polls.get() + 1);
        Ok(self.queue.borrow_mut().pop_front().unwrap_or_default())
    }

    async fn generate(&self) -> Result<i64, RemoteError> {
        self.check_transport()?;
        self.tick.set(self.tick.get() + 1);
        Ok(self.tick.get())
    }

    async fn pick(&self, num: u32, tick: i64) -> Result<(), RemoteError> {
        self.check_transport()?;
        self.picks.borrow_mut().push((num, tick));
        if let Some((rounds, handle)) = &self.stop_after_rounds {
            if self.picks.borrow().len() >= *rounds {
                handle.trigger();
            }
        }
        Ok(())
    }
}
