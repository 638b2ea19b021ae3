//! Threaded driver that ticks every live swarm on its own fixed interval.
//!
//! Each swarm gets a named thread running a `select!` over a
//! [`crossbeam_channel::tick`] timer and a cancel channel. Destroying a
//! swarm signals the cancel channel and joins the thread before returning,
//! so once [`SwarmScheduler::destroy_swarm`] is done no tick can touch that
//! swarm again.

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select, tick};
use log::{debug, trace, warn};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    config::SwarmConfig,
    error::{Result, SwarmError},
    geometry::ShapeClass,
    particles::ParticleSample,
    swarm::Swarm,
    types::RoleColor,
};

/// Opaque id of a swarm owned by a [`SwarmScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwarmHandle(u64);

impl fmt::Display for SwarmHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swarm-{}", self.0)
    }
}

/// A running tick loop and the state it owns.
struct SwarmTask {
    state: Arc<RwLock<Swarm>>,
    ticks: Arc<AtomicU64>,
    cancel: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl SwarmTask {
    /// Signals the loop and waits for it to exit.
    fn stop(&mut self, handle: SwarmHandle) {
        // Capacity 1 and a single sender: this never blocks.
        let _ = self.cancel.try_send(());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("{handle} tick loop panicked before teardown");
        }
    }
}

/// Owns every live swarm and its tick loop.
///
/// Dropping the scheduler destroys all swarms it still owns.
pub struct SwarmScheduler {
    cfg: SwarmConfig,
    next_id: u64,
    swarms: HashMap<SwarmHandle, SwarmTask>,
}

impl SwarmScheduler {
    /// Creates an empty scheduler whose swarms all use `cfg`.
    ///
    /// ### Errors
    /// Returns [`SwarmError::InvalidConfig`] if `cfg` fails validation.
    pub fn new(cfg: SwarmConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            next_id: 0,
            swarms: HashMap::new(),
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.cfg
    }

    /// Creates a swarm and starts its tick loop immediately.
    ///
    /// ### Errors
    /// - [`SwarmError::InvalidConfig`] if the swarm rejects the config.
    /// - [`SwarmError::Spawn`] if the tick thread cannot be started.
    pub fn new_swarm(&mut self, shape: ShapeClass, role: RoleColor) -> Result<SwarmHandle> {
        let swarm = Swarm::new(shape, role, self.cfg)?;
        self.start(swarm)
    }

    /// Like [`SwarmScheduler::new_swarm`], but parses shape and role names
    /// first and fails with [`SwarmError::UnknownShape`] /
    /// [`SwarmError::UnknownRole`] before anything is spawned.
    pub fn new_swarm_named(&mut self, shape: &str, role: &str) -> Result<SwarmHandle> {
        let shape: ShapeClass = shape.parse()?;
        let role: RoleColor = role.parse()?;
        self.new_swarm(shape, role)
    }

    fn start(&mut self, swarm: Swarm) -> Result<SwarmHandle> {
        let handle = SwarmHandle(self.next_id);
        self.next_id += 1;

        let state = Arc::new(RwLock::new(swarm));
        let ticks = Arc::new(AtomicU64::new(0));
        let (cancel_tx, cancel_rx) = bounded(1);
        let period = self.cfg.tick_period();

        let thread = {
            let state = Arc::clone(&state);
            let ticks = Arc::clone(&ticks);
            thread::Builder::new()
                .name(handle.to_string())
                .spawn(move || run_tick_loop(handle, state, ticks, period, cancel_rx))?
        };

        debug!("{handle} started, ticking every {period:?}");
        self.swarms.insert(
            handle,
            SwarmTask {
                state,
                ticks,
                cancel: cancel_tx,
                thread: Some(thread),
            },
        );
        Ok(handle)
    }

    fn task(&self, handle: SwarmHandle) -> Result<&SwarmTask> {
        self.swarms.get(&handle).ok_or(SwarmError::UnknownSwarm(handle))
    }

    /// Returns a consistent copy of every particle in the swarm.
    ///
    /// The copy is taken under the swarm's lock, so it never mixes particles
    /// from two different ticks.
    pub fn read_particles(&self, handle: SwarmHandle) -> Result<Vec<ParticleSample>> {
        let task = self.task(handle)?;
        let swarm = task.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(swarm.snapshot())
    }

    /// Shape and role the swarm was created with.
    pub fn describe(&self, handle: SwarmHandle) -> Result<(ShapeClass, RoleColor)> {
        let task = self.task(handle)?;
        let swarm = task.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok((swarm.shape(), swarm.role()))
    }

    /// Ticks completed by the swarm's loop so far.
    pub fn tick_count(&self, handle: SwarmHandle) -> Result<u64> {
        Ok(self.task(handle)?.ticks.load(Ordering::Acquire))
    }

    /// Stops the swarm's tick loop and releases its state.
    ///
    /// Blocks until the loop has exited, which takes at most one tick.
    ///
    /// ### Errors
    /// Returns [`SwarmError::UnknownSwarm`] if the handle was never issued
    /// by this scheduler or was already destroyed.
    pub fn destroy_swarm(&mut self, handle: SwarmHandle) -> Result<()> {
        let mut task = self
            .swarms
            .remove(&handle)
            .ok_or(SwarmError::UnknownSwarm(handle))?;
        task.stop(handle);
        debug!(
            "{handle} destroyed after {} ticks",
            task.ticks.load(Ordering::Acquire)
        );
        Ok(())
    }

    /// Destroys every swarm this scheduler owns.
    pub fn destroy_all(&mut self) {
        for (handle, mut task) in self.swarms.drain() {
            task.stop(handle);
        }
    }

    pub fn live_count(&self) -> usize {
        self.swarms.len()
    }

    /// Handles of all live swarms, in creation order.
    pub fn handles(&self) -> Vec<SwarmHandle> {
        let mut handles: Vec<SwarmHandle> = self.swarms.keys().copied().collect();
        handles.sort();
        handles
    }
}

impl Drop for SwarmScheduler {
    fn drop(&mut self) {
        if !self.swarms.is_empty() {
            debug!("scheduler dropped with {} live swarms", self.swarms.len());
        }
        self.destroy_all();
    }
}

/// Body of a swarm's thread: tick on every timer event until cancelled.
///
/// A pending cancel always wins over a pending tick, so a loop that has
/// been asked to stop never advances its swarm again.
fn run_tick_loop(
    handle: SwarmHandle,
    state: Arc<RwLock<Swarm>>,
    ticks: Arc<AtomicU64>,
    period: Duration,
    cancel: Receiver<()>,
) {
    let timer = tick(period);
    loop {
        select! {
            recv(cancel) -> _ => break,
            recv(timer) -> _ => {
                if !matches!(cancel.try_recv(), Err(TryRecvError::Empty)) {
                    break;
                }

                let report = {
                    let mut swarm = state.write().unwrap_or_else(PoisonError::into_inner);
                    swarm.tick()
                };
                let n = ticks.fetch_add(1, Ordering::AcqRel) + 1;
                if report.contacts > 0 {
                    trace!("{handle} tick {n}: {} boundary contacts", report.contacts);
                }
            }
        }
    }
    debug!("{handle} tick loop stopped");
}
