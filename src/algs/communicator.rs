//! Thin façade over intra-process (threads) or inter-process (MPI) message
//! passing.
//!
//! Messages are *contiguous byte slices*. The core only needs one primitive,
//! a blocking paired [`Communicator::sendrecv`]: every rank sends one message
//! and receives one message in the same call, so a lock-step traversal never
//! deadlocks even when the transport blocks.

use crate::gauge_error::{CommError, GaugeError};
use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Typed message tag so independent protocols never match each other's
/// messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(v: u16) -> Self {
        Self(v)
    }
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// Tag of boundary-link messages.
pub const LINK_TAG: CommTag = CommTag::new(0x4C00);
/// Tag of reduction messages.
pub const REDUCE_TAG: CommTag = CommTag::new(0x5200);

/// Blocking communication interface (minimal by design).
pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Send `send` to `dest` and receive exactly `recv.len()` bytes from `src`
    /// in one paired step.
    fn sendrecv(
        &self,
        dest: usize,
        src: usize,
        tag: CommTag,
        send: &[u8],
        recv: &mut [u8],
    ) -> Result<(), GaugeError>;

    /// Element-wise sum of `values` over all ranks; every rank receives the
    /// same result. Contributions are added in rank order.
    fn all_reduce_sum(&self, values: &mut [f64]) -> Result<(), GaugeError> {
        let n = self.size();
        let me = self.rank();
        if n == 1 {
            return Ok(());
        }
        let send: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut contributions: Vec<Vec<f64>> = vec![Vec::new(); n];
        contributions[me] = values.to_vec();
        let mut recv = vec![0u8; send.len()];
        for k in 1..n {
            let dest = (me + k) % n;
            let src = (me + n - k) % n;
            self.sendrecv(dest, src, REDUCE_TAG, &send, &mut recv)?;
            contributions[src] = recv
                .chunks_exact(8)
                .map(|c| {
                    let mut b = [0u8; 8];
                    b.copy_from_slice(c);
                    f64::from_le_bytes(b)
                })
                .collect();
        }
        for (i, v) in values.iter_mut().enumerate() {
            *v = contributions.iter().map(|c| c[i]).sum();
        }
        Ok(())
    }

    /// Block until every rank has entered the barrier.
    fn barrier(&self) -> Result<(), GaugeError> {
        self.all_reduce_sum(&mut [0.0])
    }

    /// Collective teardown after a fatal error. Peers blocked in an exchange
    /// must not hang.
    fn abort(&self, code: i32);
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

/// Single-process communicator: the only peer is rank 0 itself.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn sendrecv(
        &self,
        dest: usize,
        src: usize,
        _tag: CommTag,
        send: &[u8],
        recv: &mut [u8],
    ) -> Result<(), GaugeError> {
        if dest != 0 || src != 0 {
            return Err(GaugeError::Transport {
                neighbor: dest.max(src),
                source: Box::new(CommError("single-process communicator has no peers".into())),
            });
        }
        expect_exact_len(send.len(), recv.len(), 0)?;
        recv.copy_from_slice(send);
        Ok(())
    }
    fn abort(&self, code: i32) {
        log::error!("aborting single-process run with code {code}");
    }
}

pub(crate) fn expect_exact_len(actual: usize, expected: usize, peer: usize) -> Result<(), GaugeError> {
    if actual == expected {
        Ok(())
    } else {
        Err(GaugeError::Transport {
            neighbor: peer,
            source: Box::new(CommError(format!("expected {expected} bytes, got {actual}"))),
        })
    }
}

// --- ThreadComm: intra-process, one thread per rank ---
type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Default)]
struct MailState {
    queues: HashMap<Key, VecDeque<Bytes>>,
    aborted: Option<(usize, i32)>,
}

#[derive(Default)]
struct Mailbox {
    state: Mutex<MailState>,
    arrived: Condvar,
}

/// In-process communicator. All handles of one world share a mailbox; messages
/// between a `(src, dst, tag)` triple are delivered in FIFO order.
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl std::fmt::Debug for ThreadComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadComm")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

/// Receive handle of a [`ThreadComm`].
pub struct ThreadRecvHandle {
    key: Key,
    mailbox: Arc<Mailbox>,
}

impl Wait for ThreadRecvHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let mut guard = self.mailbox.state.lock();
        loop {
            if let Some(bytes) = guard.queues.get_mut(&self.key).and_then(|q| q.pop_front()) {
                return Some(bytes.to_vec());
            }
            if guard.aborted.is_some() {
                return None;
            }
            self.mailbox.arrived.wait(&mut guard);
        }
    }
}

impl ThreadComm {
    /// Create the handles of a `size`-rank world; hand one to each thread.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
            })
            .collect()
    }

    /// Post a message; never blocks.
    pub fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
        let key = (self.rank, peer, tag);
        let mut guard = self.mailbox.state.lock();
        guard
            .queues
            .entry(key)
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
        drop(guard);
        self.mailbox.arrived.notify_all();
    }

    /// Post a receive; the returned handle blocks in [`Wait::wait`].
    pub fn irecv(&self, peer: usize, tag: u16) -> ThreadRecvHandle {
        ThreadRecvHandle {
            key: (peer, self.rank, tag),
            mailbox: Arc::clone(&self.mailbox),
        }
    }

    fn aborted_error(&self, peer: usize) -> GaugeError {
        match self.mailbox.state.lock().aborted {
            Some((rank, code)) => GaugeError::Aborted { rank, code },
            None => GaugeError::Transport {
                neighbor: peer,
                source: Box::new(CommError(format!("no message from rank {peer}"))),
            },
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
    fn sendrecv(
        &self,
        dest: usize,
        src: usize,
        tag: CommTag,
        send: &[u8],
        recv: &mut [u8],
    ) -> Result<(), GaugeError> {
        if dest >= self.size || src >= self.size {
            return Err(GaugeError::Transport {
                neighbor: dest.max(src),
                source: Box::new(CommError(format!("rank outside a world of {}", self.size))),
            });
        }
        if self.mailbox.state.lock().aborted.is_some() {
            return Err(self.aborted_error(dest));
        }
        self.isend(dest, tag.as_u16(), send);
        let data = self
            .irecv(src, tag.as_u16())
            .wait()
            .ok_or_else(|| self.aborted_error(src))?;
        expect_exact_len(data.len(), recv.len(), src)?;
        recv.copy_from_slice(&data);
        Ok(())
    }
    fn abort(&self, code: i32) {
        let mut guard = self.mailbox.state.lock();
        guard.aborted.get_or_insert((self.rank, code));
        drop(guard);
        self.mailbox.arrived.notify_all();
        log::error!("rank {} aborted the thread world with code {code}", self.rank);
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{CommError, CommTag, Communicator, GaugeError};
    use mpi::collective::SystemOperation;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, CommunicatorCollectives as _};

    pub struct MpiComm {
        _universe: Universe,
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        /// Initialise MPI. Must be called once per process.
        pub fn new() -> Result<Self, GaugeError> {
            let universe = mpi::initialize().ok_or_else(|| GaugeError::Transport {
                neighbor: 0,
                source: Box::new(CommError("MPI was already initialised".into())),
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }
        fn sendrecv(
            &self,
            dest: usize,
            src: usize,
            tag: CommTag,
            send: &[u8],
            recv: &mut [u8],
        ) -> Result<(), GaugeError> {
            let t = tag.as_u16() as i32;
            let dest_p = self.world.process_at_rank(dest as i32);
            let src_p = self.world.process_at_rank(src as i32);
            mpi::point_to_point::send_receive_into_with_tags(send, &dest_p, t, recv, &src_p, t);
            Ok(())
        }
        fn all_reduce_sum(&self, values: &mut [f64]) -> Result<(), GaugeError> {
            let local = values.to_vec();
            self.world
                .all_reduce_into(&local[..], values, SystemOperation::sum());
            Ok(())
        }
        fn barrier(&self) -> Result<(), GaugeError> {
            self.world.barrier();
            Ok(())
        }
        fn abort(&self, code: i32) {
            log::error!("rank {} calling MPI_Abort with code {code}", self.rank);
            self.world.abort(code)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
