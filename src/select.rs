//! Replica-liveness selection.
//!
//! Picks one reachable replica out of a block's candidate set by probing
//! randomly drawn candidates and excluding the ones that fail. The dead set
//! lives for a single `select` call; a candidate classified dead is never
//! probed again within that call.

use crate::block::ReplicaEndpoint;
use crate::timeouts::PROBE_TIMEOUT;
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no nodes contain this block")]
    NoCandidates,
    #[error("could not reach any of the {attempted} replicas holding this block")]
    NoReachableReplica { attempted: usize },
}

/// Connectivity check against a replica's data-transfer address. The probe
/// socket is closed as soon as the verdict is known and is never reused for
/// data transfer.
pub trait LivenessProbe {
    fn probe(&self, endpoint: &ReplicaEndpoint, timeout: Duration) -> io::Result<()>;
}

/// Production probe: connect with `timeout`, apply the same value as the
/// read timeout, drop the socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProbe;

impl LivenessProbe for TcpProbe {
    fn probe(&self, endpoint: &ReplicaEndpoint, timeout: Duration) -> io::Result<()> {
        let mut last_err = None;
        for addr in endpoint.transfer_addr().to_socket_addrs()? {
            debug!("event=probe_attempt peer={addr}");
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    debug!("event=probe_ok peer={addr}");
                    return Ok(());
                }
                Err(err) => {
                    debug!("event=probe_error peer={addr} error={err}");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "address resolved empty")))
    }
}

/// Shared, process-lifetime selector. The generator behind the mutex is the
/// only mutable state, so one instance serves concurrent viewer requests.
pub struct ReplicaSelector<P = TcpProbe> {
    probe: P,
    probe_timeout: Duration,
    rng: Mutex<ChaCha20Rng>,
}

impl ReplicaSelector<TcpProbe> {
    pub fn new() -> Self {
        Self::with_probe(TcpProbe, PROBE_TIMEOUT)
    }
}

impl Default for ReplicaSelector<TcpProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: LivenessProbe> ReplicaSelector<P> {
    pub fn with_probe(probe: P, probe_timeout: Duration) -> Self {
        Self {
            probe,
            probe_timeout,
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Deterministic draws for tests.
    pub fn with_seed(probe: P, probe_timeout: Duration, seed: u64) -> Self {
        Self {
            probe,
            probe_timeout,
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Returns one candidate that answered a liveness probe.
    ///
    /// Draws uniformly at random from the candidates not yet classified
    /// dead; a failed probe adds the candidate to the dead set for the rest
    /// of the call. Fails once every candidate has been classified dead.
    pub fn select(&self, candidates: &[ReplicaEndpoint]) -> Result<ReplicaEndpoint, SelectError> {
        if candidates.is_empty() {
            return Err(SelectError::NoCandidates);
        }
        let mut dead: HashSet<usize> = HashSet::new();
        let mut failures = 0;
        loop {
            let chosen = self.draw_live(candidates, &dead);
            let endpoint = &candidates[chosen];
            match self.probe.probe(endpoint, self.probe_timeout) {
                Ok(()) => {
                    info!("event=replica_selected peer={endpoint}");
                    return Ok(endpoint.clone());
                }
                Err(err) => {
                    warn!("event=replica_dead peer={endpoint} error={err}");
                    dead.insert(chosen);
                    failures += 1;
                    if failures == candidates.len() {
                        return Err(SelectError::NoReachableReplica {
                            attempted: failures,
                        });
                    }
                }
            }
        }
    }

    fn draw_live(&self, candidates: &[ReplicaEndpoint], dead: &HashSet<usize>) -> usize {
        let live: Vec<usize> = (0..candidates.len())
            .filter(|index| !dead.contains(index))
            .collect();
        let mut rng = self.rng.lock();
        live[rng.gen_range(0..live.len())]
    }
}
