//! The two-phase search engine.
//!
//! Phase 1 runs iterative-deepening A* over (twist, flip, slice) with all
//! 18 moves until the cube drops into the restricted group; every phase-1
//! candidate seeds a bounded phase-2 IDA* over (corner, edge8, slice-perm)
//! with the 10 group-preserving moves. The search keeps improving on the
//! best total until it has collected the requested number of solutions,
//! the time budget expires or the phase-1 thresholds are exhausted.
//!
//! With several workers the 18 possible first moves are partitioned
//! round-robin into shards racing on a rayon pool; the shards share only
//! the best length, the solutions list and a stop flag.

use std::cmp::min;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::coord;
use crate::cubie::CubieCube;
use crate::error::SolveError;
use crate::facelet;
use crate::moves::{format_maneuver, Move, ALL_MOVES, PHASE2_MOVES};
use crate::tables::Tables;

/// Phase 1 never needs more moves than this to reach the restricted group.
const MAX_PHASE1: usize = 12;
/// Phase-2 tails longer than this are cheaper to find through a deeper
/// phase 1, so the per-candidate search stops here.
const MAX_PHASE2: usize = 10;
/// From an in-group node with fewer moves to go than this, the group
/// cannot be left and re-entered, so group-preserving moves are futile.
const MIN_EXCURSION: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// Worker thread count; 1 keeps the search fully deterministic.
    pub threads: usize,
    /// Wall-clock budget. The best solution found so far is returned on
    /// expiry; `Timeout` if there is none.
    pub timeout_ms: u64,
    /// Hard cap on the total move count of accepted solutions.
    pub max_length: usize,
    /// How many strictly improving solutions to collect before stopping.
    pub num_solutions: usize,
    /// Number of first-move partitions; 0 means one per thread.
    pub splits: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            threads: 1,
            timeout_ms: 1000,
            max_length: 21,
            num_solutions: 1,
            splits: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub facelets: String,
    /// Every accepted solution in discovery order; lengths strictly
    /// decrease, so the last entry is the best.
    pub solutions: Vec<String>,
    pub best: String,
    pub length: usize,
    pub nodes: u64,
    pub elapsed_ms: u64,
}

pub struct Solver {
    /// Shared read-only across all search threads.
    tables: Arc<Tables>,
    config: Config,
}

impl Solver {
    /// Build all move and pruning tables; takes a moment, done once.
    pub fn new(config: Config) -> Solver {
        Solver {
            tables: Arc::new(Tables::new()),
            config,
        }
    }

    /// Solve a facelet string into a maneuver restoring the solved cube.
    pub fn solve(&self, facelets: &str) -> Result<Vec<Move>, SolveError> {
        let cube = facelet::parse(facelets)?;
        let outcome = self.search(&cube)?;
        Ok(outcome.solutions.into_iter().next_back().unwrap_or_default())
    }

    /// Like [`solve`](Self::solve), but with every improving solution and
    /// search statistics attached.
    pub fn solve_report(&self, facelets: &str) -> Result<SolveReport, SolveError> {
        let cube = facelet::parse(facelets)?;
        let outcome = self.search(&cube)?;
        let best = outcome.solutions.last().cloned().unwrap_or_default();
        Ok(SolveReport {
            facelets: facelets.to_owned(),
            solutions: outcome.solutions.iter().map(|s| format_maneuver(s)).collect(),
            length: best.len(),
            best: format_maneuver(&best),
            nodes: outcome.nodes,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
        })
    }

    fn search(&self, start: &CubieCube) -> Result<Outcome, SolveError> {
        let started = Instant::now();
        if start.is_solved() {
            return Ok(Outcome {
                solutions: vec![Vec::new()],
                nodes: 0,
                elapsed: started.elapsed(),
            });
        }

        let threads = self.config.threads.max(1);
        let splits = match self.config.splits {
            0 => threads,
            n => n,
        }
        .clamp(1, ALL_MOVES.len());
        let shards: Vec<Vec<Move>> = (0..splits)
            .map(|k| {
                ALL_MOVES
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|(i, _)| i % splits == k)
                    .map(|(_, m)| m)
                    .collect()
            })
            .collect();

        let shared = Shared {
            tables: &*self.tables,
            config: &self.config,
            start,
            started,
            budget: Duration::from_millis(self.config.timeout_ms),
            best_len: AtomicUsize::new(self.config.max_length + 1),
            stop: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
            solutions: Mutex::new(Vec::new()),
        };

        if threads == 1 {
            for (k, shard) in shards.iter().enumerate() {
                if shared.stop.load(Ordering::Relaxed) {
                    break;
                }
                Worker::new(&shared).run(shard, k == 0);
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .expect("failed to build the worker pool");
            pool.install(|| {
                shards.par_iter().enumerate().for_each(|(k, shard)| {
                    Worker::new(&shared).run(shard, k == 0);
                });
            });
        }

        let solutions = shared.solutions.into_inner().expect("worker panicked");
        let nodes = shared.nodes.load(Ordering::Relaxed);
        let elapsed = started.elapsed();
        log::debug!(
            "search finished: {} solution(s), {nodes} nodes, {elapsed:?}",
            solutions.len()
        );
        if solutions.is_empty() {
            if shared.timed_out.load(Ordering::Relaxed) {
                return Err(SolveError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                });
            }
            return Err(SolveError::LengthExceeded {
                max_length: self.config.max_length,
            });
        }
        Ok(Outcome {
            solutions,
            nodes,
            elapsed,
        })
    }
}

struct Outcome {
    solutions: Vec<Vec<Move>>,
    nodes: u64,
    elapsed: Duration,
}

struct Shared<'a> {
    tables: &'a Tables,
    config: &'a Config,
    start: &'a CubieCube,
    started: Instant,
    budget: Duration,
    best_len: AtomicUsize,
    stop: AtomicBool,
    timed_out: AtomicBool,
    nodes: AtomicU64,
    solutions: Mutex<Vec<Vec<Move>>>,
}

struct Worker<'a> {
    shared: &'a Shared<'a>,
    phase1: Vec<Move>,
    phase2: Vec<Move>,
    local_nodes: u64,
}

impl<'a> Worker<'a> {
    fn new(shared: &'a Shared<'a>) -> Worker<'a> {
        Worker {
            shared,
            phase1: Vec::with_capacity(MAX_PHASE1),
            phase2: Vec::with_capacity(MAX_PHASE2),
            local_nodes: 0,
        }
    }

    /// One node of bookkeeping: count it, re-check the clock every 1024
    /// nodes, and report whether the search should unwind.
    #[inline]
    fn tick(&mut self) -> bool {
        self.local_nodes += 1;
        if self.local_nodes & 0x3FF == 0
            && self.shared.started.elapsed() >= self.shared.budget
        {
            self.shared.timed_out.store(true, Ordering::Relaxed);
            self.shared.stop.store(true, Ordering::Relaxed);
        }
        self.shared.stop.load(Ordering::Relaxed)
    }

    fn run(&mut self, shard: &[Move], owns_empty_phase1: bool) {
        let start = self.shared.start;
        let twist = coord::twist(start) as usize;
        let flip = coord::flip(start) as usize;
        let slice = coord::slice(start) as usize;
        let start_bound = self.shared.tables.phase1_bound(twist, flip, slice) as usize;

        for threshold in 0..=MAX_PHASE1 {
            if self.shared.stop.load(Ordering::Relaxed)
                || threshold >= self.shared.best_len.load(Ordering::Relaxed)
            {
                break;
            }
            if threshold == 0 {
                if owns_empty_phase1 && start_bound == 0 {
                    self.phase1.clear();
                    self.attempt_phase2();
                }
                continue;
            }
            for &first in shard {
                if self.shared.stop.load(Ordering::Relaxed) {
                    break;
                }
                // The shard root obeys the same in-group rule as any other
                // node: a group-preserving opener cannot begin a phase-1
                // solution that must leave the group and return in time.
                if start_bound == 0 && threshold < MIN_EXCURSION && first.is_phase2() {
                    continue;
                }
                let i = first.index();
                let next_twist = self.shared.tables.twist_move[twist * 18 + i] as usize;
                let next_flip = self.shared.tables.flip_move[flip * 18 + i] as usize;
                let next_slice = self.shared.tables.slice_move[slice * 18 + i] as usize;
                self.phase1.push(first);
                self.dfs_phase1(next_twist, next_flip, next_slice, threshold - 1);
                self.phase1.pop();
            }
        }
        self.shared
            .nodes
            .fetch_add(self.local_nodes, Ordering::Relaxed);
    }

    fn dfs_phase1(&mut self, twist: usize, flip: usize, slice: usize, togo: usize) {
        if self.tick() {
            return;
        }
        let bound = self.shared.tables.phase1_bound(twist, flip, slice) as usize;
        if bound > togo {
            return;
        }
        if togo == 0 {
            // bound == 0 here: the cube is in the restricted group.
            self.attempt_phase2();
            return;
        }
        let in_group = bound == 0;
        let prev = *self.phase1.last().expect("phase-1 path starts at the shard root");
        for &m in &ALL_MOVES {
            if !m.follows(prev) {
                continue;
            }
            if in_group && togo < MIN_EXCURSION && m.is_phase2() {
                continue;
            }
            let i = m.index();
            let next_twist = self.shared.tables.twist_move[twist * 18 + i] as usize;
            let next_flip = self.shared.tables.flip_move[flip * 18 + i] as usize;
            let next_slice = self.shared.tables.slice_move[slice * 18 + i] as usize;
            self.phase1.push(m);
            self.dfs_phase1(next_twist, next_flip, next_slice, togo - 1);
            self.phase1.pop();
            if self.shared.stop.load(Ordering::Relaxed) {
                return;
            }
        }
    }

    /// The phase-1 path has reached the restricted group; finish the cube
    /// within it, bounded so only a strict improvement can come out.
    fn attempt_phase2(&mut self) {
        let phase1_len = self.phase1.len();
        let best = self.shared.best_len.load(Ordering::Relaxed);
        if phase1_len >= best {
            return;
        }

        let mut cube = *self.shared.start;
        cube.apply_all(&self.phase1);
        debug_assert_eq!(coord::twist(&cube), 0);
        debug_assert_eq!(coord::flip(&cube), 0);
        debug_assert_eq!(coord::slice(&cube), 0);

        let corner = coord::corner_perm(&cube) as usize;
        let edge8 = coord::edge8_perm(&cube) as usize;
        let slice_perm = coord::slice_perm(&cube) as usize;
        let bound = self.shared.tables.phase2_bound(corner, edge8, slice_perm) as usize;

        let mut togo = bound;
        loop {
            let best = self.shared.best_len.load(Ordering::Relaxed);
            let cap = min(MAX_PHASE2, best.saturating_sub(phase1_len + 1));
            if togo > cap || self.shared.stop.load(Ordering::Relaxed) {
                return;
            }
            self.phase2.clear();
            if self.dfs_phase2(corner, edge8, slice_perm, togo) {
                self.record();
                return;
            }
            togo += 1;
        }
    }

    fn dfs_phase2(
        &mut self,
        corner: usize,
        edge8: usize,
        slice_perm: usize,
        togo: usize,
    ) -> bool {
        if self.tick() {
            return false;
        }
        let bound = self.shared.tables.phase2_bound(corner, edge8, slice_perm) as usize;
        if bound > togo {
            return false;
        }
        if togo == 0 {
            return true; // bound == 0 only holds at the solved coordinates
        }
        let prev = self.phase2.last().or(self.phase1.last()).copied();
        for (column, &m) in PHASE2_MOVES.iter().enumerate() {
            if let Some(p) = prev {
                if !m.follows(p) {
                    continue;
                }
            }
            let next_corner = self.shared.tables.corner_move[corner * 10 + column] as usize;
            let next_edge8 = self.shared.tables.edge8_move[edge8 * 10 + column] as usize;
            let next_slice =
                self.shared.tables.slice_perm_move[slice_perm * 10 + column] as usize;
            self.phase2.push(m);
            if self.dfs_phase2(next_corner, next_edge8, next_slice, togo - 1) {
                return true;
            }
            self.phase2.pop();
            if self.shared.stop.load(Ordering::Relaxed) {
                return false;
            }
        }
        false
    }

    fn record(&mut self) {
        let mut maneuver = Vec::with_capacity(self.phase1.len() + self.phase2.len());
        maneuver.extend_from_slice(&self.phase1);
        maneuver.extend_from_slice(&self.phase2);

        // Re-apply before publishing; a mismatch means corrupted tables.
        let mut check = *self.shared.start;
        check.apply_all(&maneuver);
        assert!(
            check.is_solved(),
            "solution failed verification, tables are corrupted: {}",
            format_maneuver(&maneuver)
        );

        let length = maneuver.len();
        let mut solutions = self.shared.solutions.lock().expect("worker panicked");
        if length < self.shared.best_len.load(Ordering::Relaxed) {
            self.shared.best_len.store(length, Ordering::Relaxed);
            log::info!("solution of {length} moves: {}", format_maneuver(&maneuver));
            solutions.push(maneuver);
            if solutions.len() >= self.shared.config.num_solutions.max(1) {
                self.shared.stop.store(true, Ordering::Relaxed);
            }
        }
    }
}
