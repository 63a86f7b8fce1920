//! Hydraulic solvers for pipe networks.
//!
//! Series chains are summed element by element. Parallel blocks are balanced
//! by the proportional resolver, a Newton matrix balancer or Hardy-Cross loop
//! correction, and node-and-edge graphs always go through Hardy-Cross. The
//! diameter optimizer and network sizing pick standard pipe sizes for a
//! velocity band, a pressure budget or an economic rule.

pub mod config;
pub mod error;
pub mod hardy_cross;
pub mod jacobian;
pub mod matrix;
pub mod network;
pub mod optimizer;
pub mod parallel;
pub mod series;
pub mod sizing;

pub use config::{NetworkMethod, SolverConfig};
pub use error::{SolverError, SolverResult};
pub use hardy_cross::{LoopSolution, hardy_cross, hardy_cross_parallel};
pub use matrix::matrix_balance;
pub use network::{BalanceRecord, NetworkOutcome, NetworkSolver, NodeState};
pub use optimizer::{SizingOutcome, SizingTarget, candidate_diameters, optimize_diameter};
pub use parallel::{BalanceResult, resolve_parallel};
pub use series::{PathDrop, SeriesResult, evaluate_series};
pub use sizing::{size_chain, size_network};
