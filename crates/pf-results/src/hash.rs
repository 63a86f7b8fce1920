//! Content-based hashing for run IDs.

use crate::ResultsResult;
use crate::types::RunMode;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the serialized inputs, the mode and the solver version.
pub fn compute_run_id<T>(inputs: &T, mode: RunMode, solver_version: &str) -> ResultsResult<String>
where
    T: Serialize + ?Sized,
{
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(inputs)?);
    hasher.update(serde_json::to_vec(&mode)?);
    hasher.update(solver_version.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_stability() {
        let inputs = json!({"flow_m3_s": 0.02, "pipes": [{"name": "P1", "length_m": 30.0}]});
        let a = compute_run_id(&inputs, RunMode::Chain, "0.1.0").unwrap();
        let b = compute_run_id(&inputs, RunMode::Chain, "0.1.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let one = json!({"flow_m3_s": 0.02});
        let two = json!({"flow_m3_s": 0.03});
        let a = compute_run_id(&one, RunMode::SinglePipe, "0.1.0").unwrap();
        assert_ne!(a, compute_run_id(&two, RunMode::SinglePipe, "0.1.0").unwrap());
        assert_ne!(a, compute_run_id(&one, RunMode::Network, "0.1.0").unwrap());
        assert_ne!(a, compute_run_id(&one, RunMode::SinglePipe, "0.2.0").unwrap());
    }
}
