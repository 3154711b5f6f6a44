//! Hierarchical seed derivation.
//!
//! A `SeedManager` owns a base seed and derives sub-seeds from semantic
//! context strings with SHA-256. Every input component is length-prefixed
//! before hashing, so `("a:b", "c")` and `("a", "b:c")` never alias. The
//! leading eight digest bytes, read big-endian, become the derived `i64`.
//!
//! The context cache is guarded by a lock so a manager can be shared across
//! threads; it only memoizes and never changes a result.

use std::collections::BTreeMap;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::params::GenerationParams;
use crate::stream::SeededStream;

/// Persistable manager state: exactly the base seed and the context cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedState {
    pub base_seed: i64,
    pub context_seeds: BTreeMap<String, i64>,
}

#[derive(Debug)]
pub struct SeedManager {
    base_seed: i64,
    deterministic: bool,
    context_seeds: Mutex<BTreeMap<String, i64>>,
}

impl SeedManager {
    /// Creates a manager rooted at `base_seed`.
    ///
    /// A zero seed is taken to mean "no seed supplied": the manager falls back
    /// to a wall-clock derived seed and its output is no longer reproducible.
    /// Callers that need determinism must pass a non-zero seed.
    pub fn new(base_seed: i64) -> Self {
        if base_seed == 0 {
            let fallback = generate_runtime_seed();
            warn!(fallback_seed = fallback, "zero base seed supplied; output is not reproducible");
            return Self {
                base_seed: fallback,
                deterministic: false,
                context_seeds: Mutex::new(BTreeMap::new()),
            };
        }
        Self { base_seed, deterministic: true, context_seeds: Mutex::new(BTreeMap::new()) }
    }

    pub fn from_state(state: SeedState) -> Self {
        if state.base_seed == 0 {
            return Self::new(0);
        }
        Self {
            base_seed: state.base_seed,
            deterministic: true,
            context_seeds: Mutex::new(state.context_seeds),
        }
    }

    pub fn base_seed(&self) -> i64 {
        self.base_seed
    }

    /// False when the manager was created from a zero seed.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn state(&self) -> SeedState {
        SeedState { base_seed: self.base_seed, context_seeds: self.context_seeds.lock().clone() }
    }

    pub fn derive_context_seed(&self, content_type: &str, name: &str) -> i64 {
        let key = context_key(content_type, name);
        *self
            .context_seeds
            .lock()
            .entry(key)
            .or_insert_with(|| {
                hash_seed(self.base_seed, &[content_type.as_bytes(), name.as_bytes()])
            })
    }

    /// Folds the generation-influencing parameters into `seed`.
    ///
    /// Covers difficulty, player level and every constraint in key order.
    /// Metadata and the timeout hint are deliberately left out.
    pub fn derive_parameter_seed(&self, seed: i64, params: &GenerationParams) -> i64 {
        parameter_seed(seed, params)
    }

    pub fn create_rng(
        &self,
        content_type: &str,
        name: &str,
        params: &GenerationParams,
    ) -> SeededStream {
        let context_seed = self.derive_context_seed(content_type, name);
        SeededStream::new(self.derive_parameter_seed(context_seed, params))
    }

    /// Branches an independent child stream off `parent`.
    ///
    /// Consumes exactly one draw from the parent, so what the child does later
    /// never shifts the parent's sequence.
    pub fn create_sub_rng(parent: &mut SeededStream, phase_label: &str) -> SeededStream {
        let draw = parent.next_i64();
        SeededStream::new(phase_seed(draw, phase_label))
    }
}

/// Seed for a named phase rooted at `seed`, without touching any stream.
pub fn phase_seed(seed: i64, phase_label: &str) -> i64 {
    hash_seed(seed, &[phase_label.as_bytes()])
}

pub fn parameter_seed(seed: i64, params: &GenerationParams) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_be_bytes());
    write_component(&mut hasher, b"difficulty");
    hasher.update(i64::from(params.difficulty).to_be_bytes());
    write_component(&mut hasher, b"player_level");
    hasher.update(i64::from(params.player_level).to_be_bytes());
    for (key, value) in &params.constraints {
        write_component(&mut hasher, key.as_bytes());
        write_component(&mut hasher, value.to_string().as_bytes());
    }
    leading_i64(&hasher.finalize())
}

/// Runtime entropy for the non-deterministic fallback. Never returns zero.
pub fn generate_runtime_seed() -> i64 {
    static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    match mix_seed(entropy) as i64 {
        0 => 1,
        seed => seed,
    }
}

fn context_key(content_type: &str, name: &str) -> String {
    format!("{}:{content_type}:{name}", content_type.len())
}

fn hash_seed(seed: i64, components: &[&[u8]]) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_be_bytes());
    for component in components {
        write_component(&mut hasher, component);
    }
    leading_i64(&hasher.finalize())
}

fn write_component(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

fn leading_i64(digest: &[u8]) -> i64 {
    let mut leading = [0_u8; 8];
    leading.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(leading)
}

fn mix_seed(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn context_seed_is_stable_and_input_sensitive() {
        let manager = SeedManager::new(12_345);
        let first = manager.derive_context_seed("terrain", "x");
        assert_eq!(first, manager.derive_context_seed("terrain", "x"));
        assert_ne!(first, manager.derive_context_seed("terrain", "y"));
        assert_ne!(first, manager.derive_context_seed("dungeon", "x"));
        assert_ne!(first, SeedManager::new(12_346).derive_context_seed("terrain", "x"));
    }

    #[test]
    fn cache_never_changes_a_result() {
        let warm = SeedManager::new(77);
        let _ = warm.derive_context_seed("item", "sword");
        let cold = SeedManager::new(77);
        assert_eq!(
            warm.derive_context_seed("item", "sword"),
            cold.derive_context_seed("item", "sword")
        );
    }

    #[test]
    fn delimiter_inside_a_component_does_not_alias() {
        let manager = SeedManager::new(1);
        assert_ne!(
            manager.derive_context_seed("a:b", "c"),
            manager.derive_context_seed("a", "b:c")
        );
        assert_eq!(manager.state().context_seeds.len(), 2);
    }

    #[test]
    fn context_seed_is_leading_digest_bytes_big_endian() {
        let mut hasher = Sha256::new();
        hasher.update(9_i64.to_be_bytes());
        hasher.update(7_u64.to_be_bytes());
        hasher.update(b"terrain");
        hasher.update(1_u64.to_be_bytes());
        hasher.update(b"x");
        let digest = hasher.finalize();
        let expected = i64::from_be_bytes(digest[..8].try_into().unwrap());
        assert_eq!(SeedManager::new(9).derive_context_seed("terrain", "x"), expected);
    }

    #[test]
    fn parameter_seed_tracks_influential_fields_only() {
        let mut params = GenerationParams::new(0);
        params.difficulty = 3;
        params.player_level = 10;
        params.constraints.insert("biome".into(), json!("swamp"));
        let baseline = parameter_seed(42, &params);

        let mut annotated = params.clone();
        annotated.metadata.insert("request_id".into(), "abc".into());
        annotated.timeout = Some(Duration::from_secs(5));
        assert_eq!(parameter_seed(42, &annotated), baseline);

        let mut harder = params.clone();
        harder.difficulty = 4;
        assert_ne!(parameter_seed(42, &harder), baseline);

        let mut leveled = params.clone();
        leveled.player_level = 11;
        assert_ne!(parameter_seed(42, &leveled), baseline);

        let mut constrained = params.clone();
        constrained.constraints.insert("biome".into(), json!("desert"));
        assert_ne!(parameter_seed(42, &constrained), baseline);
    }

    #[test]
    fn constraint_insertion_order_is_irrelevant() {
        let mut forward = GenerationParams::new(0);
        forward.constraints.insert("alpha".into(), json!(1));
        forward.constraints.insert("beta".into(), json!({"z": 1, "a": 2}));
        let mut backward = GenerationParams::new(0);
        backward.constraints.insert("beta".into(), json!({"a": 2, "z": 1}));
        backward.constraints.insert("alpha".into(), json!(1));
        assert_eq!(parameter_seed(5, &forward), parameter_seed(5, &backward));
    }

    #[test]
    fn create_rng_composes_both_derivations() {
        let manager = SeedManager::new(2_024);
        let params = GenerationParams::new(2_024);
        let stream = manager.create_rng("quest", "main", &params);
        let expected = parameter_seed(manager.derive_context_seed("quest", "main"), &params);
        assert_eq!(stream.seed(), expected);
    }

    #[test]
    fn sub_stream_consumes_exactly_one_parent_draw() {
        let mut parent = SeededStream::new(500);
        let mut reference = parent.clone();
        let mut rooms = SeedManager::create_sub_rng(&mut parent, "rooms");
        let _ = reference.next_u64();
        for _ in 0..32 {
            let _ = rooms.next_u64();
        }
        assert_eq!(parent.next_u64(), reference.next_u64());
    }

    #[test]
    fn sibling_phases_get_distinct_streams() {
        let parent = SeededStream::new(500);
        let rooms = SeedManager::create_sub_rng(&mut parent.clone(), "rooms");
        let corridors = SeedManager::create_sub_rng(&mut parent.clone(), "corridors");
        assert_ne!(rooms.seed(), corridors.seed());
    }

    #[test]
    fn state_round_trips_through_json() {
        let manager = SeedManager::new(-8_675_309);
        let _ = manager.derive_context_seed("npc", "innkeeper");
        let _ = manager.derive_context_seed("faction", "guild");

        let json = serde_json::to_string(&manager.state()).unwrap();
        let restored = SeedManager::from_state(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.state(), manager.state());
        assert_eq!(
            restored.derive_context_seed("npc", "innkeeper"),
            manager.derive_context_seed("npc", "innkeeper")
        );
    }

    #[test]
    fn zero_seed_falls_back_to_a_runtime_seed() {
        let manager = SeedManager::new(0);
        assert!(!manager.is_deterministic());
        assert_ne!(manager.base_seed(), 0);
        assert!(SeedManager::new(3).is_deterministic());
    }

    #[test]
    fn runtime_seed_changes_between_calls() {
        assert_ne!(generate_runtime_seed(), generate_runtime_seed());
    }
}
