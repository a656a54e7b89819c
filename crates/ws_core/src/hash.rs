/// Deterministic, platform-independent hash of a seed string.
///
/// Preset seeds must resolve to the same world on every platform and
/// across program runs, so `std::hash` (randomized) is not usable here.
pub fn stable_string_hash(text: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in text.bytes() {
        hash = hash.wrapping_mul(33) ^ u64::from(byte);
    }
    hash
}

/// Mix a stage-specific seed part into a base seed.
///
/// Each generation stage derives its RNG from
/// `combine_seed(world_seed, seed_part)` so that editing one slider
/// only perturbs the stages that read it.
pub fn combine_seed(seed: u64, part: u64) -> u64 {
    seed ^ part
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}
