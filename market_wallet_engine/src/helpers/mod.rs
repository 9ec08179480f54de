use rand::Rng;

/// Mints an idempotency reference for callers that did not supply one, e.g. `credit:9f2c4a1b0d3e5f67`.
/// Two reference-less calls mint distinct references and are therefore not deduplicated against
/// each other; replay protection requires the caller to reuse a stable reference.
pub fn random_reference(prefix: &str) -> String {
    let token: u64 = rand::thread_rng().gen();
    format!("{prefix}:{token:016x}")
}
