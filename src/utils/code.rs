use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Session-scoped scan code from the thread-local CSPRNG. At the default
/// length of 24 alphanumeric characters this carries ~142 bits of entropy;
/// uniqueness is still enforced by the store's constraint on insert.
pub fn generate_session_code(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
