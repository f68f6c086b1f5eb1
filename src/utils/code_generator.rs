//! Random identifier generation for workers and tracking tokens.
//!
//! Identifiers are short base-36 strings from the thread-local RNG. They are
//! opaque labels, not secrets: uniqueness is enforced by database constraints
//! and a collision surfaces as a conflict.

use rand::Rng;

/// Length of a worker code, e.g. `K3Z9QA`.
pub const WORKER_CODE_LENGTH: usize = 6;

/// Length of a tracking token, e.g. `k3z9qa0b1c2d3e4f5g6h7i8j9k`.
pub const TRACKING_TOKEN_LENGTH: usize = 26;

/// Length of the per-page-view id the redirect page reports its position with.
pub const VISIT_ID_LENGTH: usize = 32;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())] as char)
        .collect()
}

/// Generates a 6-character uppercase base-36 worker code.
pub fn generate_worker_code() -> String {
    random_base36(WORKER_CODE_LENGTH).to_ascii_uppercase()
}

/// Generates a 26-character lowercase base-36 tracking token.
pub fn generate_tracking_token() -> String {
    random_base36(TRACKING_TOKEN_LENGTH)
}

/// Generates a 32-character lowercase base-36 visit id.
pub fn generate_visit_id() -> String {
    random_base36(VISIT_ID_LENGTH)
}

/// Checks the shape of a visit id posted back by the redirect page.
pub fn is_valid_visit_id(visit_id: &str) -> bool {
    visit_id.len() == VISIT_ID_LENGTH
        && visit_id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Checks the shape of a tracking token taken from a URL path.
///
/// Used to reject garbage before it reaches the cache or the database.
pub fn is_valid_tracking_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 64
        && token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
