use rand::Rng;
use crate::domain::TicketCode;

pub const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random six-character code. Uniqueness is enforced by the registry, which
/// retries on collision.
pub fn random_ticket_code() -> TicketCode {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn is_ticket_code(candidate: &str) -> bool {
    candidate.len() == CODE_LENGTH
        && candidate.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
