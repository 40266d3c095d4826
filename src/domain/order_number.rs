use chrono::Utc;
use uuid::Uuid;

const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 4;

/// Number of generate-and-insert attempts before a submission gives up on a colliding number.
pub const MAX_ATTEMPTS: u32 = 3;

/// Builds `{prefix}-{epoch millis}-{4 uppercase alphanumerics}`, e.g. `TCH-1718000000000-K3F9`.
///
/// Practically but not globally unique; the store's unique index has the final say.
pub fn generate(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4();
    let suffix: String = random
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| SUFFIX_ALPHABET[(*b as usize) % SUFFIX_ALPHABET.len()] as char)
        .collect();

    format!("{prefix}-{millis}-{suffix}")
}

pub fn is_well_formed(order_number: &str, prefix: &str) -> bool {
    let Some(rest) = order_number
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    let Some((millis, suffix)) = rest.split_once('-') else {
        return false;
    };

    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}
