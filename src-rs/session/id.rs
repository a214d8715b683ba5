use anyhow::Result;
use rand::Rng;

/// The runtime rejects session ids shorter than this.
pub const MIN_SESSION_ID_LEN: usize = 33;
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Random base36 text carrying at least `bits` bits of entropy.
pub fn random_base36(bits: u32) -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::new();
    let mut gathered = 0u32;
    while gathered < bits {
        let mut n: u64 = rng.gen();
        // 13 base36 digits cover a full u64
        for _ in 0..13 {
            let digit = (n % 36) as u32;
            out.push(char::from_digit(digit, 36).unwrap_or('0'));
            n /= 36;
        }
        gathered += 64;
    }
    out
}

fn base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        let digit = (n % 36) as u32;
        digits.push(char::from_digit(digit, 36).unwrap_or('0'));
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// Locally generated session id: millisecond timestamp plus random base36
/// segments, always at least [`MIN_SESSION_ID_LEN`] characters.
pub fn generate_session_id() -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let mut id = format!("{}{}", base36(timestamp), random_base36(128));
    while id.len() < MIN_SESSION_ID_LEN {
        id.push_str(&random_base36(64));
    }
    id
}

pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.len() < MIN_SESSION_ID_LEN {
        anyhow::bail!("session id shorter than the runtime minimum of {} characters", MIN_SESSION_ID_LEN);
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        anyhow::bail!("session id too long");
    }
    let ok = session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        anyhow::bail!("invalid session id");
    }
    Ok(())
}
