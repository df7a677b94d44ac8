/// Credential codec: salted, deterministic password hashing
///
/// Passwords are derived with PBKDF2-HMAC-SHA256 using a per-user salt that is
/// generated once when the user is created and kept for the lifetime of the
/// account. A password change re-encodes with the same salt.
///
/// # Parameters
///
/// - **PRF**: HMAC-SHA256
/// - **Iterations**: 10 000
/// - **Output**: 50 bytes, stored as 100 lower-case hex characters
/// - **Salt**: 16 random ASCII alphanumerics
///
/// Hashes produced with these parameters are byte-compatible with rows written
/// by earlier deployments of the service, which used the same derivation.
///
/// # Example
///
/// ```
/// use usermanagement_shared::credential::{encode_password, generate_salt, verify_password};
///
/// let salt = generate_salt();
/// let hash = encode_password("correct horse", &salt);
///
/// assert_eq!(hash, encode_password("correct horse", &salt));
/// assert!(verify_password("correct horse", &salt, &hash));
/// assert!(!verify_password("wrong horse", &salt, &hash));
/// ```

use pbkdf2::pbkdf2_hmac;
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

/// Number of PBKDF2 rounds
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Length of the derived key in bytes
pub const HASH_LENGTH: usize = 50;

/// Length of a generated salt in characters
pub const SALT_LENGTH: usize = 16;

/// Minimum accepted password length for new passwords
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Generates a random alphanumeric salt
///
/// Uses the thread-local CSPRNG.
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

/// Derives the stored hash for `password` under `salt`
///
/// Pure function: the same inputs always yield the same hex string.
pub fn encode_password(password: &str, salt: &str) -> String {
    let mut derived = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut derived);
    hex::encode(derived)
}

/// Checks `password` against a stored hash
///
/// The comparison runs over the full length regardless of where the first
/// mismatch is.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let candidate = encode_password(password, salt);
    constant_time_eq(candidate.as_bytes(), expected_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Validates password shape before it reaches the store
///
/// # Example
///
/// ```
/// use usermanagement_shared::credential::validate_password_strength;
///
/// assert!(validate_password_strength("hunter2").is_ok());
/// assert!(validate_password_strength("short").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_vector() {
        // Reference value computed independently with PBKDF2-HMAC-SHA256
        let hash = encode_password("secret123", "AbCdEfGhIj");
        assert_eq!(
            hash,
            "10a15b37f1e47fb7bf2183d676b37693392dab6962a4a0251135e67b466eeb01\
             1155b24ce4128cdc00ca26307baab6db272f"
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let salt = "fixedsalt1234567";
        assert_eq!(encode_password("pw", salt), encode_password("pw", salt));
    }

    #[test]
    fn test_encode_output_is_hex_of_fixed_length() {
        let hash = encode_password("anything", "somesalt");
        assert_eq!(hash.len(), HASH_LENGTH * 2);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_different_salts_give_different_hashes() {
        assert_ne!(
            encode_password("same_password", "saltsaltsaltAAAA"),
            encode_password("same_password", "saltsaltsaltBBBB")
        );
    }

    #[test]
    fn test_generate_salt_shape() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt();
        let hash = encode_password("correct_password", &salt);

        assert!(verify_password("correct_password", &salt, &hash));
        assert!(!verify_password("wrong_password", &salt, &hash));
        assert!(!verify_password("", &salt, &hash));
        assert!(!verify_password("correct_password", "othersalt", &hash));
    }

    #[test]
    fn test_verify_rejects_truncated_hash() {
        let hash = encode_password("pw", "saltsalt");
        assert!(!verify_password("pw", "saltsalt", &hash[..hash.len() - 2]));
    }

    #[test]
    fn test_validate_password_strength() {
        assert!(validate_password_strength("abcdef").is_ok());
        assert!(validate_password_strength("unicode-密码").is_ok());

        let err = validate_password_strength("abc").unwrap_err();
        assert!(err.contains("at least 6 characters"));

        assert!(validate_password_strength("      ").is_err());
    }
}
