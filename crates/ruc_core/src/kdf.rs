//! Password-based master-key derivation.
//!
//! The cipher core consumes a 64-byte master key; when the caller only
//! has a password, Argon2id (RFC 9106) bridges the gap. The salt
//! travels in the password-bundled envelope, so derivation must be a
//! pure function of password, salt and profile.

use argon2::{Algorithm, Argon2, Params, Version};

use crate::schedule::MASTER_KEY_BYTES;

/// Salt length carried in the password-bundled envelope.
pub const SALT_BYTES: usize = 16;

/// Argon2id cost profile.
///
/// `Recommended` is the security default (64 MiB, 4 passes, 4 lanes).
/// `Interactive` trades hardness for responsiveness in UI-driven
/// callers; picking it is a caller decision, not a library one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argon2Profile {
    /// 64 MiB memory, 4 iterations, 4 lanes.
    Recommended,
    /// 19 MiB memory, 2 iterations, 1 lane.
    Interactive,
}

impl Argon2Profile {
    fn params(self) -> Params {
        let (m_cost, t_cost, p_cost) = match self {
            Argon2Profile::Recommended => (64 * 1024, 4, 4),
            Argon2Profile::Interactive => (19 * 1024, 2, 1),
        };
        Params::new(m_cost, t_cost, p_cost, Some(MASTER_KEY_BYTES))
            .expect("profile parameters are statically valid")
    }
}

/// Derive the 64-byte master key from a password and salt.
///
/// Deterministic: the same (password, salt, profile) triple always
/// yields the same key. The caller should zeroize the result once the
/// key material has been expanded.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8; SALT_BYTES],
    profile: Argon2Profile,
) -> [u8; MASTER_KEY_BYTES] {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, profile.params());
    let mut key = [0u8; MASTER_KEY_BYTES];
    argon2
        .hash_password_into(password, salt, &mut key)
        .expect("fixed salt and output lengths satisfy argon2 bounds");
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroize;

    #[test]
    fn test_derivation_is_deterministic() {
        let salt = [0x24u8; SALT_BYTES];
        let a = derive_master_key(b"correct horse", &salt, Argon2Profile::Interactive);
        let b = derive_master_key(b"correct horse", &salt, Argon2Profile::Interactive);
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_separates_keys() {
        let a = derive_master_key(b"pw", &[1u8; SALT_BYTES], Argon2Profile::Interactive);
        let b = derive_master_key(b"pw", &[2u8; SALT_BYTES], Argon2Profile::Interactive);
        assert_ne!(a, b);
    }

    #[test]
    fn test_profiles_differ() {
        let salt = [7u8; SALT_BYTES];
        let mut fast = derive_master_key(b"pw", &salt, Argon2Profile::Interactive);
        let mut slow = derive_master_key(b"pw", &salt, Argon2Profile::Recommended);
        assert_ne!(fast, slow);
        fast.zeroize();
        slow.zeroize();
    }
}
