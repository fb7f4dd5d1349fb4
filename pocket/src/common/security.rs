use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::{ErrorKind, PocketError, PocketResult};

use super::{KEY_LEN, NONCE_LEN, SALT_LEN, SECURE_FORMAT_VERSION, SECURE_MAGIC};

const HEADER_LEN: usize = SECURE_MAGIC.len() + 1 + 12 + SALT_LEN + NONCE_LEN;

// highest costs a payload may ask for, unless the cipher itself is configured higher
const MAX_M_COST: u32 = Params::DEFAULT_M_COST * 16;
const MAX_T_COST: u32 = 16;
const MAX_P_COST: u32 = 16;

/// The cryptographic collaborator used to lock and unlock collections.
///
/// The store only ever hands a serialized record and a password to
/// [CipherProvider::encrypt], and a stored payload and a password to
/// [CipherProvider::decrypt]. Key derivation and cipher parameters are
/// entirely the provider's concern.
pub trait CipherProvider: Send + Sync {
    /// Encrypts `plaintext` with a key derived from `password` and returns a
    /// text-safe payload.
    fn encrypt(&self, plaintext: &str, password: &str) -> PocketResult<String>;

    /// Reverses [CipherProvider::encrypt].
    ///
    /// Must fail with [ErrorKind::DecryptionFailure] on a wrong password or a
    /// corrupted payload rather than returning garbage.
    fn decrypt(&self, payload: &str, password: &str) -> PocketResult<String>;
}

/// Cloneable handle to a [CipherProvider].
#[derive(Clone)]
pub struct Cipher {
    inner: Arc<dyn CipherProvider>,
}

impl Cipher {
    pub fn new<T: CipherProvider + 'static>(inner: T) -> Self {
        Cipher { inner: Arc::new(inner) }
    }
}

impl Default for Cipher {
    fn default() -> Self {
        Cipher::new(AesGcmCipher::default())
    }
}

impl Deref for Cipher {
    type Target = Arc<dyn CipherProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// AES-256-GCM cipher keyed with Argon2id.
///
/// GCM runs AES in counter mode and appends an authentication tag, so a wrong
/// password is detected instead of yielding a plausible but wrong plaintext.
///
/// Payload layout before base64 encoding:
///
/// ```text
/// "PKT" | version u8 | m_cost u32 LE | t_cost u32 LE | p_cost u32 LE | salt[16] | nonce[12] | ciphertext+tag
/// ```
///
/// The Argon2 costs travel with the payload so that data written under one
/// configuration can be read back under another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AesGcmCipher {
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
}

impl Default for AesGcmCipher {
    fn default() -> Self {
        AesGcmCipher {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

impl AesGcmCipher {
    /// Creates a cipher using the Argon2 default costs.
    pub fn new() -> Self {
        AesGcmCipher::default()
    }

    /// Creates a cipher with explicit Argon2 costs.
    ///
    /// # Arguments
    ///
    /// * `m_cost` - memory size in KiB
    /// * `t_cost` - number of iterations
    /// * `p_cost` - degree of parallelism
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] if Argon2 rejects the parameters.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> PocketResult<Self> {
        derive_params(m_cost, t_cost, p_cost, ErrorKind::InvalidOperation)?;
        Ok(AesGcmCipher { m_cost, t_cost, p_cost })
    }

    pub fn m_cost(&self) -> u32 {
        self.m_cost
    }

    pub fn t_cost(&self) -> u32 {
        self.t_cost
    }

    pub fn p_cost(&self) -> u32 {
        self.p_cost
    }

    /// Rejects payloads whose Argon2 costs exceed what this cipher accepts.
    fn check_costs(&self, header: &SecureHeader) -> PocketResult<()> {
        let within = header.m_cost <= self.m_cost.max(MAX_M_COST)
            && header.t_cost <= self.t_cost.max(MAX_T_COST)
            && header.p_cost <= self.p_cost.max(MAX_P_COST);
        if !within {
            log::error!(
                "Secure payload asks for excessive key derivation costs (m={}, t={}, p={})",
                header.m_cost,
                header.t_cost,
                header.p_cost
            );
            return Err(PocketError::new(
                "Secure payload asks for excessive key derivation costs",
                ErrorKind::DecryptionFailure,
            ));
        }
        Ok(())
    }
}

impl CipherProvider for AesGcmCipher {
    fn encrypt(&self, plaintext: &str, password: &str) -> PocketResult<String> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(
            password,
            &salt,
            (self.m_cost, self.t_cost, self.p_cost),
            ErrorKind::EncryptionFailure,
        )?;
        let aes = Aes256Gcm::new_from_slice(&key).map_err(|e| {
            log::error!("Failed to initialize cipher: {}", e);
            PocketError::new("Failed to initialize cipher", ErrorKind::EncryptionFailure)
        })?;

        let ciphertext = aes
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| {
                log::error!("Failed to encrypt payload: {}", e);
                PocketError::new("Failed to encrypt payload", ErrorKind::EncryptionFailure)
            })?;

        let mut payload = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        payload.extend_from_slice(SECURE_MAGIC);
        payload.push(SECURE_FORMAT_VERSION);
        payload.extend_from_slice(&self.m_cost.to_le_bytes());
        payload.extend_from_slice(&self.t_cost.to_le_bytes());
        payload.extend_from_slice(&self.p_cost.to_le_bytes());
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(payload))
    }

    fn decrypt(&self, payload: &str, password: &str) -> PocketResult<String> {
        let bytes = STANDARD.decode(payload.trim())?;
        let header = SecureHeader::parse(&bytes)?;
        self.check_costs(&header)?;

        let key = derive_key(
            password,
            header.salt,
            (header.m_cost, header.t_cost, header.p_cost),
            ErrorKind::DecryptionFailure,
        )?;
        let aes = Aes256Gcm::new_from_slice(&key).map_err(|e| {
            log::error!("Failed to initialize cipher: {}", e);
            PocketError::new("Failed to initialize cipher", ErrorKind::DecryptionFailure)
        })?;

        let plaintext = aes
            .decrypt(Nonce::from_slice(header.nonce), header.ciphertext)
            .map_err(|_| {
                log::error!("Secure payload failed authentication");
                PocketError::new(
                    "Wrong password or corrupted secure payload",
                    ErrorKind::DecryptionFailure,
                )
            })?;

        String::from_utf8(plaintext).map_err(|e| {
            PocketError::new(
                &format!("Decrypted payload is not valid UTF-8: {}", e),
                ErrorKind::DecryptionFailure,
            )
        })
    }
}

struct SecureHeader<'a> {
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    salt: &'a [u8],
    nonce: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> SecureHeader<'a> {
    fn parse(bytes: &'a [u8]) -> PocketResult<SecureHeader<'a>> {
        if bytes.len() < HEADER_LEN || &bytes[..SECURE_MAGIC.len()] != SECURE_MAGIC {
            log::error!("Secure payload has an invalid header");
            return Err(PocketError::new(
                "Not a secure payload",
                ErrorKind::DecryptionFailure,
            ));
        }

        let mut offset = SECURE_MAGIC.len();
        let version = bytes[offset];
        if version != SECURE_FORMAT_VERSION {
            log::error!("Unsupported secure payload version {}", version);
            return Err(PocketError::new(
                &format!("Unsupported secure payload version {}", version),
                ErrorKind::DecryptionFailure,
            ));
        }
        offset += 1;

        let read_u32 = |offset: &mut usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[*offset..*offset + 4]);
            *offset += 4;
            u32::from_le_bytes(buf)
        };
        let m_cost = read_u32(&mut offset);
        let t_cost = read_u32(&mut offset);
        let p_cost = read_u32(&mut offset);

        let salt = &bytes[offset..offset + SALT_LEN];
        offset += SALT_LEN;
        let nonce = &bytes[offset..offset + NONCE_LEN];
        offset += NONCE_LEN;

        Ok(SecureHeader {
            m_cost,
            t_cost,
            p_cost,
            salt,
            nonce,
            ciphertext: &bytes[offset..],
        })
    }
}

fn derive_params(m_cost: u32, t_cost: u32, p_cost: u32, kind: ErrorKind) -> PocketResult<Params> {
    Params::new(m_cost, t_cost, p_cost, Some(KEY_LEN)).map_err(|e| {
        log::error!("Invalid key derivation parameters: {}", e);
        PocketError::new(&format!("Invalid key derivation parameters: {}", e), kind)
    })
}

fn derive_key(
    password: &str,
    salt: &[u8],
    (m_cost, t_cost, p_cost): (u32, u32, u32),
    kind: ErrorKind,
) -> PocketResult<[u8; KEY_LEN]> {
    let params = derive_params(m_cost, t_cost, p_cost, kind.clone())?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| {
            log::error!("Failed to derive key: {}", e);
            PocketError::new(&format!("Failed to derive key: {}", e), kind)
        })?;
    Ok(key)
}
