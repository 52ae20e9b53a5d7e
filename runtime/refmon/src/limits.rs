//! Size and value limits shared by the ACL tables

/// Largest plaintext/ciphertext chunk carried in a single attribute
pub const MAX_TEXTSIZE: i32 = 64;

/// Conventional key size bounds, in bytes
pub const MIN_KEYSIZE: i32 = 8;
pub const MAX_KEYSIZE: i32 = 256;

/// PKC key size bounds, in bytes
pub const MIN_PKCSIZE: i32 = 64;
pub const MAX_PKCSIZE: i32 = 512;

pub const MIN_HASHSIZE: i32 = 16;
pub const MAX_HASHSIZE: i32 = 64;

pub const MIN_IVSIZE: i32 = 8;
pub const MAX_IVSIZE: i32 = 32;

pub const MIN_NAME_LENGTH: i32 = 2;
pub const MAX_ATTRIBUTE_SIZE: i32 = 1024;

/// Smallest envelope/session buffer
pub const MIN_BUFFER_SIZE: i32 = 8192;
pub const MAX_BUFFER_SIZE: i32 = i32::MAX - 1;

/// Iteration bounds for password-based key setup
pub const MIN_KEYSETUP_ITERATIONS: i32 = 1;
pub const MAX_KEYSETUP_ITERATIONS: i32 = 50_000;

/// Any time value at or before this (2010-01-01) is treated as a clock error
pub const MIN_TIME_VALUE: i64 = 1_262_304_000;

/// Bounds on the numeric forward/usage counts
pub const MAX_FORWARD_COUNT: i32 = 1000;
pub const MAX_USAGE_COUNT: i32 = 1000;

/// Key id length (SHA-1 sized)
pub const KEYID_SIZE: i32 = 20;
pub const PGP_KEYID_SIZE: i32 = 8;

pub const MAX_SERIALNO_SIZE: i32 = 32;

/// Sizes of the packed public-key component structures accepted by
/// `CTXINFO_KEY_COMPONENTS`
pub const KEY_COMPONENTS_RSA_SIZE: i32 = 4 * 1024 + 16;
pub const KEY_COMPONENTS_DLP_SIZE: i32 = 3 * 1024 + 12;

// Key usage bits
pub const KEYUSAGE_DIGITALSIGNATURE: i32 = 0x001;
pub const KEYUSAGE_NONREPUDIATION: i32 = 0x002;
pub const KEYUSAGE_KEYENCIPHERMENT: i32 = 0x004;
pub const KEYUSAGE_DATAENCIPHERMENT: i32 = 0x008;
pub const KEYUSAGE_KEYAGREEMENT: i32 = 0x010;
pub const KEYUSAGE_KEYCERTSIGN: i32 = 0x020;
pub const KEYUSAGE_CRLSIGN: i32 = 0x040;
pub const KEYUSAGE_ENCIPHERONLY: i32 = 0x080;
pub const KEYUSAGE_DECIPHERONLY: i32 = 0x100;
pub const KEYUSAGE_LAST: i32 = 0x200;

/// Usage bits that permit signing and signature checking
pub const KEYUSAGE_SIGN: i32 = KEYUSAGE_DIGITALSIGNATURE
    | KEYUSAGE_NONREPUDIATION
    | KEYUSAGE_KEYCERTSIGN
    | KEYUSAGE_CRLSIGN;

/// Usage bits that permit encryption and decryption
pub const KEYUSAGE_CRYPT: i32 =
    KEYUSAGE_KEYENCIPHERMENT | KEYUSAGE_DATAENCIPHERMENT | KEYUSAGE_KEYAGREEMENT;
