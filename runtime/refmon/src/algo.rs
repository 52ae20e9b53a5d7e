//! Algorithm identifiers
//!
//! Algorithms are numbered in blocks of 100 per class. The creation
//! argument of a context is its algorithm id, so the block an id falls
//! into also selects the context subtype (see
//! [`SubType::from_creation_arg`](crate::SubType::from_creation_arg)).

/// Algorithm identifier
pub type Algorithm = i32;

pub const ALGO_NONE: Algorithm = 0;

// Conventional ciphers
pub const ALGO_DES: Algorithm = 1;
pub const ALGO_3DES: Algorithm = 2;
pub const ALGO_IDEA: Algorithm = 3;
pub const ALGO_CAST: Algorithm = 4;
pub const ALGO_RC2: Algorithm = 5;
pub const ALGO_RC4: Algorithm = 6;
pub const ALGO_RC5: Algorithm = 7;
pub const ALGO_AES: Algorithm = 8;
pub const ALGO_BLOWFISH: Algorithm = 9;
pub const ALGO_SKIPJACK: Algorithm = 10;

// Public-key algorithms
pub const ALGO_DH: Algorithm = 100;
pub const ALGO_RSA: Algorithm = 101;
pub const ALGO_DSA: Algorithm = 102;
pub const ALGO_ELGAMAL: Algorithm = 103;
pub const ALGO_KEA: Algorithm = 104;
pub const ALGO_ECDSA: Algorithm = 105;
pub const ALGO_ECDH: Algorithm = 106;

// Hash algorithms
pub const ALGO_MD2: Algorithm = 200;
pub const ALGO_MD4: Algorithm = 201;
pub const ALGO_MD5: Algorithm = 202;
pub const ALGO_SHA1: Algorithm = 203;
pub const ALGO_RIPEMD160: Algorithm = 204;
pub const ALGO_SHA2: Algorithm = 205;

// MAC algorithms
pub const ALGO_HMAC_MD5: Algorithm = 300;
pub const ALGO_HMAC_SHA1: Algorithm = 301;
pub const ALGO_HMAC_RIPEMD160: Algorithm = 302;
pub const ALGO_HMAC_SHA2: Algorithm = 303;

pub const ALGO_FIRST_CONVENTIONAL: Algorithm = ALGO_DES;
pub const ALGO_LAST_CONVENTIONAL: Algorithm = 99;
pub const ALGO_FIRST_PKC: Algorithm = ALGO_DH;
pub const ALGO_LAST_PKC: Algorithm = 199;
pub const ALGO_FIRST_HASH: Algorithm = ALGO_MD2;
pub const ALGO_LAST_HASH: Algorithm = 299;
pub const ALGO_FIRST_MAC: Algorithm = ALGO_HMAC_MD5;
pub const ALGO_LAST_MAC: Algorithm = 399;
pub const ALGO_FIRST_GENERIC: Algorithm = 400;
pub const ALGO_LAST_GENERIC: Algorithm = 499;

pub const fn is_conventional(algo: Algorithm) -> bool {
    algo >= ALGO_FIRST_CONVENTIONAL && algo <= ALGO_LAST_CONVENTIONAL
}

pub const fn is_pkc(algo: Algorithm) -> bool {
    algo >= ALGO_FIRST_PKC && algo <= ALGO_LAST_PKC
}

pub const fn is_hash(algo: Algorithm) -> bool {
    algo >= ALGO_FIRST_HASH && algo <= ALGO_LAST_HASH
}

pub const fn is_mac(algo: Algorithm) -> bool {
    algo >= ALGO_FIRST_MAC && algo <= ALGO_LAST_MAC
}

/// Encryption modes
pub const MODE_NONE: i32 = 0;
pub const MODE_ECB: i32 = 1;
pub const MODE_CBC: i32 = 2;
pub const MODE_CFB: i32 = 3;
pub const MODE_OFB: i32 = 4;
pub const MODE_GCM: i32 = 5;
pub const MODE_LAST: i32 = 6;
