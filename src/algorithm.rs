// Copyright (c) 2023 Boris Onchev (boris.oncev@gmail.com)
//
// Distributed under the Boost Software License, Version 1.0. (See accompanying
// file LICENSE or copy at http://www.boost.org/LICENSE_1_0.txt)

//! The implementaton details of the RC6 block cipher algorithm
//!
use std::cmp::max;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ODD((E - 2) * (1 << 32))
const P32: u32 = 0xB7E15163;
// ODD((PHI - 1) * (1 << 32))
const Q32: u32 = 0x9E3779B9;
// log2 of the word width, the fixed rotation of the quadratic mix
const LG_W: u32 = 5;

/// RC6 operates on blocks of four 32-bit words.
pub const BLOCK_SIZE: usize = 16;

/// Upper bound on the round count.
pub const MAX_ROUNDS: u8 = 125;

/// The `RC6InitError` enum represents the possible errors that can occur
/// during [RC6] construction or key scheduling.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RC6InitError {
    #[error("invalid number of rounds `{0}`; supported range is [0, 125]")]
    InvalidRounds(u8),
    #[error("invalid key: `{key_bytes}` bytes with `{key_bits}` declared bits; the key must be non-empty and the bit length in (0, 8 * bytes]")]
    InvalidKey { key_bytes: usize, key_bits: u16 },
}

/// The `RC6CipherError` enum represents the possible errors that can occur
/// during encryption and decryption with [RC6].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RC6CipherError {
    #[error("cipher is not initialized; call `init` with a key first")]
    NotInitialized,
    #[error("invalid block size `{0}`; RC6 operates on exactly 16 byte blocks")]
    InvalidBlockSize(usize),
}

/// The RC6 struct represents an instance of the RC6 block cipher algorithm.
///
/// An instance is created with a round count (or [RC6::default] for the
/// nominal 20 rounds) and becomes usable once [RC6::init] has derived a
/// round-key table from a key. `init` may be called again at any time to
/// rebind a new key; the previous table is wiped before it is replaced, and
/// the table is likewise wiped when the instance is dropped.
///
/// The type is deliberately not `Clone`: duplicating it would duplicate live
/// key material. Moving it is fine.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RC6 {
    rounds: u8,
    // empty until the first successful init; length 2*rounds + 4 afterwards
    round_keys: Vec<u32>,
}

impl Default for RC6 {
    /// Creates an uninitialized RC6 instance with the nominal 20 rounds.
    fn default() -> Self {
        RC6 {
            rounds: 20,
            round_keys: Vec::new(),
        }
    }
}

impl std::fmt::Debug for RC6 {
    // the round-key table is key-equivalent material and is never printed
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RC6")
            .field("rounds", &self.rounds)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl RC6 {
    /// Creates a new uninitialized RC6 instance with the given number of
    /// rounds (0 to 125).
    ///
    /// # Examples
    ///
    /// ```
    /// use rc6::RC6;
    ///
    /// let rc6 = RC6::new(20).unwrap();
    /// assert!(!rc6.is_initialized());
    /// ```
    pub fn new(rounds: u8) -> Result<RC6, RC6InitError> {
        if rounds > MAX_ROUNDS {
            return Err(RC6InitError::InvalidRounds(rounds));
        }

        Ok(RC6 {
            rounds,
            round_keys: Vec::new(),
        })
    }

    /// The round count this instance was constructed with.
    pub fn rounds(&self) -> u8 {
        self.rounds
    }

    /// Whether a round-key table is present, i.e. whether [RC6::init] has
    /// succeeded at least once.
    pub fn is_initialized(&self) -> bool {
        !self.round_keys.is_empty()
    }

    /// Derives the round-key table from `key`, replacing any previous table.
    ///
    /// `key_length_bits` declares how many bits of `key` participate in the
    /// schedule; bits past the declared length are treated as zero even if
    /// the buffer holds other values there. The call is atomic: on error the
    /// cipher keeps whatever table it had before.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc6::RC6;
    ///
    /// let mut rc6 = RC6::default();
    /// rc6.init(b"my secret rc6key", 128).unwrap();
    /// assert!(rc6.is_initialized());
    /// ```
    pub fn init(&mut self, key: &[u8], key_length_bits: u16) -> Result<(), RC6InitError> {
        if self.rounds > MAX_ROUNDS {
            return Err(RC6InitError::InvalidRounds(self.rounds));
        }

        if key.is_empty() || key_length_bits == 0 || usize::from(key_length_bits) > key.len() * 8 {
            return Err(RC6InitError::InvalidKey {
                key_bytes: key.len(),
                key_bits: key_length_bits,
            });
        }

        let table = expand_key(self.rounds, key, key_length_bits);

        self.round_keys.zeroize();
        self.round_keys = table;

        Ok(())
    }

    /// Encrypts the four-word block `words` in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc6::RC6;
    ///
    /// let mut rc6 = RC6::default();
    /// rc6.init(&[0xAB; 16], 128).unwrap();
    ///
    /// let original = [0x12345678, 0x9ABCDEF0, 0x0F1E2D3C, 0x4B5A6978];
    /// let mut words = original;
    /// rc6.encrypt_words(&mut words).unwrap();
    /// assert_ne!(words, original);
    /// rc6.decrypt_words(&mut words).unwrap();
    /// assert_eq!(words, original);
    /// ```
    pub fn encrypt_words(&self, words: &mut [u32; 4]) -> Result<(), RC6CipherError> {
        if !self.is_initialized() {
            return Err(RC6CipherError::NotInitialized);
        }

        let s = &self.round_keys;
        let r = usize::from(self.rounds);
        let [mut a, mut b, mut c, mut d] = *words;

        b = b.wrapping_add(s[0]);
        d = d.wrapping_add(s[1]);

        for i in 1..=r {
            // t = (b * (2b + 1)) <<< 5, u = (d * (2d + 1)) <<< 5
            let t = b
                .wrapping_mul(b.wrapping_shl(1).wrapping_add(1))
                .rotate_left(LG_W);
            let u = d
                .wrapping_mul(d.wrapping_shl(1).wrapping_add(1))
                .rotate_left(LG_W);
            a = (a ^ t).rotate_left(u).wrapping_add(s[2 * i]);
            c = (c ^ u).rotate_left(t).wrapping_add(s[2 * i + 1]);
            // (a, b, c, d) = (b, c, d, a)
            (a, b, c, d) = (b, c, d, a);
        }

        a = a.wrapping_add(s[2 * r + 2]);
        c = c.wrapping_add(s[2 * r + 3]);

        *words = [a, b, c, d];
        Ok(())
    }

    /// Decrypts the four-word block `words` in place, undoing
    /// [RC6::encrypt_words] step by step in reverse.
    pub fn decrypt_words(&self, words: &mut [u32; 4]) -> Result<(), RC6CipherError> {
        if !self.is_initialized() {
            return Err(RC6CipherError::NotInitialized);
        }

        let s = &self.round_keys;
        let r = usize::from(self.rounds);
        let [mut a, mut b, mut c, mut d] = *words;

        c = c.wrapping_sub(s[2 * r + 3]);
        a = a.wrapping_sub(s[2 * r + 2]);

        for i in (1..=r).rev() {
            // (a, b, c, d) = (d, a, b, c)
            (a, b, c, d) = (d, a, b, c);
            let u = d
                .wrapping_mul(d.wrapping_shl(1).wrapping_add(1))
                .rotate_left(LG_W);
            let t = b
                .wrapping_mul(b.wrapping_shl(1).wrapping_add(1))
                .rotate_left(LG_W);
            c = c.wrapping_sub(s[2 * i + 1]).rotate_right(t) ^ u;
            a = a.wrapping_sub(s[2 * i]).rotate_right(u) ^ t;
        }

        d = d.wrapping_sub(s[1]);
        b = b.wrapping_sub(s[0]);

        *words = [a, b, c, d];
        Ok(())
    }

    /// Encrypts the 16-byte block in place, reading and writing the four
    /// words in little-endian order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc6::RC6;
    ///
    /// let mut rc6 = RC6::default();
    /// rc6.init(&[0u8; 16], 128).unwrap();
    ///
    /// let mut block = [0u8; 16];
    /// rc6.encrypt_block(&mut block).unwrap();
    /// assert_eq!(
    ///     block,
    ///     [
    ///         0x8F, 0xC3, 0xA5, 0x36, 0x56, 0xB1, 0xF7, 0x78,
    ///         0xC1, 0x29, 0xDF, 0x4E, 0x98, 0x48, 0xA4, 0x1E,
    ///     ]
    /// );
    /// ```
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) -> Result<(), RC6CipherError> {
        let mut words = words_from_le_bytes(block);
        self.encrypt_words(&mut words)?;
        words_to_le_bytes(&words, block);
        Ok(())
    }

    /// Decrypts the 16-byte block in place; the exact inverse of
    /// [RC6::encrypt_block].
    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) -> Result<(), RC6CipherError> {
        let mut words = words_from_le_bytes(block);
        self.decrypt_words(&mut words)?;
        words_to_le_bytes(&words, block);
        Ok(())
    }

    /// Encrypts a 16-byte slice in place.
    ///
    /// Returns a reference to the encrypted bytes on success, or
    /// [RC6CipherError::InvalidBlockSize] if the slice is not exactly 16
    /// bytes long.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc6::RC6;
    ///
    /// let mut rc6 = RC6::default();
    /// rc6.init(&[0u8; 24], 192).unwrap();
    ///
    /// let mut block = vec![0u8; 16];
    /// let ct = rc6.encrypt(&mut block).unwrap();
    /// assert_eq!(ct[..4], [0x6C, 0xD6, 0x1B, 0xCB]);
    /// ```
    pub fn encrypt<'a>(&self, block: &'a mut [u8]) -> Result<&'a mut [u8], RC6CipherError> {
        self.encrypt_block(try_into_block(block)?)?;
        Ok(block)
    }

    /// Decrypts a 16-byte slice in place.
    ///
    /// Returns a reference to the decrypted bytes on success, or
    /// [RC6CipherError::InvalidBlockSize] if the slice is not exactly 16
    /// bytes long.
    pub fn decrypt<'a>(&self, block: &'a mut [u8]) -> Result<&'a mut [u8], RC6CipherError> {
        self.decrypt_block(try_into_block(block)?)?;
        Ok(block)
    }
}

fn try_into_block(bytes: &mut [u8]) -> Result<&mut [u8; BLOCK_SIZE], RC6CipherError> {
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| RC6CipherError::InvalidBlockSize(len))
}

fn words_from_le_bytes(block: &[u8; BLOCK_SIZE]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (i, word) in words.iter_mut().enumerate() {
        *word = u32::from_le_bytes([
            block[4 * i],
            block[4 * i + 1],
            block[4 * i + 2],
            block[4 * i + 3],
        ]);
    }
    words
}

fn words_to_le_bytes(words: &[u32; 4], block: &mut [u8; BLOCK_SIZE]) {
    for (word, chunk) in words.iter().zip(block.chunks_exact_mut(4)) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

/// Derives the round-key table of `2*rounds + 4` words from the declared key
/// bits. Preconditions (non-empty key, bit length non-zero and within the
/// buffer, rounds in range) are checked by the caller.
fn expand_key(rounds: u8, key: &[u8], key_length_bits: u16) -> Vec<u32> {
    let bits = usize::from(key_length_bits);
    let c = bits.div_ceil(32);

    // pack the declared key bits into little-endian words; anything past the
    // declared length stays zero
    let mut key_words = vec![0u32; c];
    for (i, &byte) in key.iter().take(bits / 8).enumerate() {
        key_words[i / 4] |= u32::from(byte) << (8 * (i % 4));
    }
    if bits % 8 != 0 {
        let i = bits / 8;
        let partial = key[i] & ((1 << (bits % 8)) - 1);
        key_words[i / 4] |= u32::from(partial) << (8 * (i % 4));
    }

    let key_size = 2 * usize::from(rounds) + 4;
    let mut table: Vec<u32> = std::iter::successors(Some(P32), |x| Some(x.wrapping_add(Q32)))
        .take(key_size)
        .collect();

    let mut a = 0u32;
    let mut b = 0u32;
    let mut i = 0;
    let mut j = 0;
    for _ in 0..3 * max(c, key_size) {
        // A = S[i] = (S[i] + A + B) <<< 3
        table[i] = table[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
        a = table[i];
        // B = L[j] = (L[j] + A + B) <<< (A + B)
        let ab = a.wrapping_add(b);
        key_words[j] = key_words[j].wrapping_add(ab).rotate_left(ab);
        b = key_words[j];
        i = (i + 1) % key_size;
        j = (j + 1) % c;
    }

    key_words.zeroize();
    table
}
