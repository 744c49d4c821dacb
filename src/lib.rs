// Copyright (c) 2023 Boris Onchev (boris.oncev@gmail.com)
//
// Distributed under the Boost Software License, Version 1.0. (See accompanying
// file LICENSE or copy at http://www.boost.org/LICENSE_1_0.txt)

//! This library provides an implementation of the RC6 block cipher algorithm
//!
//! RC6 is a symmetric-key block cipher derived from RC5, designed by Rivest,
//! Robshaw, Sidney and Yin and submitted to the AES competition. This
//! implementation uses the standard parameterization: a 128-bit block of four
//! 32-bit words, an arbitrary-length key with a declared bit length, and a
//! configurable round count (0 to 125, nominally 20).
//!
//! A [RC6] instance is constructed with a round count, bound to a key through
//! its key schedule, and then encrypts and decrypts single 16-byte blocks in
//! place. The round-key table derived from the key is wiped from memory when
//! the instance is dropped or re-keyed.
//!
mod algorithm;

pub use crate::algorithm::*;
