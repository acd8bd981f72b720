//! Passcode generation

use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{DomainError, DomainResult};

const DIGITS: &[u8; 10] = b"0123456789";

/// Largest byte that keeps `byte % 10` uniform: 255 - (256 % 10)
const MAX_UNBIASED_BYTE: u8 = 249;

/// Source of numeric passcodes
pub trait OtpGenerator: Send + Sync {
    /// Produce a string of exactly `length` ASCII digits
    fn generate(&self, length: usize) -> DomainResult<String>;
}

/// Generator drawing from the operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngOtpGenerator;

impl OtpGenerator for OsRngOtpGenerator {
    fn generate(&self, length: usize) -> DomainResult<String> {
        generate_digits(&mut OsRng, length)
    }
}

/// Draw `length` uniformly distributed digits from `rng`
///
/// Random bytes above [`MAX_UNBIASED_BYTE`] are rejected. Each round reads a
/// quarter more bytes than still needed to make a second round unlikely.
pub fn generate_digits<R: RngCore + ?Sized>(rng: &mut R, length: usize) -> DomainResult<String> {
    let mut code = String::with_capacity(length);

    while code.len() < length {
        let missing = length - code.len();
        let mut buf = vec![0u8; missing + missing / 4];
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| DomainError::Generation {
                message: e.to_string(),
            })?;

        for byte in buf.into_iter().filter(|b| *b <= MAX_UNBIASED_BYTE) {
            code.push(DIGITS[usize::from(byte) % DIGITS.len()] as char);
            if code.len() == length {
                break;
            }
        }
    }

    Ok(code)
}

/// Generator returning a fixed code, or failing on demand
///
/// Intended for tests and local runs.
#[derive(Debug)]
pub struct StaticOtpGenerator {
    code: Option<String>,
    calls: AtomicUsize,
}

impl StaticOtpGenerator {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator whose entropy source is always unavailable
    pub fn failing() -> Self {
        Self {
            code: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OtpGenerator for StaticOtpGenerator {
    fn generate(&self, _length: usize) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.code.clone().ok_or_else(|| DomainError::Generation {
            message: "entropy source unavailable".to_string(),
        })
    }
}
