//! # Secure-Teller Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs       # Loopback server fixture
//! ├── integration/     # End-to-end sessions over TCP
//! └── exploits/        # Forged handshakes and tampered envelopes
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p st-tests
//! cargo test -p st-tests exploits::
//! cargo bench -p st-tests
//! ```

pub mod exploits;
pub mod harness;
pub mod integration;
