//! Attack simulations against a live server.
//!
//! Each test plays an adversary on the wire and checks that the server
//! refuses the session and that no account state changes.

#[cfg(test)]
mod envelope_tampering;
#[cfg(test)]
mod handshake_forgery;
