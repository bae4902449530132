//! End-to-end sessions through a real listener and the ATM client.

#[cfg(test)]
mod e2e_sessions;
