//! # ATM Client
//!
//! Terminal side of Secure-Teller: loads the identity's pre-shared key, runs
//! the initiator handshake and sends encrypted account requests.
//!
//! ```rust,ignore
//! let psk = load_psk(Path::new("server/user_keys.json"), &alice)?;
//! let mut client = AtmClient::connect("127.0.0.1:65432", alice, psk, &SessionLimits::default()).await?;
//! println!("{}", client.deposit(500).await?);
//! ```

pub mod client;
pub mod script;

pub use client::{load_psk, AtmClient, ClientError};
pub use script::parse_step;
