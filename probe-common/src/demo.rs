//! The fixed sample data the probes write. These values only exist to
//! prove a round trip against the store; nothing reads them afterwards.

/// Name inserted into the `users` relation when the event supplies none.
pub const DEMO_USER_NAME: &str = "John Doe";

/// Email inserted into the `users` relation when the event supplies none.
/// Repeat inserts with this value hit the unique constraint, which is an
/// acceptable terminal outcome for the probe.
pub const DEMO_USER_EMAIL: &str = "john@example.com";

/// Key written by the key-value probe.
pub const DEMO_KEY: &str = "test";

/// Value written under [`DEMO_KEY`]. Set with no expiry, so it accumulates
/// across invocations.
pub const DEMO_VALUE: &str = "asfdaaaaa";

/// A key that is never written; reading it must come back as a miss.
pub const MISSING_KEY: &str = "testaaaa";
