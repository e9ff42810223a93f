//! Session factory.

use ormlet_core::ConnectionProvider;
use ormlet_session::Session;

/// Hands out independent sessions over a shared connection provider.
///
/// Sessions are single-use: once closed, loading again means opening a new
/// one. The factory owns the provider configuration so call sites only decide
/// *when* a unit of work starts, not how to reach the store.
pub struct SessionFactory<P: ConnectionProvider + Clone> {
    provider: P,
}

impl<P: ConnectionProvider + Clone> SessionFactory<P> {
    /// Create a factory over a connection provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Open a fresh session.
    ///
    /// Each session gets its own clone of the provider and tracks its own
    /// entities; nothing is shared between sessions except the store itself.
    pub fn open_session(&self) -> Session<P> {
        Session::new(self.provider.clone())
    }

    /// Get a reference to the underlying connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
