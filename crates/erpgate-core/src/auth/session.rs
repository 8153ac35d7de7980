/// Snapshot of an established session, handed to a single dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionTicket {
    /// Value for the `B1SESSION` header. `None` when login returned no
    /// `SessionId` and the cookie store is expected to carry the session.
    pub token: Option<String>,
    pub generation: u64,
}

/// Cached Service Layer session.
///
/// The established flag, token and generation change together through
/// `establish`/`invalidate`, so a reader holding the lock never sees a
/// token without its flag or the reverse.
#[derive(Debug, Default)]
pub(crate) struct Session {
    token: Option<String>,
    established: bool,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current ticket, if a login has completed and not been invalidated.
    pub fn ticket(&self) -> Option<SessionTicket> {
        self.established.then(|| SessionTicket {
            token: self.token.clone(),
            generation: self.generation,
        })
    }

    /// Record a successful login and return the ticket for it.
    pub fn establish(&mut self, token: Option<String>) -> SessionTicket {
        self.generation += 1;
        self.token = token;
        self.established = true;
        SessionTicket {
            token: self.token.clone(),
            generation: self.generation,
        }
    }

    /// Clear the session the given ticket was issued for.
    ///
    /// Returns false if that session was already replaced or cleared, in which
    /// case the current state is left alone.
    pub fn invalidate(&mut self, generation: u64) -> bool {
        if !self.established || self.generation != generation {
            return false;
        }
        self.token = None;
        self.established = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_not_established() {
        let session = Session::new();
        assert_eq!(session.ticket(), None);
    }

    #[test]
    fn test_establish_and_ticket() {
        let mut session = Session::new();
        let ticket = session.establish(Some("ABC123".to_string()));
        assert_eq!(ticket.token.as_deref(), Some("ABC123"));
        assert_eq!(session.ticket(), Some(ticket));
    }

    #[test]
    fn test_establish_without_token_still_established() {
        let mut session = Session::new();
        let ticket = session.establish(None);
        assert!(session.ticket().is_some());
        assert_eq!(ticket.token, None);
    }

    #[test]
    fn test_invalidate_current_generation() {
        let mut session = Session::new();
        let ticket = session.establish(Some("A".to_string()));
        assert!(session.invalidate(ticket.generation));
        assert_eq!(session.ticket(), None);
        // Second invalidation of the same session is a no-op
        assert!(!session.invalidate(ticket.generation));
    }

    #[test]
    fn test_stale_invalidate_keeps_newer_session() {
        let mut session = Session::new();
        let old = session.establish(Some("A".to_string()));
        assert!(session.invalidate(old.generation));
        let new = session.establish(Some("B".to_string()));
        assert_ne!(old.generation, new.generation);

        // A late 401 from a request that used the old session
        assert!(!session.invalidate(old.generation));
        assert_eq!(session.ticket(), Some(new));
    }
}
