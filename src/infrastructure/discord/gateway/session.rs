/// Resume bookkeeping carried across sockets of one login.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    session_id: Option<String>,
    resume_gateway_url: Option<String>,
    sequence: Option<u64>,
    /// Set after a heartbeat is sent, cleared by its ACK.
    awaiting_ack: bool,
}

impl SessionInfo {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_id: None,
            resume_gateway_url: None,
            sequence: None,
            awaiting_ack: false,
        }
    }

    pub fn set_session(&mut self, session_id: String, resume_url: Option<String>) {
        self.session_id = Some(session_id);
        self.resume_gateway_url = resume_url;
    }

    pub const fn update_sequence(&mut self, sequence: Option<u64>) {
        if let Some(seq) = sequence {
            self.sequence = Some(seq);
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn resume_gateway_url(&self) -> Option<&str> {
        self.resume_gateway_url.as_deref()
    }

    #[must_use]
    pub const fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    #[must_use]
    pub const fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// Records a heartbeat. Returns false if the previous one was never acknowledged.
    pub const fn heartbeat_sent(&mut self) -> bool {
        let acknowledged = !self.awaiting_ack;
        self.awaiting_ack = true;
        acknowledged
    }

    pub const fn heartbeat_acked(&mut self) {
        self.awaiting_ack = false;
    }

    /// Forgets the session so the next socket identifies from scratch.
    pub fn clear(&mut self) {
        self.session_id = None;
        self.resume_gateway_url = None;
        self.sequence = None;
        self.awaiting_ack = false;
    }

    /// Per-socket state reset, keeping what a resume needs.
    pub const fn reset_socket(&mut self) {
        self.awaiting_ack = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_requires_session_and_sequence() {
        let mut session = SessionInfo::new();
        assert!(!session.can_resume());

        session.set_session("abc".into(), Some("wss://resume.url".into()));
        assert!(!session.can_resume());

        session.update_sequence(None);
        assert!(!session.can_resume());

        session.update_sequence(Some(42));
        assert!(session.can_resume());
        assert_eq!(session.resume_gateway_url(), Some("wss://resume.url"));
    }

    #[test]
    fn test_missed_ack_detection() {
        let mut session = SessionInfo::new();
        assert!(session.heartbeat_sent());
        assert!(!session.heartbeat_sent());

        session.heartbeat_acked();
        assert!(session.heartbeat_sent());
    }

    #[test]
    fn test_clear_forgets_resume_state() {
        let mut session = SessionInfo::new();
        session.set_session("abc".into(), None);
        session.update_sequence(Some(1));

        session.clear();
        assert!(session.session_id().is_none());
        assert!(session.sequence().is_none());
    }
}
