use crate::config::RelayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub body: String,
    pub kind: MessageKind,
}

impl InboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            kind: MessageKind::Text,
        }
    }

    pub fn notice(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            kind: MessageKind::Notice,
        }
    }

    /// Commands (bodies starting with the command prefix) are left to other
    /// handlers; notices only count when the config opts in.
    pub fn should_handle(&self, config: &RelayConfig) -> bool {
        if !config.command_prefix.is_empty() && self.body.starts_with(&config.command_prefix) {
            return false;
        }
        match self.kind {
            MessageKind::Text => true,
            MessageKind::Notice => config.respond_to_notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_ignored() {
        let config = RelayConfig::default();
        assert!(!InboundMessage::text("!ping https://youtu.be/abc").should_handle(&config));
        assert!(InboundMessage::text("see https://youtu.be/abc").should_handle(&config));
    }

    #[test]
    fn notices_need_opt_in() {
        let mut config = RelayConfig::default();
        let notice = InboundMessage::notice("https://youtu.be/abc");
        assert!(!notice.should_handle(&config));
        config.respond_to_notice = true;
        assert!(notice.should_handle(&config));
    }

    #[test]
    fn empty_prefix_disables_command_filtering() {
        let config = RelayConfig {
            command_prefix: String::new(),
            ..RelayConfig::default()
        };
        assert!(InboundMessage::text("!https://youtu.be/abc").should_handle(&config));
    }
}
