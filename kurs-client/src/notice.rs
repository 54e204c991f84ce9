use futures::channel::mpsc::UnboundedSender;

/// A message for the user, shown globally by whoever listens
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Notices(Option<UnboundedSender<Notice>>);

impl Notices {
    pub(crate) fn new(sender: UnboundedSender<Notice>) -> Notices {
        Notices(Some(sender))
    }

    pub(crate) fn success(&self, msg: &str) {
        self.send(Notice::Success(msg.to_string()));
    }

    pub(crate) fn error(&self, err: &crate::api::Error) {
        self.send(Notice::Error(err.to_string()));
    }

    fn send(&self, n: Notice) {
        if let Some(sender) = &self.0 {
            if sender.unbounded_send(n).is_err() {
                tracing::debug!("notice listener is gone");
            }
        }
    }
}
