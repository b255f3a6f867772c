use std::path::PathBuf;

use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorResult {
    /// `copy` is set when the editor wrote its result next to the original
    /// instead of saving in place.
    Confirmed { copy: Option<PathBuf> },
    /// `copy` is an edited file the editor already wrote before the user backed out.
    Discarded { copy: Option<PathBuf> },
}

#[derive(Debug)]
pub struct EditorResponder {
    tx: oneshot::Sender<EditorResult>,
}

impl EditorResponder {
    pub fn confirm_in_place(self) {
        self.send(EditorResult::Confirmed { copy: None });
    }

    pub fn confirm_copy(self, copy: impl Into<PathBuf>) {
        self.send(EditorResult::Confirmed {
            copy: Some(copy.into()),
        });
    }

    pub fn discard(self) {
        self.send(EditorResult::Discarded { copy: None });
    }

    pub fn discard_with_copy(self, copy: impl Into<PathBuf>) {
        self.send(EditorResult::Discarded {
            copy: Some(copy.into()),
        });
    }

    fn send(self, result: EditorResult) {
        if self.tx.send(result).is_err() {
            tracing::debug!("editor result arrived after the workflow stopped listening");
        }
    }
}

pub(crate) struct EditorReply(oneshot::Receiver<EditorResult>);

impl EditorReply {
    pub(crate) async fn wait(self) -> EditorResult {
        self.0
            .await
            .unwrap_or(EditorResult::Discarded { copy: None })
    }
}

pub(crate) fn editor_channel() -> (EditorResponder, EditorReply) {
    let (tx, rx) = oneshot::channel();
    (EditorResponder { tx }, EditorReply(rx))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissCause {
    /// The surface's own close control.
    Explicit,
    /// Interactive dismissal such as a swipe-down.
    Interactive,
    /// The presenter dropped the signal without reporting.
    Dropped,
}

#[derive(Debug)]
pub struct DismissSignal {
    tx: oneshot::Sender<DismissCause>,
}

impl DismissSignal {
    pub fn dismissed(self, cause: DismissCause) {
        let _ = self.tx.send(cause);
    }
}

pub(crate) struct DismissReply(oneshot::Receiver<DismissCause>);

impl DismissReply {
    pub(crate) async fn wait(self) -> DismissCause {
        self.0.await.unwrap_or(DismissCause::Dropped)
    }
}

pub(crate) fn dismiss_channel() -> (DismissSignal, DismissReply) {
    let (tx, rx) = oneshot::channel();
    (DismissSignal { tx }, DismissReply(rx))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Add,
    Discard,
}

#[derive(Debug)]
pub struct ConfirmationResponder {
    tx: oneshot::Sender<ConfirmationChoice>,
}

impl ConfirmationResponder {
    pub fn choose(self, choice: ConfirmationChoice) {
        let _ = self.tx.send(choice);
    }
}

pub(crate) struct ConfirmationReply(oneshot::Receiver<ConfirmationChoice>);

impl ConfirmationReply {
    /// A dialog torn down without an answer counts as a discard.
    pub(crate) async fn wait(self) -> ConfirmationChoice {
        self.0.await.unwrap_or_else(|_| {
            tracing::warn!("confirmation dialog closed without a choice; discarding");
            ConfirmationChoice::Discard
        })
    }
}

pub(crate) fn confirmation_channel() -> (ConfirmationResponder, ConfirmationReply) {
    let (tx, rx) = oneshot::channel();
    (ConfirmationResponder { tx }, ConfirmationReply(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropped_responders_resolve_to_implicit_outcomes() {
        let (responder, reply) = editor_channel();
        drop(responder);
        assert_eq!(reply.wait().await, EditorResult::Discarded { copy: None });

        let (signal, reply) = dismiss_channel();
        drop(signal);
        assert_eq!(reply.wait().await, DismissCause::Dropped);

        let (responder, reply) = confirmation_channel();
        drop(responder);
        assert_eq!(reply.wait().await, ConfirmationChoice::Discard);
    }

    #[tokio::test]
    async fn explicit_answers_are_delivered() {
        let (responder, reply) = editor_channel();
        responder.confirm_copy("/tmp/edited.png");
        assert_eq!(
            reply.wait().await,
            EditorResult::Confirmed {
                copy: Some(PathBuf::from("/tmp/edited.png"))
            }
        );

        let (signal, reply) = dismiss_channel();
        signal.dismissed(DismissCause::Interactive);
        assert_eq!(reply.wait().await, DismissCause::Interactive);
    }
}
