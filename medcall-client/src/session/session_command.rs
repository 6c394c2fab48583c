use crate::session::SessionError;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleAudio,
    ToggleVideo,
    SendChat(String),
    /// Leave and join again with the same local media.
    Retry,
    EndCall,
    Close,
}

/// UI-side handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionCommand>) {
        let (commands, rx) = mpsc::unbounded_channel();
        (Self { commands }, rx)
    }

    pub fn toggle_audio(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ToggleAudio)
    }

    pub fn toggle_video(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ToggleVideo)
    }

    pub fn send_chat(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::SendChat(text.into()))
    }

    pub fn retry(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Retry)
    }

    pub fn end_call(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::EndCall)
    }

    pub fn close(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Close)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::Ended)
    }
}
