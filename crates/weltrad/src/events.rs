use crate::command::Command;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    ConfigReload,
}

impl From<Command> for AppEvent {
    fn from(command: Command) -> Self {
        AppEvent::Command(command)
    }
}
