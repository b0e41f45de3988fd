pub mod channels;
pub mod commands;
pub mod delivery;

pub use channels::{ChannelPost, ChannelReader, MtprotoChannelReader};
pub use commands::{handle_command, Caller, Command};
pub use delivery::{Courier, Messenger, TelegramMessenger};
