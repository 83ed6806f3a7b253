pub mod message;
pub mod telegram;

pub use message::MessageFormatter;
pub use telegram::TelegramNotifier;
