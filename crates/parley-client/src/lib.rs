pub mod chat;
pub mod error;
pub mod poll;
pub mod session;
pub mod transcript;

pub use chat::ChatClient;
pub use error::ClientError;
pub use poll::{HttpMessageSource, MessageSource, PollHandle, Poller, RenderedFeed};
pub use session::{Session, SessionSnapshot};
pub use transcript::Transcript;
