pub mod category;
pub mod channel;

pub use category::Category;
pub use channel::ChannelPage;
