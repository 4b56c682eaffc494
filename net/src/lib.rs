mod datagram;
mod http;
mod receiver;

pub use datagram::DatagramReceiver;
pub use http::HttpReceiver;
pub use receiver::Receiver;
