mod master_connection;
mod request;
mod resource_connection;

pub use master_connection::{MasterConnection, SOCKET_CONNECT_TOPIC, SOCKET_DISCONNECT_TOPIC};
pub use request::{RequestError, RequestHandle, RequestResult};
pub use resource_connection::ResourceConnection;
