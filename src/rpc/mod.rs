/// JSON-RPC front-end
///
/// This module exposes the engine's operations as line-delimited JSON-RPC 2.0
/// over stdin/stdout, including parameter parsing and error shaping.

pub mod params;
pub mod protocol;
pub mod server;

// Re-export main types
pub use server::RpcServer;
