/// End-to-end tests through the engine, the store and the JSON-RPC front-end
mod common;
mod favorites;
mod rpc;
mod workflow;
