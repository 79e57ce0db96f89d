pub mod rpc;

pub use rpc::{
    decode_fault, AuthenticateResult, RpcError, RpcErrorDetail, RpcRequest, RpcResponse,
    SessionCredentials,
};
