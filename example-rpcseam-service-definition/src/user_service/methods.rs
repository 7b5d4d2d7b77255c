use super::messages::{ChatMessage, GetUserRequest, ListUsersRequest, User, UserCount};
use crate::codec::{decode, encode};
use rpcseam_service::{RpcMethod, rpc_method_id};
use std::io;

/// Looks up one user by id.
pub struct GetUser;

impl RpcMethod for GetUser {
    const SERVICE: &'static str = "example.v1.UserService";
    const NAME: &'static str = "GetUser";
    const METHOD_ID: u64 = rpc_method_id!("/example.v1.UserService/GetUser");

    type Input = GetUserRequest;
    type Output = User;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        encode(&input)
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        decode(bytes)
    }

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error> {
        encode(&output)
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        decode(bytes)
    }
}

/// Streams users, up to `limit`.
pub struct ListUsers;

impl RpcMethod for ListUsers {
    const SERVICE: &'static str = "example.v1.UserService";
    const NAME: &'static str = "ListUsers";
    const METHOD_ID: u64 = rpc_method_id!("/example.v1.UserService/ListUsers");

    type Input = ListUsersRequest;
    type Output = User;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        encode(&input)
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        decode(bytes)
    }

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error> {
        encode(&output)
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        decode(bytes)
    }
}

/// Counts the users the client streams in.
pub struct CountUsers;

impl RpcMethod for CountUsers {
    const SERVICE: &'static str = "example.v1.UserService";
    const NAME: &'static str = "CountUsers";
    const METHOD_ID: u64 = rpc_method_id!("/example.v1.UserService/CountUsers");

    type Input = User;
    type Output = UserCount;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        encode(&input)
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        decode(bytes)
    }

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error> {
        encode(&output)
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        decode(bytes)
    }
}

/// Answers each chat message as it arrives.
pub struct Chat;

impl RpcMethod for Chat {
    const SERVICE: &'static str = "example.v1.UserService";
    const NAME: &'static str = "Chat";
    const METHOD_ID: u64 = rpc_method_id!("/example.v1.UserService/Chat");

    type Input = ChatMessage;
    type Output = ChatMessage;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        encode(&input)
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        decode(bytes)
    }

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error> {
        encode(&output)
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        decode(bytes)
    }
}
