use bitcode::{Decode, Encode};
use rpcseam_service::RpcMessage;

#[derive(Encode, Decode, PartialEq, Debug, Clone, Default)]
pub struct GetUserRequest {
    pub id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GetUserRequestPartial {
    pub id: Option<u32>,
}

impl RpcMessage for GetUserRequest {
    const TYPE_NAME: &'static str = "example.v1.GetUserRequest";
    type Partial = GetUserRequestPartial;

    fn complete(partial: Self::Partial) -> Self {
        Self {
            id: partial.id.unwrap_or_default(),
        }
    }
}

#[derive(Encode, Decode, PartialEq, Debug, Clone, Default)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
}

/// A `User` with any subset of its fields set.
#[derive(Debug, Clone, Default)]
pub struct UserPartial {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl RpcMessage for User {
    const TYPE_NAME: &'static str = "example.v1.User";
    type Partial = UserPartial;

    fn complete(partial: Self::Partial) -> Self {
        Self {
            id: partial.id.unwrap_or_default(),
            name: partial.name.unwrap_or_default(),
            email: partial.email.unwrap_or_default(),
        }
    }
}

#[derive(Encode, Decode, PartialEq, Debug, Clone, Default)]
pub struct ListUsersRequest {
    /// Zero lists every user.
    pub limit: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ListUsersRequestPartial {
    pub limit: Option<u32>,
}

impl RpcMessage for ListUsersRequest {
    const TYPE_NAME: &'static str = "example.v1.ListUsersRequest";
    type Partial = ListUsersRequestPartial;

    fn complete(partial: Self::Partial) -> Self {
        Self {
            limit: partial.limit.unwrap_or_default(),
        }
    }
}

#[derive(Encode, Decode, PartialEq, Debug, Clone, Default)]
pub struct UserCount {
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct UserCountPartial {
    pub count: Option<u32>,
}

impl RpcMessage for UserCount {
    const TYPE_NAME: &'static str = "example.v1.UserCount";
    type Partial = UserCountPartial;

    fn complete(partial: Self::Partial) -> Self {
        Self {
            count: partial.count.unwrap_or_default(),
        }
    }
}

#[derive(Encode, Decode, PartialEq, Debug, Clone, Default)]
pub struct ChatMessage {
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatMessagePartial {
    pub text: Option<String>,
}

impl RpcMessage for ChatMessage {
    const TYPE_NAME: &'static str = "example.v1.ChatMessage";
    type Partial = ChatMessagePartial;

    fn complete(partial: Self::Partial) -> Self {
        Self {
            text: partial.text.unwrap_or_default(),
        }
    }
}
