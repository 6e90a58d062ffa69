//! Request and response bodies exchanged with the backend services.

pub mod request;
pub mod response;

pub use request::{
    ChatRequest, CommentRequest, LoginRequest, PostRequest, SendCodeRequest, SignupRequest,
    VerifyCodeRequest,
};
pub use response::{
    AuthUserResponse, Category, ChatResponse, Comment, Post, SearchHit, SearchResults, Tag,
    UserProfile,
};
