//! Request and response bodies that have no core counterpart.

use goalshare_core::users::User;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct RequestCodeRequest {
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub user: User,
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct InviteMemberRequest {
    pub email: String,
}
