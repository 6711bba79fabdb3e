use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactLinkQuery {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactLink {
    pub url: String,
}
