use serde::Serialize;
use tera::Context;

use super::renderer::RenderError;
use crate::auth::{SessionUser, CSRF_FIELD};

/// Values every template can read regardless of the handler's data
#[derive(Debug, Clone, Serialize)]
pub struct Globals {
    pub csrf_token: String,
    pub csrf_field: &'static str,
    pub logged_in: bool,
    pub email: Option<String>,
}

impl Globals {
    pub fn new(csrf_token: impl Into<String>, user: Option<&SessionUser>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            csrf_field: CSRF_FIELD,
            logged_in: user.is_some(),
            email: user.map(|u| u.email.clone()),
        }
    }
}

/// Handler data with the globals layered on top. `data` must serialize to a map.
pub(crate) fn build_context<T: Serialize>(globals: &Globals, data: &T) -> Result<Context, RenderError> {
    let mut context = Context::from_serialize(data)?;
    context.extend(Context::from_serialize(globals)?);
    Ok(context)
}
