//! Permissions that only make sense over an HTTP request.

use std::borrow::Cow;

use async_trait::async_trait;

use permkit_auth::Check;
use permkit_core::{CheckResult, Deps};

use crate::context::RequestContext;

/// Grants when the named header is present, whatever its value.
#[derive(Debug, Clone)]
pub struct HasHeader {
    header: Cow<'static, str>,
}

impl HasHeader {
    pub fn new(header: impl Into<Cow<'static, str>>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

#[async_trait]
impl Check<RequestContext> for HasHeader {
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("has_header[{}]", self.header))
    }

    async fn check(&self, ctx: &RequestContext, _deps: &Deps) -> CheckResult {
        Ok(ctx.headers().contains_key(self.header.as_ref()).into())
    }
}
