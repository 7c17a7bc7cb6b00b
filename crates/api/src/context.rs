use fineease_auth::Caller;

/// Caller context for a request, inserted by the auth middleware.
///
/// Present on every route; anonymous when no bearer token was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    caller: Caller,
}

impl CallerContext {
    pub fn new(caller: Caller) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }
}
