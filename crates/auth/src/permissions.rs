use serde::Serialize;

/// Every operation reachable through the platform, as seen by the guard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RegisterUser,
    Authenticate,
    WhoAmI,
    CreateNgo,
    ApproveNgo,
    RejectNgo,
    ListAllNgos,
    GetNgo,
    ListOwnNgos,
    ListApprovedNgos,
    CreateDonation,
    ListOwnDonations,
    ViewStatistics,
    Health,
}

/// Coarse access class of an action, for diagnostics and documentation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Reachable without a session.
    Public,
    /// Any authenticated role; the operation scopes itself to the caller.
    SelfService,
    AdminOnly,
    NgoOwnerOrAdmin,
    DonorOnly,
}

impl Action {
    pub const ALL: [Action; 14] = [
        Action::RegisterUser,
        Action::Authenticate,
        Action::WhoAmI,
        Action::CreateNgo,
        Action::ApproveNgo,
        Action::RejectNgo,
        Action::ListAllNgos,
        Action::GetNgo,
        Action::ListOwnNgos,
        Action::ListApprovedNgos,
        Action::CreateDonation,
        Action::ListOwnDonations,
        Action::ViewStatistics,
        Action::Health,
    ];

    pub fn access(&self) -> Access {
        match self {
            Action::RegisterUser
            | Action::Authenticate
            | Action::ListApprovedNgos
            | Action::Health => Access::Public,
            Action::WhoAmI | Action::ListOwnNgos | Action::ViewStatistics => Access::SelfService,
            Action::ApproveNgo | Action::RejectNgo | Action::ListAllNgos | Action::GetNgo => {
                Access::AdminOnly
            }
            Action::CreateNgo => Access::NgoOwnerOrAdmin,
            Action::CreateDonation | Action::ListOwnDonations => Access::DonorOnly,
        }
    }

    pub fn is_public(&self) -> bool {
        self.access() == Access::Public
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::RegisterUser => "auth.register",
            Action::Authenticate => "auth.login",
            Action::WhoAmI => "auth.whoami",
            Action::CreateNgo => "ngo.create",
            Action::ApproveNgo => "ngo.approve",
            Action::RejectNgo => "ngo.reject",
            Action::ListAllNgos => "ngo.list_all",
            Action::GetNgo => "ngo.get",
            Action::ListOwnNgos => "ngo.list_mine",
            Action::ListApprovedNgos => "ngo.list_approved",
            Action::CreateDonation => "donation.create",
            Action::ListOwnDonations => "donation.list_mine",
            Action::ViewStatistics => "stats.read",
            Action::Health => "system.health",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
