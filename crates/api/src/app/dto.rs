use axum::http::StatusCode;
use serde::Deserialize;

use fineease_auth::{Role, Session, User};
use fineease_core::NgoId;
use fineease_donations::{DonationRecord, NewDonation};
use fineease_registry::{NewNgo, NgoRecord};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Field aliases accept the camelCase names older clients send.
#[derive(Debug, Deserialize)]
pub struct CreateNgoRequest {
    pub name: String,
    #[serde(alias = "registrationNumber")]
    pub registration_number: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "contactEmail")]
    pub contact_email: Option<String>,
    #[serde(default, alias = "contactPhone")]
    pub contact_phone: Option<String>,
}

impl From<CreateNgoRequest> for NewNgo {
    fn from(r: CreateNgoRequest) -> Self {
        NewNgo {
            name: r.name,
            registration_number: r.registration_number,
            description: r.description,
            address: r.address,
            contact_email: r.contact_email,
            contact_phone: r.contact_phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    #[serde(alias = "ngo", alias = "ngoId")]
    pub ngo_id: String,
    pub amount: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateDonationRequest {
    pub fn into_new_donation(self) -> Result<NewDonation, axum::response::Response> {
        Ok(NewDonation {
            ngo: parse_ngo_id(&self.ngo_id)?,
            amount: self.amount,
            message: self.message,
        })
    }
}

pub fn parse_ngo_id(raw: &str) -> Result<NgoId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ngo id"))
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "name": user.name,
        "email": user.identity.as_str(),
        "role": user.role.as_str(),
        "created_at": user.created_at,
    })
}

pub fn session_to_json(session: &Session) -> serde_json::Value {
    serde_json::json!({
        "message": "Login successful",
        "token": session.token,
        "expires_at": session.expires_at,
        "user": user_to_json(&session.user),
    })
}

pub fn ngo_to_json(ngo: &NgoRecord) -> serde_json::Value {
    serde_json::json!({
        "id": ngo.id.to_string(),
        "owner_id": ngo.owner.to_string(),
        "name": ngo.name,
        "registration_number": ngo.registration_number,
        "description": ngo.description,
        "address": ngo.address,
        "contact_email": ngo.contact_email,
        "contact_phone": ngo.contact_phone,
        "status": ngo.status.as_str(),
        "created_at": ngo.created_at,
        "updated_at": ngo.updated_at,
    })
}

pub fn donation_to_json(d: &DonationRecord) -> serde_json::Value {
    serde_json::json!({
        "id": d.id.to_string(),
        "donor_id": d.donor.to_string(),
        "ngo_id": d.ngo.to_string(),
        "amount": d.amount.value(),
        "message": d.message,
        "created_at": d.created_at,
    })
}

pub fn ngos_to_json(items: &[NgoRecord]) -> serde_json::Value {
    serde_json::json!({ "items": items.iter().map(ngo_to_json).collect::<Vec<_>>() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_ngo_fields_are_accepted() {
        let req: CreateNgoRequest = serde_json::from_value(serde_json::json!({
            "name": "Helping Hands",
            "registrationNumber": "REG-1",
            "contactEmail": "info@hh.org",
            "status": "approved",
        }))
        .unwrap();
        let fields = NewNgo::from(req);
        assert_eq!(fields.registration_number, "REG-1");
        assert_eq!(fields.contact_email.as_deref(), Some("info@hh.org"));
    }

    #[test]
    fn donation_accepts_ngo_alias_and_rejects_bad_ids() {
        let id = NgoId::new();
        let req: CreateDonationRequest =
            serde_json::from_value(serde_json::json!({ "ngo": id.to_string(), "amount": 50 })).unwrap();
        assert_eq!(req.into_new_donation().ok().map(|d| d.ngo), Some(id));

        let bad = CreateDonationRequest {
            ngo_id: "not-a-uuid".to_string(),
            amount: 1,
            message: None,
        };
        match bad.into_new_donation() {
            Err(res) => assert_eq!(res.status(), StatusCode::BAD_REQUEST),
            Ok(d) => panic!("expected invalid id, got {d:?}"),
        }
    }

    #[test]
    fn register_role_accepts_legacy_ngo_name() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "o@x.org",
            "password": "pw",
            "role": "ngo",
        }))
        .unwrap();
        assert_eq!(req.role, Some(Role::NgoOwner));
    }
}
