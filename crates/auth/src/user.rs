//! User resource and the forms that create or edit one.
//!
//! Accounts live in the backend; this module only shapes what the client
//! sends and receives, and rejects bad input before any request is made.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use hazellab_core::{DomainResult, Entity, FieldErrors, UserId, contains_ci};
use hazellab_validation::field::{EmailField, FieldRule, RutField, check_field, require};
use hazellab_validation::{age, email, password, rut};

use crate::token::LoginRequest;
use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User Status
// ─────────────────────────────────────────────────────────────────────────────

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum UserStatus {
    /// Can log in and buy.
    #[default]
    #[serde(rename = "activo")]
    Activo,
    /// Disabled by an administrator.
    #[serde(rename = "inactivo")]
    Inactivo,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown user status '{0}'")]
pub struct UnknownStatus(pub String);

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Activo => "activo",
            UserStatus::Inactivo => "inactivo",
        }
    }
}

impl FromStr for UserStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "activo" => Ok(UserStatus::Activo),
            "inactivo" => Ok(UserStatus::Inactivo),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::parse::<UserStatus>) {
            Some(Ok(status)) => status,
            Some(Err(err)) => {
                tracing::warn!(%err, "treating user as active");
                UserStatus::default()
            }
            None => UserStatus::default(),
        })
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User resource
// ─────────────────────────────────────────────────────────────────────────────

/// A user as the backend returns it.
///
/// Free-text fields are optional: older accounts and admin-created ones are
/// often missing address data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub comuna: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<NaiveDate>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    /// "Nombre Apellidos", falling back to the email.
    pub fn display_name(&self) -> String {
        let name = [self.username.as_deref(), self.apellidos.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() { self.email.clone() } else { name }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Activo
    }

}

/// Reference to a user inside other resources (`{"id": 5}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

/// Raw input of the registration form and the admin "new user" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub rut: String,
    pub username: String,
    pub apellidos: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub region: String,
    pub comuna: String,
    pub direccion: String,
    pub fecha_nacimiento: Option<String>,
}

/// `POST /usuarios` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub apellidos: String,
    pub email: String,
    pub rut: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    pub region: String,
    pub comuna: String,
    pub direccion: String,
    pub fecha_nacimiento: Option<NaiveDate>,
}

impl UserForm {
    /// Self-service sign-up: always a customer, always active.
    pub fn validate_registration(&self, today: NaiveDate) -> DomainResult<NewUser> {
        self.common_checks(today).into_result()?;
        Ok(self.payload(Role::Cliente, UserStatus::Activo))
    }

    /// Back-office creation: every profile field is mandatory and the
    /// role/status come from the form.
    pub fn validate_admin(&self, today: NaiveDate) -> DomainResult<NewUser> {
        let mut errors = self.common_checks(today);
        require(&mut errors, "username", &self.username, "username is required");
        require(&mut errors, "apellidos", &self.apellidos, "apellidos is required");
        require(&mut errors, "direccion", &self.direccion, "direccion is required");
        errors.into_result()?;
        Ok(self.payload(self.role.unwrap_or_default(), self.status.unwrap_or_default()))
    }

    fn common_checks(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_field::<RutField>(&mut errors, &self.rut);
        check_field::<EmailField>(&mut errors, &self.email);
        errors.check(
            "password",
            password::validate_new(&self.password, &self.password_confirmation),
        );
        require(&mut errors, "region", &self.region, "region is required");
        require(&mut errors, "comuna", &self.comuna, "comuna is required");
        errors.check(
            "fechaNacimiento",
            age::validate_birthdate(self.fecha_nacimiento.as_deref(), today),
        );
        errors
    }

    fn payload(&self, role: Role, status: UserStatus) -> NewUser {
        NewUser {
            username: self.username.trim().to_string(),
            apellidos: self.apellidos.trim().to_string(),
            email: EmailField::format(&self.email),
            rut: RutField::format(&self.rut),
            password: self.password.clone(),
            role,
            status,
            region: self.region.trim().to_string(),
            comuna: self.comuna.trim().to_string(),
            direccion: self.direccion.trim().to_string(),
            fecha_nacimiento: self
                .fecha_nacimiento
                .as_deref()
                .and_then(|raw| age::parse_birthdate(raw).ok()),
        }
    }
}

/// `PUT /usuarios/{id}` body.
///
/// A `None` password keeps the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellidos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub rut: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comuna: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<NaiveDate>,
}

impl UserUpdate {
    /// Validate and normalize (canonical RUT, lowercased email, blank
    /// password dropped).
    pub fn validate(mut self) -> DomainResult<UserUpdate> {
        let mut errors = FieldErrors::new();
        check_field::<RutField>(&mut errors, &self.rut);
        if let Some(addr) = self.email.as_deref() {
            errors.check("email", email::validate_shape(addr));
        }
        errors.check("password", password::validate_change(self.password.as_deref()));
        errors.into_result()?;

        self.rut = rut::format(&self.rut);
        self.email = self.email.map(|e| email::normalize(&e));
        self.password = self.password.filter(|p| !p.is_empty());
        Ok(self)
    }
}

/// Raw input of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<LoginRequest> {
        let mut errors = FieldErrors::new();
        errors.check("email", email::validate(&self.email));
        errors.check("password", password::validate_login(&self.password));
        errors.into_result()?;

        Ok(LoginRequest {
            email: email::normalize(&self.email),
            password: self.password.trim().to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing filters
// ─────────────────────────────────────────────────────────────────────────────

/// Client-side filter of the admin user listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Free text over name, surname, email, role, RUT, region and comuna.
    pub search: String,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text = needle.is_empty()
            || [
                user.username.as_deref(),
                Some(user.email.as_str()),
                Some(user.role.as_str()),
                user.rut.as_deref(),
                user.region.as_deref(),
                user.comuna.as_deref(),
                user.apellidos.as_deref(),
            ]
            .into_iter()
            .any(|field| contains_ci(field, &needle));

        text && self.role.is_none_or(|r| r == user.role)
            && self.status.is_none_or(|s| s == user.status)
    }

    pub fn apply(&self, users: &[User]) -> Vec<User> {
        users.iter().filter(|u| self.matches(u)).cloned().collect()
    }
}

/// Server-side user search (`GET /usuarios/buscar/avanzada`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub region: Option<String>,
}

impl UserSearch {
    /// Query parameters; unset and blank filters are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        let mut push = |key, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                q.push((key, v));
            }
        };
        push("username", self.username.clone());
        push("email", self.email.clone());
        push("rol", self.role.map(|r| r.as_str().to_string()));
        push("estado", self.status.map(|s| s.as_str().to_string()));
        push("region", self.region.clone());
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn valid_form() -> UserForm {
        UserForm {
            rut: "12345678-5".to_string(),
            username: "Ana".to_string(),
            apellidos: "Pérez Soto".to_string(),
            email: " Ana.Perez@Duoc.cl ".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
            role: None,
            status: None,
            region: "Metropolitana".to_string(),
            comuna: "Santiago".to_string(),
            direccion: "Av. Siempre Viva 123".to_string(),
            fecha_nacimiento: Some("2000-01-01".to_string()),
        }
    }

    fn user(id: i64, username: &str, role: Role, status: UserStatus) -> User {
        User {
            id: UserId::new(id),
            username: Some(username.to_string()),
            apellidos: None,
            email: format!("{}@gmail.com", username.to_lowercase()),
            rut: None,
            role,
            status,
            region: Some("Valparaíso".to_string()),
            comuna: None,
            direccion: None,
            fecha_nacimiento: None,
        }
    }

    #[test]
    fn registration_produces_customer_payload() {
        let payload = valid_form().validate_registration(today()).unwrap();
        assert_eq!(payload.role, Role::Cliente);
        assert_eq!(payload.status, UserStatus::Activo);
        assert_eq!(payload.rut, "12.345.678-5");
        assert_eq!(payload.email, "ana.perez@duoc.cl");
        assert_eq!(payload.fecha_nacimiento, NaiveDate::from_ymd_opt(2000, 1, 1));
    }

    #[test]
    fn registration_ignores_requested_role() {
        let mut form = valid_form();
        form.role = Some(Role::SuperAdmin);
        assert_eq!(form.validate_registration(today()).unwrap().role, Role::Cliente);
    }

    #[test]
    fn registration_reports_every_bad_field() {
        let form = UserForm {
            rut: "12345678-4".to_string(),
            email: "ana@hotmail.com".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret2".to_string(),
            fecha_nacimiento: Some("2010-05-05".to_string()),
            ..UserForm::default()
        };
        let err = form.validate_registration(today()).unwrap_err();
        let errors = err.fields().unwrap();
        for field in ["rut", "email", "password", "region", "comuna", "fechaNacimiento"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("username"));
    }

    #[test]
    fn blank_birthdate_is_allowed() {
        let mut form = valid_form();
        form.fecha_nacimiento = None;
        assert!(form.validate_registration(today()).is_ok());
    }

    #[test]
    fn admin_form_requires_profile_fields_and_keeps_role() {
        let mut form = valid_form();
        form.direccion.clear();
        let err = form.validate_admin(today()).unwrap_err();
        let errors = err.fields().unwrap();
        assert!(errors.contains("direccion"));

        let mut form = valid_form();
        form.role = Some(Role::Vendedor);
        form.status = Some(UserStatus::Inactivo);
        let payload = form.validate_admin(today()).unwrap();
        assert_eq!(payload.role, Role::Vendedor);
        assert_eq!(payload.status, UserStatus::Inactivo);
    }

    #[test]
    fn new_user_serializes_backend_field_names() {
        let payload = valid_form().validate_registration(today()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["fechaNacimiento"], "2000-01-01");
        assert_eq!(json["role"], "cliente");
        assert_eq!(json["status"], "activo");
    }

    #[test]
    fn unknown_or_missing_status_reads_as_active() {
        let users: Vec<User> = serde_json::from_value(serde_json::json!([
            {"id": 1, "email": "a@duoc.cl", "status": "suspendido"},
            {"id": 2, "email": "b@duoc.cl", "status": null},
            {"id": 3, "email": "c@duoc.cl", "status": "INACTIVO"},
        ]))
        .unwrap();
        assert_eq!(users[0].status, UserStatus::Activo);
        assert_eq!(users[1].status, UserStatus::Activo);
        assert_eq!(users[2].status, UserStatus::Inactivo);
    }

    #[test]
    fn update_normalizes_and_drops_blank_password() {
        let update = UserUpdate {
            rut: "123456785".to_string(),
            email: Some("ADMIN@HazelLab.cl".to_string()),
            password: Some(String::new()),
            ..UserUpdate::default()
        };
        let update = update.validate().unwrap();
        assert_eq!(update.rut, "12.345.678-5");
        assert_eq!(update.email.as_deref(), Some("admin@hazellab.cl"));
        assert_eq!(update.password, None);

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn update_rejects_short_password_and_bad_rut() {
        let update = UserUpdate {
            rut: "1-1".to_string(),
            password: Some("abc".to_string()),
            ..UserUpdate::default()
        };
        let err = update.validate().unwrap_err();
        let errors = err.fields().unwrap();
        assert!(errors.contains("rut"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn login_form_normalizes_email() {
        let req = LoginForm::new(" Ana@Gmail.com ", " pass ").validate().unwrap();
        assert_eq!(req.email, "ana@gmail.com");
        assert_eq!(req.password, "pass");
        assert!(LoginForm::new("", "abc").validate().is_err());
    }

    #[test]
    fn login_form_rejects_domains_outside_allow_list() {
        let err = LoginForm::new("ana@hotmail.com", "secret1").validate().unwrap_err();
        let errors = err.fields().unwrap();
        assert!(errors.contains("email"));
        assert!(!errors.contains("password"));
        assert!(LoginForm::new("ana@profesor.duoc.cl", "secret1").validate().is_ok());
    }

    #[test]
    fn deserializes_backend_user_with_nulls() {
        let raw = r#"{
            "id": 3, "username": "Ana", "apellidos": null, "email": "ana@duoc.cl",
            "rut": "12.345.678-5", "role": "ADMIN", "status": "Activo",
            "region": null, "comuna": null, "direccion": null, "fechaNacimiento": "1999-12-31"
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.role, Role::Administrador);
        assert!(user.is_active());
        assert!(user.direccion.is_none());
        assert_eq!(user.display_name(), "Ana");
        assert_eq!(user.fecha_nacimiento, NaiveDate::from_ymd_opt(1999, 12, 31));
    }

    #[test]
    fn filter_combines_text_role_and_status() {
        let users = vec![
            user(1, "Ana", Role::Cliente, UserStatus::Activo),
            user(2, "Bruno", Role::Vendedor, UserStatus::Activo),
            user(3, "Carla", Role::Cliente, UserStatus::Inactivo),
        ];

        let by_text = UserFilter {
            search: "  BRU ".to_string(),
            ..UserFilter::default()
        };
        assert_eq!(by_text.apply(&users).len(), 1);

        let by_role = UserFilter {
            role: Some(Role::Cliente),
            ..UserFilter::default()
        };
        assert_eq!(by_role.apply(&users).len(), 2);

        let inactive_clients = UserFilter {
            role: Some(Role::Cliente),
            status: Some(UserStatus::Inactivo),
            ..UserFilter::default()
        };
        let hits = inactive_clients.apply(&users);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, UserId::new(3));

        let by_region = UserFilter {
            search: "valpa".to_string(),
            ..UserFilter::default()
        };
        assert_eq!(by_region.apply(&users).len(), 3);
    }

    #[test]
    fn search_query_skips_blank_filters() {
        let search = UserSearch {
            username: Some(" ".to_string()),
            role: Some(Role::SuperAdmin),
            status: Some(UserStatus::Activo),
            ..UserSearch::default()
        };
        assert_eq!(
            search.to_query(),
            vec![
                ("rol", "super_admin".to_string()),
                ("estado", "activo".to_string())
            ]
        );
    }
}
