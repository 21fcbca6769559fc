//! Login, registration, and the persisted session.

use crate::backend::Backend;
use crate::chat::notice;
use crate::error::{Error, Result};
use crate::observability::{AUTH_FAILURES, AUTH_LOGINS, AUTH_VALIDATION_FAILURES};
use crate::render::Renderer;
use crate::storage::{self, KeyValueStore};
use crate::types::{AuthResponse, LoginRequest, RegisterRequest, UserSession};

/// Minimum length of a new password, in UTF-16 code units.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Which form the login view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthForm {
    #[default]
    Login,
    Register,
}

impl AuthForm {
    /// The other form.
    pub fn toggled(self) -> Self {
        match self {
            AuthForm::Login => AuthForm::Register,
            AuthForm::Register => AuthForm::Login,
        }
    }
}

/// The registration form as the user filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub employee_id: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Checks the passwords locally and builds the request body.
    ///
    /// The confirmation is checked before the length.
    pub fn validate(&self) -> Result<RegisterRequest> {
        if self.password != self.confirm_password {
            return Err(Error::validation("Passwords do not match"));
        }
        // Web browsers measure the password in UTF-16 code units.
        if self.password.encode_utf16().count() < MIN_PASSWORD_CHARS {
            return Err(Error::validation(format!(
                "Password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }
        Ok(RegisterRequest {
            name: self.name.clone(),
            employee_id: self.employee_id.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// Drives the login view.
pub struct AuthController<B: Backend> {
    backend: B,
    form: AuthForm,
}

impl<B: Backend> AuthController<B> {
    /// Creates a controller showing the login form.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            form: AuthForm::Login,
        }
    }

    /// Reads the persisted session.  `None` means the login view should be shown.
    pub fn bootstrap(store: &mut dyn KeyValueStore) -> Result<Option<UserSession>> {
        storage::load_session(store)
    }

    /// The form currently shown.
    pub fn form(&self) -> AuthForm {
        self.form
    }

    /// Switches between the login and the registration form.
    pub fn toggle_forms(&mut self, renderer: &mut dyn Renderer) -> AuthForm {
        self.form = self.form.toggled();
        renderer.clear_form_error();
        renderer.show_form(self.form);
        self.form
    }

    /// Submits the login form.
    ///
    /// Failures are shown inline and returned; the form stays usable.
    pub async fn submit_login(
        &mut self,
        email: &str,
        password: &str,
        store: &mut dyn KeyValueStore,
        renderer: &mut dyn Renderer,
    ) -> Result<UserSession> {
        renderer.clear_form_error();
        let request = LoginRequest::new(email, password);
        match self.backend.login(&request).await {
            Ok(response) => self.establish(response, store, renderer),
            Err(err) => Err(self.reject(err, "Login failed", renderer)),
        }
    }

    /// Submits the registration form.
    ///
    /// Password mismatch and short passwords are rejected without contacting the backend.
    pub async fn submit_registration(
        &mut self,
        form: &RegistrationForm,
        store: &mut dyn KeyValueStore,
        renderer: &mut dyn Renderer,
    ) -> Result<UserSession> {
        renderer.clear_form_error();
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => {
                AUTH_VALIDATION_FAILURES.click();
                renderer.show_form_error(&err.to_string());
                return Err(err);
            }
        };
        match self.backend.register(&request).await {
            Ok(response) => self.establish(response, store, renderer),
            Err(err) => Err(self.reject(err, "Registration failed", renderer)),
        }
    }

    fn establish(
        &self,
        response: AuthResponse,
        store: &mut dyn KeyValueStore,
        renderer: &mut dyn Renderer,
    ) -> Result<UserSession> {
        let session = UserSession::from(response);
        if let Err(err) = storage::save_session(store, &session) {
            renderer.show_form_error(&format!("Error: {err}"));
            return Err(err);
        }
        AUTH_LOGINS.click();
        tracing::debug!(email = %session.user.email, "signed in");
        Ok(session)
    }

    fn reject(&self, err: Error, fallback: &str, renderer: &mut dyn Renderer) -> Error {
        AUTH_FAILURES.click();
        renderer.show_form_error(&notice::form_failure(&err, fallback, &self.backend.location()));
        err
    }
}
