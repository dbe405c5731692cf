//! Sign-in / sign-up screen with email code confirmation.

use std::fmt;

use super::{Screen, Store, ViewModel};
use crate::backend::SignUpOutcome;
use crate::error::UseCaseError;
use crate::usecases::AuthUseCases;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub code: String,
    /// A sign-up code was sent; the screen shows the code field.
    pub awaiting_code: bool,
    pub is_submitting: bool,
    pub message: Option<String>,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("mode", &self.mode)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("awaiting_code", &self.awaiting_code)
            .field("is_submitting", &self.is_submitting)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum AuthIntent {
    EmailChanged(String),
    PasswordChanged(String),
    FirstNameChanged(String),
    LastNameChanged(String),
    CodeChanged(String),
    ToggleMode,
    Submit,
    VerifyCode,
    ResendCode,
}

// Intents end up in breadcrumbs; keep typed secrets out of them
impl fmt::Debug for AuthIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailChanged(_) => f.write_str("EmailChanged"),
            Self::PasswordChanged(_) => f.write_str("PasswordChanged"),
            Self::FirstNameChanged(_) => f.write_str("FirstNameChanged"),
            Self::LastNameChanged(_) => f.write_str("LastNameChanged"),
            Self::CodeChanged(_) => f.write_str("CodeChanged"),
            Self::ToggleMode => f.write_str("ToggleMode"),
            Self::Submit => f.write_str("Submit"),
            Self::VerifyCode => f.write_str("VerifyCode"),
            Self::ResendCode => f.write_str("ResendCode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Authenticated,
}

pub fn reduce(state: &mut AuthState, intent: &AuthIntent) {
    match intent {
        AuthIntent::EmailChanged(email) => state.email.clone_from(email),
        AuthIntent::PasswordChanged(password) => state.password.clone_from(password),
        AuthIntent::FirstNameChanged(name) => state.first_name.clone_from(name),
        AuthIntent::LastNameChanged(name) => state.last_name.clone_from(name),
        AuthIntent::CodeChanged(code) => state.code.clone_from(code),
        AuthIntent::ToggleMode => {
            state.mode = match state.mode {
                AuthMode::SignIn => AuthMode::SignUp,
                AuthMode::SignUp => AuthMode::SignIn,
            };
            state.password.clear();
            state.code.clear();
            state.awaiting_code = false;
            state.message = None;
        }
        AuthIntent::Submit | AuthIntent::VerifyCode | AuthIntent::ResendCode => {
            if state.is_submitting {
                return;
            }
            state.is_submitting = true;
            state.message = None;
        }
    }
}

fn finish(store: &Store<AuthState, AuthEvent>, result: Result<Option<String>, UseCaseError>) {
    match result {
        Ok(message) => store.update(|s| {
            s.is_submitting = false;
            s.message = message;
        }),
        Err(err) => store.update(|s| {
            s.is_submitting = false;
            s.message = Some(err.message);
        }),
    }
}

pub struct AuthViewModel {
    screen: Screen<AuthState, AuthEvent>,
    auth: AuthUseCases,
}

impl AuthViewModel {
    #[must_use]
    pub fn new(auth: AuthUseCases) -> Self {
        Self {
            screen: Screen::new(AuthState::default()),
            auth,
        }
    }

    fn submit(&mut self, form: AuthState) {
        let store = self.screen.store().clone();
        let auth = self.auth.clone();
        self.screen.launch(async move {
            let result = match form.mode {
                AuthMode::SignIn => auth.sign_in(&form.email, &form.password).await.map(|_| {
                    store.emit(AuthEvent::Authenticated);
                    None
                }),
                AuthMode::SignUp => auth
                    .sign_up(
                        &form.email,
                        &form.password,
                        &form.first_name,
                        &form.last_name,
                    )
                    .await
                    .map(|outcome| match outcome {
                        SignUpOutcome::SignedIn(_) => {
                            store.emit(AuthEvent::Authenticated);
                            None
                        }
                        SignUpOutcome::ConfirmationRequired(_) => {
                            store.update(|s| s.awaiting_code = true);
                            Some(format!("We sent a code to {}", form.email.trim()))
                        }
                    }),
            };
            finish(&store, result);
        });
    }

    fn verify(&mut self, form: AuthState) {
        let store = self.screen.store().clone();
        let auth = self.auth.clone();
        self.screen.launch(async move {
            let result = auth.verify_otp(&form.email, &form.code).await.map(|_| {
                store.update(|s| s.awaiting_code = false);
                store.emit(AuthEvent::Authenticated);
                None
            });
            finish(&store, result);
        });
    }

    fn resend(&mut self, form: AuthState) {
        let store = self.screen.store().clone();
        let auth = self.auth.clone();
        self.screen.launch(async move {
            let result = auth
                .resend_otp(&form.email)
                .await
                .map(|()| Some("Code sent again".to_string()));
            finish(&store, result);
        });
    }
}

impl ViewModel for AuthViewModel {
    type State = AuthState;
    type Intent = AuthIntent;
    type Event = AuthEvent;

    const NAME: &'static str = "auth";

    fn screen(&self) -> &Screen<AuthState, AuthEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<AuthState, AuthEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: AuthIntent) {
        let busy = self.screen.store().read(|s| s.is_submitting);
        self.screen.store().update(|s| reduce(s, &intent));
        if busy {
            return;
        }
        let form = self.screen.store().get();
        match intent {
            AuthIntent::Submit => self.submit(form),
            AuthIntent::VerifyCode => self.verify(form),
            AuthIntent::ResendCode => self.resend(form),
            _ => {}
        }
    }
}
