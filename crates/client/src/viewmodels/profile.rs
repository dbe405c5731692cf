//! Profile screen: personal details, saved addresses and sign-out.

use brewmart_core::AddressId;

use super::{Screen, ScreenError, ViewModel, record_error};
use crate::models::{Address, Profile};
use crate::usecases::{AuthUseCases, ProfileForm, ProfileUseCases};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub form: ProfileForm,
    pub addresses: Vec<Address>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub error: Option<ScreenError>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileIntent {
    Load,
    FirstNameChanged(String),
    LastNameChanged(String),
    PhoneChanged(String),
    EmailChanged(String),
    Save,
    DeleteAddress(AddressId),
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    SignedOut,
}

pub fn reduce(state: &mut ProfileState, intent: &ProfileIntent) {
    match intent {
        ProfileIntent::Load => {
            state.is_loading = true;
            state.error = None;
        }
        ProfileIntent::FirstNameChanged(v) => state.form.first_name.clone_from(v),
        ProfileIntent::LastNameChanged(v) => state.form.last_name.clone_from(v),
        ProfileIntent::PhoneChanged(v) => state.form.phone.clone_from(v),
        ProfileIntent::EmailChanged(v) => state.form.email.clone_from(v),
        ProfileIntent::Save => {
            state.is_saving = true;
            state.message = None;
        }
        ProfileIntent::DeleteAddress(id) => state.addresses.retain(|a| a.id != *id),
        ProfileIntent::SignOut => {}
    }
}

pub struct ProfileViewModel {
    screen: Screen<ProfileState, ProfileEvent>,
    profiles: ProfileUseCases,
    auth: AuthUseCases,
}

impl ProfileViewModel {
    #[must_use]
    pub fn new(profiles: ProfileUseCases, auth: AuthUseCases) -> Self {
        Self {
            screen: Screen::new(ProfileState::default()),
            profiles,
            auth,
        }
    }

    fn load(&mut self) {
        let store = self.screen.store().clone();
        let profiles = self.profiles.clone();
        self.screen.launch(async move {
            let (profile, addresses) =
                tokio::join!(profiles.get_profile(), profiles.get_addresses());
            store.update(|s| {
                match profile {
                    Ok(profile) => {
                        s.form = ProfileForm::from(&profile);
                        s.profile = Some(profile);
                    }
                    Err(err) => record_error(&mut s.error, &err),
                }
                match addresses {
                    Ok(addresses) => s.addresses = addresses,
                    Err(err) => record_error(&mut s.error, &err),
                }
                s.is_loading = false;
            });
        });
    }

    fn save(&mut self, form: ProfileForm) {
        let store = self.screen.store().clone();
        let profiles = self.profiles.clone();
        self.screen.launch(async move {
            let result = profiles.update_profile(&form).await;
            store.update(|s| {
                s.is_saving = false;
                match result {
                    Ok(profile) => {
                        s.form = ProfileForm::from(&profile);
                        s.profile = Some(profile);
                        s.message = Some("Profile saved".to_string());
                    }
                    Err(err) => s.message = Some(err.message),
                }
            });
        });
    }
}

impl ViewModel for ProfileViewModel {
    type State = ProfileState;
    type Intent = ProfileIntent;
    type Event = ProfileEvent;

    const NAME: &'static str = "profile";

    fn screen(&self) -> &Screen<ProfileState, ProfileEvent> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<ProfileState, ProfileEvent> {
        &mut self.screen
    }

    fn handle(&mut self, intent: ProfileIntent) {
        let saving = self.screen.store().read(|s| s.is_saving);
        self.screen.store().update(|s| reduce(s, &intent));
        match intent {
            ProfileIntent::Load => self.load(),
            ProfileIntent::Save if !saving => {
                let form = self.screen.store().read(|s| s.form.clone());
                self.save(form);
            }
            ProfileIntent::DeleteAddress(id) => {
                let store = self.screen.store().clone();
                let profiles = self.profiles.clone();
                self.screen.launch(async move {
                    if let Err(err) = profiles.delete_address(id).await {
                        let reloaded = profiles.get_addresses().await;
                        store.update(|s| {
                            if let Ok(addresses) = reloaded {
                                s.addresses = addresses;
                            }
                            s.message = Some(err.message);
                        });
                    }
                });
            }
            ProfileIntent::SignOut => {
                let store = self.screen.store().clone();
                let auth = self.auth.clone();
                self.screen.launch(async move {
                    match auth.sign_out().await {
                        Ok(()) => store.emit(ProfileEvent::SignedOut),
                        Err(err) => store.update(|s| s.message = Some(err.message)),
                    }
                });
            }
            _ => {}
        }
    }
}
