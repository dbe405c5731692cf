//! Notification inbox.

use std::convert::Infallible;

use brewmart_core::NotificationId;

use super::{Screen, ScreenError, ViewModel};
use crate::models::Notification;
use crate::usecases::NotificationUseCases;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationsState {
    pub notifications: Vec<Notification>,
    pub is_loading: bool,
    pub error: Option<ScreenError>,
}

impl NotificationsState {
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationsIntent {
    Load,
    MarkRead(NotificationId),
}

fn set_read(state: &mut NotificationsState, id: NotificationId, is_read: bool) {
    if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
        n.is_read = is_read;
    }
}

pub fn reduce(state: &mut NotificationsState, intent: &NotificationsIntent) {
    match intent {
        NotificationsIntent::Load => {
            state.is_loading = true;
            state.error = None;
        }
        NotificationsIntent::MarkRead(id) => set_read(state, *id, true),
    }
}

pub struct NotificationsViewModel {
    screen: Screen<NotificationsState, Infallible>,
    notifications: NotificationUseCases,
}

impl NotificationsViewModel {
    #[must_use]
    pub fn new(notifications: NotificationUseCases) -> Self {
        Self {
            screen: Screen::new(NotificationsState::default()),
            notifications,
        }
    }
}

impl ViewModel for NotificationsViewModel {
    type State = NotificationsState;
    type Intent = NotificationsIntent;
    type Event = Infallible;

    const NAME: &'static str = "notifications";

    fn screen(&self) -> &Screen<NotificationsState, Infallible> {
        &self.screen
    }

    fn screen_mut(&mut self) -> &mut Screen<NotificationsState, Infallible> {
        &mut self.screen
    }

    fn handle(&mut self, intent: NotificationsIntent) {
        // Already-read rows are not sent again
        let unread = match &intent {
            NotificationsIntent::MarkRead(id) => self
                .screen
                .store()
                .read(|s| s.notifications.iter().any(|n| n.id == *id && !n.is_read)),
            NotificationsIntent::Load => false,
        };
        self.screen.store().update(|s| reduce(s, &intent));

        let store = self.screen.store().clone();
        let notifications = self.notifications.clone();
        match intent {
            NotificationsIntent::Load => self.screen.launch(async move {
                let result = notifications.get_notifications().await;
                store.update(|s| {
                    match result {
                        Ok(list) => s.notifications = list,
                        Err(err) => s.error = Some(ScreenError::from(&err)),
                    }
                    s.is_loading = false;
                });
            }),
            NotificationsIntent::MarkRead(id) if unread => self.screen.launch(async move {
                if notifications.mark_notification_read(id).await.is_err() {
                    store.update(|s| set_read(s, id, false));
                }
            }),
            NotificationsIntent::MarkRead(_) => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::FakeBackend;

    fn view_model(fake: &Arc<FakeBackend>) -> NotificationsViewModel {
        NotificationsViewModel::new(NotificationUseCases::new(fake.clone(), fake.clone()))
    }

    #[tokio::test]
    async fn test_mark_read_updates_count_and_backend() {
        let fake = FakeBackend::signed_in();
        let shipped = fake.add_notification("Your order has shipped");
        fake.add_notification("Spring sale");

        let mut vm = view_model(&fake);
        vm.on_intent(NotificationsIntent::Load);
        vm.idle().await;
        assert_eq!(vm.state().unread_count(), 2);

        vm.on_intent(NotificationsIntent::MarkRead(shipped));
        assert_eq!(vm.state().unread_count(), 1);
        vm.idle().await;
        assert!(fake.notification_is_read(shipped));
    }

    #[tokio::test]
    async fn test_failed_mark_read_is_reverted() {
        let fake = FakeBackend::signed_in();
        let id = fake.add_notification("Your order has shipped");
        fake.fail("mark_read", "permission denied");

        let mut vm = view_model(&fake);
        vm.on_intent(NotificationsIntent::Load);
        vm.idle().await;
        vm.on_intent(NotificationsIntent::MarkRead(id));
        vm.idle().await;
        assert_eq!(vm.state().unread_count(), 1);
    }

    #[tokio::test]
    async fn test_read_rows_are_not_sent_again() {
        let fake = FakeBackend::signed_in();
        let id = fake.add_notification("Welcome");
        let mut vm = view_model(&fake);
        vm.on_intent(NotificationsIntent::Load);
        vm.idle().await;
        vm.on_intent(NotificationsIntent::MarkRead(id));
        vm.idle().await;
        vm.on_intent(NotificationsIntent::MarkRead(id));
        vm.idle().await;
        assert_eq!(fake.calls("mark_read"), 1);
    }

    #[tokio::test]
    async fn test_signed_out_shows_error() {
        let fake = FakeBackend::new();
        let mut vm = view_model(&fake);
        vm.on_intent(NotificationsIntent::Load);
        vm.idle().await;
        assert_eq!(vm.state().error, Some(ScreenError::Generic));
    }
}
