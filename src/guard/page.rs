use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{Decision, RouteGuard};
use crate::session::SessionStore;

/// Replaces the current history entry; never pushes
pub trait Navigator: Send + Sync {
    fn replace(&self, target: &str);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn replace(&self, target: &str) {
        (**self).replace(target)
    }
}

/// Render state of a guarded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPhase {
    /// Waiting on the validator; nothing is rendered
    Checking,
    Allowed,
    /// A redirect was issued; the mount renders nothing from now on
    Redirected(String),
}

/// Result of one path-change cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Redirected(String),
    /// A newer path change started before this one resolved
    Superseded,
    /// The mount already redirected and ignores further changes
    Suppressed,
}

/// A page mounted behind the guard.
///
/// Every path change bumps the generation; a validation that resolves after
/// a newer change is discarded without side effects.
pub struct GuardedPage<S, N> {
    guard: Arc<RouteGuard>,
    store: S,
    navigator: N,
    generation: AtomicU64,
    phase: Mutex<GuardPhase>,
}

impl<S: SessionStore, N: Navigator> GuardedPage<S, N> {
    pub fn mount(guard: Arc<RouteGuard>, store: S, navigator: N) -> Self {
        Self {
            guard,
            store,
            navigator,
            generation: AtomicU64::new(0),
            phase: Mutex::new(GuardPhase::Checking),
        }
    }

    pub fn phase(&self) -> GuardPhase {
        self.phase.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn should_render(&self) -> bool {
        self.phase() == GuardPhase::Allowed
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn on_path_change(&self, path: &str) -> GuardOutcome {
        let generation = {
            let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
            if matches!(*phase, GuardPhase::Redirected(_)) {
                return GuardOutcome::Suppressed;
            }
            *phase = GuardPhase::Checking;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let session = self.store.load();
        let validity = self.guard.check_token(&session.token).await;
        let verdict = self.guard.decide(path, &session, validity);

        let target = {
            let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding stale guard result for {} (generation {})", path, generation);
                return GuardOutcome::Superseded;
            }
            if matches!(*phase, GuardPhase::Redirected(_)) {
                return GuardOutcome::Suppressed;
            }

            let target = match verdict.decision {
                Decision::Allow => {
                    *phase = GuardPhase::Allowed;
                    return GuardOutcome::Render;
                }
                Decision::Redirect(target) => target,
                Decision::ClearAndRedirect(target) => {
                    tracing::info!("Clearing session after rejected token on {}", path);
                    self.store.clear();
                    target
                }
            };
            *phase = GuardPhase::Redirected(target.clone());
            target
        };

        tracing::info!("Guard redirecting {} -> {} ({})", path, target, verdict.rule);
        self.navigator.replace(&target);
        GuardOutcome::Redirected(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::testing::StaticValidator;
    use crate::guard::{GuardPolicy, RouteTable};
    use crate::session::{MemorySessionStore, Role, Session, JWT_KEY};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    use crate::auth::{AuthError, TokenValidator};

    #[derive(Default)]
    struct RecordingNavigator {
        targets: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn targets(&self) -> Vec<String> {
            self.targets.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn replace(&self, target: &str) {
            self.targets.lock().unwrap().push(target.to_string());
        }
    }

    fn page(
        valid: bool,
        session: Session,
    ) -> (GuardedPage<Arc<MemorySessionStore>, Arc<RecordingNavigator>>, Arc<MemorySessionStore>, Arc<RecordingNavigator>) {
        let guard = Arc::new(RouteGuard::new(Arc::new(StaticValidator::answering(valid))));
        let store = Arc::new(MemorySessionStore::with_session(&session.token, session.role));
        let nav = Arc::new(RecordingNavigator::default());
        (GuardedPage::mount(guard, store.clone(), nav.clone()), store, nav)
    }

    #[tokio::test]
    async fn test_mount_starts_checking() {
        let (page, _, _) = page(true, Session::anonymous());
        assert_eq!(page.phase(), GuardPhase::Checking);
        assert!(!page.should_render());
    }

    #[tokio::test]
    async fn test_allowed_general_path_renders() {
        let (page, _, nav) = page(true, Session::new("t3", Some(Role::User)));
        assert_eq!(page.on_path_change("/about").await, GuardOutcome::Render);
        assert!(page.should_render());
        assert!(nav.targets().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_navigates_once_then_suppresses() {
        let (page, _, nav) = page(true, Session::new("t2", Some(Role::Business)));

        assert_eq!(
            page.on_path_change("/").await,
            GuardOutcome::Redirected("/dashboard/business".into())
        );
        assert_eq!(page.phase(), GuardPhase::Redirected("/dashboard/business".into()));
        assert_eq!(page.on_path_change("/dashboard/business").await, GuardOutcome::Suppressed);
        assert_eq!(nav.targets(), vec!["/dashboard/business".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_token_clears_store() {
        let (page, store, nav) = page(false, Session::new("expired", Some(Role::User)));

        assert_eq!(page.on_path_change("/profile/user").await, GuardOutcome::Redirected("/".into()));
        assert_eq!(store.load(), Session::anonymous());
        assert_eq!(store.get(JWT_KEY).as_deref(), Some(""));
        assert_eq!(nav.targets(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn test_rerun_on_each_path_change_while_allowed() {
        let (page, _, _) = page(true, Session::new("t", Some(Role::User)));
        assert_eq!(page.on_path_change("/about").await, GuardOutcome::Render);
        assert_eq!(page.on_path_change("/dashboard/user").await, GuardOutcome::Render);
        assert_eq!(page.generation(), 2);
    }

    #[tokio::test]
    async fn test_fail_open_renders_page() {
        let guard = Arc::new(RouteGuard::new(Arc::new(StaticValidator::unreachable())));
        let nav = Arc::new(RecordingNavigator::default());
        let page = GuardedPage::mount(guard, MemorySessionStore::with_session("t", Some(Role::User)), nav.clone());

        assert_eq!(page.on_path_change("/dashboard/user").await, GuardOutcome::Render);
        assert!(nav.targets().is_empty());
    }

    #[tokio::test]
    async fn test_fail_closed_redirects() {
        let guard = Arc::new(
            RouteGuard::new(Arc::new(StaticValidator::unreachable())).with_policy(GuardPolicy { fail_open: false }),
        );
        let nav = Arc::new(RecordingNavigator::default());
        let page = GuardedPage::mount(guard, MemorySessionStore::with_session("t", Some(Role::User)), nav.clone());

        assert_eq!(page.on_path_change("/dashboard/user").await, GuardOutcome::Redirected("/".into()));
        assert_eq!(page.store().load(), Session::anonymous());
    }

    /// First call waits for the gate; later calls answer at once
    struct GatedValidator {
        calls: AtomicUsize,
        gate: Notify,
        answer: bool,
    }

    #[async_trait]
    impl TokenValidator for GatedValidator {
        async fn validate(&self, _token: &str) -> Result<bool, AuthError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
            }
            Ok(self.answer)
        }
    }

    #[tokio::test]
    async fn test_stale_validation_has_no_side_effects() {
        let validator = Arc::new(GatedValidator {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
            answer: false,
        });
        let guard = Arc::new(RouteGuard::new(validator.clone()).with_routes(RouteTable::standard()));
        let store = Arc::new(MemorySessionStore::with_session("old", Some(Role::User)));
        let nav = Arc::new(RecordingNavigator::default());
        let page = GuardedPage::mount(guard, store.clone(), nav.clone());

        let stale = page.on_path_change("/profile/user");
        let fresh = async {
            let outcome = page.on_path_change("/register").await;
            validator.gate.notify_one();
            outcome
        };
        let (stale, fresh) = tokio::join!(stale, fresh);

        assert_eq!(stale, GuardOutcome::Superseded);
        assert_eq!(fresh, GuardOutcome::Render);
        assert!(nav.targets().is_empty());
        assert_eq!(store.load(), Session::new("old", Some(Role::User)));
        assert_eq!(page.phase(), GuardPhase::Allowed);
    }
}
