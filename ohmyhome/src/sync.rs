//! Optimistic application of setting changes
//!
//! A change is written to the cache and the store right away, then committed to
//! the authority in a background task. While a commit for a setting is in
//! flight, newer changes to the same setting supersede it: the old request keeps
//! running, but only the result of the latest request is acted on. A rejected
//! latest request restores the value from before the whole burst of changes.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use ohmyhome_common::{Setting, SettingValue};
use tokio::task::JoinHandle;

use crate::{Authority, CommitFailed, Error, Result, SettingCache, Store};

#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Treat a commit as failed if the authority has not answered by then
    pub commit_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// An unresolved change of one setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub setting: Setting,
    /// Value from before the first change of the current burst
    pub previous: SettingValue,
    /// Latest value asked for
    pub proposed: SettingValue,
    /// Identifies the request whose answer will be honoured
    pub token: RequestToken,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to sync {setting}: {reason}")]
pub struct SyncFailed {
    pub setting: Setting,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The setting is not confirmed remotely
    LocalOnly,
    Confirmed,
    /// The authority rejected the change and the previous value is back
    RolledBack { reason: String },
    /// A newer change to the same setting took over before this one resolved
    Superseded,
    /// The commit task was cancelled or panicked
    Abandoned,
}

/// Handle to a change's remote commit
///
/// Dropping it does not cancel anything.
#[derive(Debug)]
pub struct Commit {
    task: Option<JoinHandle<CommitOutcome>>,
}

impl Commit {
    pub fn is_local(&self) -> bool {
        self.task.is_none()
    }

    pub async fn outcome(self) -> CommitOutcome {
        let Some(task) = self.task else {
            return CommitOutcome::LocalOnly;
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Commit task did not finish: {e}");
                CommitOutcome::Abandoned
            }
        }
    }
}

type SyncErrorListener = Arc<dyn Fn(&SyncFailed) + Send + Sync>;

/// The only writer of settings
///
/// Cheap to clone; clones share state.
pub struct SyncController<S: Store, A: Authority> {
    shared: Arc<Shared<S, A>>,
}

impl<S: Store, A: Authority> Clone for SyncController<S, A> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

struct Shared<S, A> {
    state: Mutex<State<S>>,
    authority: A,
    config: SyncConfig,
    listeners: Mutex<Vec<SyncErrorListener>>,
}

struct State<S> {
    cache: SettingCache,
    store: S,
    pending: BTreeMap<Setting, PendingCommit>,
    last_token: u64,
    store_degraded: bool,
}

impl<S: Store> State<S> {
    fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }

    /// Writes through to the store; failures only degrade durability
    fn persist(&mut self, setting: Setting, value: SettingValue) {
        let mut result = self.store.set(setting.key(), &value.to_string());

        if result.is_ok() {
            if let Some(legacy) = setting.legacy_key().filter(|key| self.store.get(key).is_some()) {
                result = self.store.remove(legacy);
            }
        }

        match result {
            Ok(()) if self.store_degraded => {
                self.store_degraded = false;
                tracing::info!("Settings store is writable again");
            }
            Ok(()) => {}
            Err(e) if !self.store_degraded => {
                self.store_degraded = true;
                tracing::warn!("Settings store unavailable, changes will not survive a restart: {e}");
            }
            Err(e) => tracing::debug!("Settings store still unavailable: {e}"),
        }
    }
}

impl<S: Store, A: Authority> SyncController<S, A> {
    /// Loads every setting from `store`
    pub fn new(store: S, authority: A, config: SyncConfig) -> Self {
        let cache = SettingCache::load(&store);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    cache,
                    store,
                    pending: BTreeMap::new(),
                    last_token: 0,
                    store_degraded: false,
                }),
                authority,
                config,
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn get(&self, setting: Setting) -> SettingValue {
        self.shared.lock().cache.read(setting)
    }

    pub fn snapshot(&self) -> Vec<(Setting, SettingValue)> {
        self.shared.lock().cache.snapshot()
    }

    pub fn is_pending(&self, setting: Setting) -> bool {
        self.shared.lock().pending.contains_key(&setting)
    }

    pub fn pending(&self) -> Vec<PendingCommit> {
        self.shared.lock().pending.values().cloned().collect()
    }

    /// `false` while writes to the store are failing
    pub fn store_available(&self) -> bool {
        !self.shared.lock().store_degraded
    }

    /// Called once for every change the authority rejected
    pub fn on_sync_error(&self, listener: impl Fn(&SyncFailed) + Send + Sync + 'static) {
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Makes `value` visible immediately and commits it in the background
    ///
    /// Must be called from within a tokio runtime. Rejections are not returned
    /// here but reported to [`Self::on_sync_error`] listeners; the returned
    /// [`Commit`] can be awaited or dropped.
    pub fn apply(&self, setting: Setting, value: SettingValue) -> Result<Commit> {
        let mut state = self.shared.lock();

        let previous = state.cache.write(setting, value)?;
        state.persist(setting, value);

        if !setting.is_remote() {
            tracing::info!("{setting} = {value}");
            return Ok(Commit { task: None });
        }

        let token = state.next_token();
        match state.pending.entry(setting) {
            Entry::Occupied(entry) => {
                let pending = entry.into_mut();
                tracing::debug!("{setting} = {value} supersedes {}", pending.proposed);
                pending.proposed = value;
                pending.token = token;
            }
            Entry::Vacant(entry) => {
                entry.insert(PendingCommit { setting, previous, proposed: value, token });
            }
        }
        drop(state);

        tracing::info!("{setting} = {value}, committing");

        let shared = self.shared.clone();
        let task = tokio::spawn(async move { shared.commit(setting, value, token).await });

        Ok(Commit { task: Some(task) })
    }

    /// Flips a two-valued setting
    pub fn toggle(&self, setting: Setting) -> Result<Commit> {
        let next = setting
            .toggled(&self.get(setting))
            .ok_or(Error::NotToggleable(setting))?;

        self.apply(setting, next)
    }

    pub fn reset(&self, setting: Setting) -> Result<Commit> {
        self.apply(setting, setting.default_value())
    }
}

impl<S: Store, A: Authority> Shared<S, A> {
    fn lock(&self) -> MutexGuard<'_, State<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn commit(&self, setting: Setting, value: SettingValue, token: RequestToken) -> CommitOutcome {
        let result = match self.config.commit_timeout {
            Some(limit) => tokio::time::timeout(limit, self.authority.commit(setting, value))
                .await
                .unwrap_or_else(|_| {
                    Err(CommitFailed::new(format!("timed out after {}ms", limit.as_millis())))
                }),
            None => self.authority.commit(setting, value).await,
        };

        self.resolve(setting, value, token, result)
    }

    fn resolve(
        &self,
        setting: Setting,
        value: SettingValue,
        token: RequestToken,
        result: Result<(), CommitFailed>,
    ) -> CommitOutcome {
        let mut state = self.lock();

        let pending = match state.pending.entry(setting) {
            Entry::Occupied(entry) if entry.get().token == token => entry.remove(),
            _ => {
                tracing::debug!("Discarding stale result for {setting} = {value}: {result:?}");
                return CommitOutcome::Superseded;
            }
        };

        let reason = match result {
            Ok(()) => {
                tracing::debug!("{setting} = {value} confirmed");
                return CommitOutcome::Confirmed;
            }
            Err(CommitFailed { reason }) => reason,
        };

        if let Err(e) = state.cache.write(setting, pending.previous) {
            tracing::error!("Cannot restore {setting}: {e}");
        }
        state.persist(setting, pending.previous);
        drop(state);

        tracing::warn!("{setting} = {value} rejected ({reason}), back to {}", pending.previous);

        self.notify(&SyncFailed { setting, reason: reason.clone() });

        CommitOutcome::RolledBack { reason }
    }

    fn notify(&self, failure: &SyncFailed) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            listener(failure);
        }
    }
}

#[cfg(test)]
mod tests {
    use ohmyhome_common::{Domain, Mode, Theme};
    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::{
        authority::{HttpAuthority, HttpConfig, MockAuthority},
        store::{FileStore, MemoryStore},
    };

    /// Authority whose answers are given by the test, one request at a time
    #[derive(Clone)]
    struct ScriptedAuthority {
        requests: mpsc::UnboundedSender<Request>,
    }

    struct Request {
        setting: Setting,
        value: SettingValue,
        reply: oneshot::Sender<Result<(), CommitFailed>>,
    }

    impl Request {
        fn ok(self) {
            let _ = self.reply.send(Ok(()));
        }

        fn fail(self, reason: &str) {
            let _ = self.reply.send(Err(CommitFailed::new(reason)));
        }
    }

    impl Authority for ScriptedAuthority {
        async fn commit(&self, setting: Setting, value: SettingValue) -> Result<(), CommitFailed> {
            let (reply, answer) = oneshot::channel();
            let _ = self.requests.send(Request { setting, value, reply });
            answer
                .await
                .unwrap_or_else(|_| Err(CommitFailed::new("script dropped the request")))
        }
    }

    fn scripted(
        store: MemoryStore,
        config: SyncConfig,
    ) -> (SyncController<MemoryStore, ScriptedAuthority>, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SyncController::new(store, ScriptedAuthority { requests: tx }, config), rx)
    }

    fn collect_errors<S: Store, A: Authority>(
        controller: &SyncController<S, A>,
    ) -> Arc<Mutex<Vec<SyncFailed>>> {
        let errors = Arc::new(Mutex::new(Vec::new()));
        controller.on_sync_error({
            let errors = errors.clone();
            move |failure| errors.lock().unwrap().push(failure.clone())
        });
        errors
    }

    fn samples(setting: Setting) -> Vec<SettingValue> {
        match setting.domain() {
            Domain::Theme => vec![Theme::Light.into(), Theme::Dark.into()],
            Domain::Mode => Mode::ALL.into_iter().map(SettingValue::from).collect(),
            Domain::Switch => vec![true.into(), false.into()],
            Domain::Range { min, max } => vec![min.into(), ((min + max) / 2).into(), max.into()],
        }
    }

    #[tokio::test]
    async fn changes_are_visible_immediately() {
        let controller =
            SyncController::new(MemoryStore::new(), MockAuthority::failing("500"), SyncConfig::default());

        for &setting in Setting::ALL {
            for value in samples(setting) {
                let _commit = controller.apply(setting, value).unwrap();
                assert_eq!(controller.get(setting), value, "{setting}");
            }
        }
    }

    #[tokio::test]
    async fn rejected_commit_rolls_back_cache_and_store() {
        let store = MemoryStore::new();
        let controller = SyncController::new(
            store.clone(),
            MockAuthority { failure: Some("500".to_owned()), ..MockAuthority::instant() },
            SyncConfig::default(),
        );
        let errors = collect_errors(&controller);

        let commit = controller.apply(Setting::SystemOn, true.into()).unwrap();
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(true));
        assert_eq!(store.get("systemOn").as_deref(), Some("true"));

        assert_eq!(commit.outcome().await, CommitOutcome::RolledBack { reason: "500".to_owned() });
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(false));
        assert_eq!(store.get("systemOn").as_deref(), Some("false"));
        assert!(!controller.is_pending(Setting::SystemOn));
        assert_eq!(*errors.lock().unwrap(), vec![SyncFailed {
            setting: Setting::SystemOn,
            reason: "500".to_owned(),
        }]);
    }

    #[tokio::test]
    async fn stale_failure_does_not_undo_newer_change() {
        let (controller, mut requests) = scripted(MemoryStore::new(), SyncConfig::default());
        let errors = collect_errors(&controller);

        let first = controller.apply(Setting::Mode, Mode::ManualOnly.into()).unwrap();
        let first_request = requests.recv().await.unwrap();
        assert_eq!(first_request.value, SettingValue::Mode(Mode::ManualOnly));

        let second = controller.apply(Setting::Mode, Mode::ScheduleOnly.into()).unwrap();
        let second_request = requests.recv().await.unwrap();

        first_request.fail("500");
        assert_eq!(first.outcome().await, CommitOutcome::Superseded);
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ScheduleOnly));
        assert!(controller.is_pending(Setting::Mode));

        second_request.ok();
        assert_eq!(second.outcome().await, CommitOutcome::Confirmed);
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ScheduleOnly));
        assert!(!controller.is_pending(Setting::Mode));
        assert!(errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rollback_restores_value_from_before_the_burst() {
        let store = MemoryStore::new();
        let (controller, mut requests) = scripted(store.clone(), SyncConfig::default());
        let errors = collect_errors(&controller);

        let toggles = [
            controller.toggle(Setting::SystemOn).unwrap(),
            controller.toggle(Setting::SystemOn).unwrap(),
            controller.toggle(Setting::SystemOn).unwrap(),
        ];
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(true));

        assert_eq!(controller.pending(), vec![PendingCommit {
            setting: Setting::SystemOn,
            previous: SettingValue::Switch(false),
            proposed: SettingValue::Switch(true),
            token: RequestToken(3),
        }]);

        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(requests.recv().await.unwrap());
        }
        let values = replies.iter().map(|r| r.value).collect::<Vec<_>>();
        assert_eq!(values, vec![true.into(), false.into(), true.into()]);

        let last = replies.pop().unwrap();
        for earlier in replies {
            earlier.ok();
        }
        last.fail("503");

        let [first, second, third] = toggles;
        assert_eq!(first.outcome().await, CommitOutcome::Superseded);
        assert_eq!(second.outcome().await, CommitOutcome::Superseded);
        assert_eq!(third.outcome().await, CommitOutcome::RolledBack { reason: "503".to_owned() });

        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(false));
        assert_eq!(store.get("systemOn").as_deref(), Some("false"));
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_domain_changes_nothing() {
        let store = MemoryStore::new();
        let (controller, mut requests) = scripted(store.clone(), SyncConfig::default());

        let err = controller
            .apply(Setting::TemperatureThreshold, SettingValue::Level(31))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfDomain(_)));

        let err = controller
            .apply(Setting::Mode, SettingValue::Switch(true))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfDomain(_)));

        assert_eq!(controller.get(Setting::TemperatureThreshold), SettingValue::Level(24));
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ComfortPriority));
        assert!(store.snapshot().is_empty());
        assert!(controller.pending().is_empty());
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn reapplying_current_value_still_commits() {
        let (controller, mut requests) = scripted(MemoryStore::new(), SyncConfig::default());

        let commit = controller
            .apply(Setting::Mode, Mode::ComfortPriority.into())
            .unwrap();
        assert!(controller.is_pending(Setting::Mode));

        let request = requests.recv().await.unwrap();
        assert_eq!(request.setting, Setting::Mode);
        request.ok();

        assert_eq!(commit.outcome().await, CommitOutcome::Confirmed);
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ComfortPriority));
    }

    #[tokio::test]
    async fn settings_resolve_independently() {
        let (controller, mut requests) = scripted(MemoryStore::new(), SyncConfig::default());

        let mode = controller.apply(Setting::Mode, Mode::ManualOnly.into()).unwrap();
        let system = controller.apply(Setting::SystemOn, true.into()).unwrap();

        let mode_request = requests.recv().await.unwrap();
        let system_request = requests.recv().await.unwrap();
        assert_eq!(system_request.setting, Setting::SystemOn);

        system_request.ok();
        mode_request.fail("409");

        assert_eq!(system.outcome().await, CommitOutcome::Confirmed);
        assert_eq!(mode.outcome().await, CommitOutcome::RolledBack { reason: "409".to_owned() });
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(true));
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ComfortPriority));
    }

    #[tokio::test]
    async fn local_settings_never_reach_the_authority() {
        let store = MemoryStore::new();
        let (controller, mut requests) = scripted(store.clone(), SyncConfig::default());

        let commit = controller
            .apply(Setting::HumidityThreshold, SettingValue::Level(70))
            .unwrap();
        assert!(commit.is_local());
        assert_eq!(commit.outcome().await, CommitOutcome::LocalOnly);

        let commit = controller.toggle(Setting::Theme).unwrap();
        assert_eq!(commit.outcome().await, CommitOutcome::LocalOnly);

        assert_eq!(store.get("humidityThreshold").as_deref(), Some("70"));
        assert_eq!(store.get("theme").as_deref(), Some("light"));
        assert!(controller.pending().is_empty());
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_commit_times_out() {
        let (controller, mut requests) = scripted(MemoryStore::new(), SyncConfig {
            commit_timeout: Some(Duration::from_secs(1)),
        });
        let errors = collect_errors(&controller);

        let commit = controller.apply(Setting::SystemOn, true.into()).unwrap();
        let _unanswered = requests.recv().await.unwrap();

        assert_eq!(commit.outcome().await, CommitOutcome::RolledBack {
            reason: "timed out after 1000ms".to_owned(),
        });
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(false));
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unanswered_commit_without_timeout_stays_pending() {
        let (controller, mut requests) = scripted(MemoryStore::new(), SyncConfig::default());

        let _commit = controller.apply(Setting::SystemOn, true.into()).unwrap();
        let _unanswered = requests.recv().await.unwrap();
        tokio::task::yield_now().await;

        assert!(controller.is_pending(Setting::SystemOn));
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(true));
    }

    #[tokio::test]
    async fn toggle_only_two_valued_settings() {
        let controller =
            SyncController::new(MemoryStore::new(), MockAuthority::instant(), SyncConfig::default());

        assert!(matches!(
            controller.toggle(Setting::Mode),
            Err(Error::NotToggleable(Setting::Mode))
        ));

        controller.toggle(Setting::Theme).unwrap();
        assert_eq!(controller.get(Setting::Theme), SettingValue::Theme(Theme::Light));
        controller.toggle(Setting::Theme).unwrap();
        assert_eq!(controller.get(Setting::Theme), SettingValue::Theme(Theme::Dark));
    }

    #[tokio::test]
    async fn reset_restores_default() {
        let store = MemoryStore::with_entries([("temperatureThreshold", "19")]);
        let controller = SyncController::new(store.clone(), MockAuthority::instant(), SyncConfig::default());
        assert_eq!(controller.get(Setting::TemperatureThreshold), SettingValue::Level(19));

        controller.reset(Setting::TemperatureThreshold).unwrap();
        assert_eq!(controller.get(Setting::TemperatureThreshold), SettingValue::Level(24));
        assert_eq!(store.get("temperatureThreshold").as_deref(), Some("24"));
    }

    #[tokio::test]
    async fn store_outage_keeps_memory_authoritative() {
        let store = MemoryStore::with_entries([("theme", "dark")]);
        store.set_disabled(true);
        let controller = SyncController::new(store.clone(), MockAuthority::instant(), SyncConfig::default());

        controller.apply(Setting::Theme, Theme::Light.into()).unwrap();
        controller.apply(Setting::HumidityThreshold, SettingValue::Level(80)).unwrap();

        assert_eq!(controller.get(Setting::Theme), SettingValue::Theme(Theme::Light));
        assert_eq!(controller.get(Setting::HumidityThreshold), SettingValue::Level(80));
        assert!(!controller.store_available());
        assert_eq!(store.get("theme").as_deref(), Some("dark"));

        store.set_disabled(false);
        controller.apply(Setting::Theme, Theme::Light.into()).unwrap();
        assert!(controller.store_available());
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn writes_migrate_legacy_keys() {
        let store = MemoryStore::with_entries([("temperature", "21")]);
        let controller = SyncController::new(store.clone(), MockAuthority::instant(), SyncConfig::default());
        assert_eq!(controller.get(Setting::TemperatureThreshold), SettingValue::Level(21));

        controller
            .apply(Setting::TemperatureThreshold, SettingValue::Level(22))
            .unwrap();

        assert_eq!(store.get("temperatureThreshold").as_deref(), Some("22"));
        assert_eq!(store.get("temperature"), None);
    }

    #[tokio::test]
    async fn theme_survives_restart() {
        let store = MemoryStore::new();

        let controller = SyncController::new(store.clone(), MockAuthority::instant(), SyncConfig::default());
        controller.apply(Setting::Theme, Theme::Light.into()).unwrap();
        drop(controller);

        let controller = SyncController::new(store, MockAuthority::instant(), SyncConfig::default());
        assert_eq!(controller.get(Setting::Theme), SettingValue::Theme(Theme::Light));
    }

    #[tokio::test]
    async fn file_backed_settings_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let controller = SyncController::new(
            FileStore::open(&path).unwrap(),
            MockAuthority::instant(),
            SyncConfig::default(),
        );
        controller.apply(Setting::Theme, Theme::Light.into()).unwrap();
        let commit = controller.apply(Setting::SystemOn, true.into()).unwrap();
        assert_eq!(commit.outcome().await, CommitOutcome::Confirmed);
        drop(controller);

        let controller = SyncController::new(
            FileStore::open(&path).unwrap(),
            MockAuthority::instant(),
            SyncConfig::default(),
        );
        assert_eq!(controller.get(Setting::Theme), SettingValue::Theme(Theme::Light));
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(true));
    }

    #[tokio::test]
    async fn mode_change_rejected_by_service() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/mode")
            .with_status(500)
            .create_async()
            .await;

        let authority = HttpAuthority::new(HttpConfig { base_url: server.url(), ..Default::default() }).unwrap();
        let controller = SyncController::new(MemoryStore::new(), authority, SyncConfig::default());
        let errors = collect_errors(&controller);

        let commit = controller.apply(Setting::Mode, Mode::ManualOnly.into()).unwrap();
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ManualOnly));

        assert_eq!(commit.outcome().await, CommitOutcome::RolledBack { reason: "500".to_owned() });
        assert_eq!(controller.get(Setting::Mode), SettingValue::Mode(Mode::ComfortPriority));
        assert_eq!(*errors.lock().unwrap(), vec![SyncFailed {
            setting: Setting::Mode,
            reason: "500".to_owned(),
        }]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn system_switch_confirmed_by_service() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/device/update")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "device": "system",
                "state": "ON",
                "reason": "manual_frontend",
            })))
            .with_status(200)
            .create_async()
            .await;

        let store = MemoryStore::new();
        let authority = HttpAuthority::new(HttpConfig { base_url: server.url(), ..Default::default() }).unwrap();
        let controller = SyncController::new(store.clone(), authority, SyncConfig::default());
        let errors = collect_errors(&controller);

        let commit = controller.apply(Setting::SystemOn, true.into()).unwrap();

        assert_eq!(commit.outcome().await, CommitOutcome::Confirmed);
        assert_eq!(controller.get(Setting::SystemOn), SettingValue::Switch(true));
        assert_eq!(store.get("systemOn").as_deref(), Some("true"));
        assert!(errors.lock().unwrap().is_empty());
        mock.assert_async().await;
    }
}
