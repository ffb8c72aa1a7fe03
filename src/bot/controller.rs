//! Bot controller
//!
//! Owns the session state and drives the periodic control loop. One tokio
//! task runs per start; cycles run inline in that task so two cycles never
//! overlap. A stop or a breaker trip clears the armed generation, and any
//! cycle still in flight for an older generation drops its results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::events::BotEvent;
use super::state::{BotState, CycleOutcome};
use crate::broker::messages::OpenTradeRequest;
use crate::common::errors::{BotError, Result};
use crate::common::traits::BrokerApi;
use crate::common::types::total_real_balance;
use crate::config::types::{AppConfig, BotConfig, SchedulerConfig};
use crate::strategy::{CircuitBreaker, EntryPolicy, SessionState, TradeReconciler, TripReason};

/// Generation value meaning "no run is armed"
const DISARMED: u64 = 0;

/// Construction parameters for [`BotController`]
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub bot: BotConfig,
    pub scheduler: SchedulerConfig,
    pub trades_page_size: u32,
    /// Fixed seed for the entry policy; OS entropy when `None`
    pub entry_seed: Option<u64>,
}

impl ControllerOptions {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            bot: config.bot.clone(),
            scheduler: config.scheduler.clone(),
            trades_page_size: config.broker.trades_page_size,
            entry_seed: None,
        }
    }
}

struct RunHandle {
    generation: u64,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

struct Inner<B> {
    broker: Arc<B>,
    reconciler: TradeReconciler<B>,
    scheduler: SchedulerConfig,
    session: Mutex<SessionState>,
    state: Mutex<BotState>,
    entry: Mutex<EntryPolicy>,
    armed: AtomicU64,
    generations: AtomicU64,
    run: Mutex<Option<RunHandle>>,
    events: mpsc::Sender<BotEvent>,
}

/// Handle to the martingale bot
///
/// Cheap to clone; every clone drives the same bot.
pub struct BotController<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for BotController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: BrokerApi + 'static> BotController<B> {
    /// Create a stopped controller with a session starting now
    pub fn new(broker: Arc<B>, options: ControllerOptions, events: mpsc::Sender<BotEvent>) -> Self {
        let entry = match options.entry_seed {
            Some(seed) => EntryPolicy::seeded(seed),
            None => EntryPolicy::from_entropy(),
        };

        let inner = Inner {
            reconciler: TradeReconciler::new(Arc::clone(&broker), options.trades_page_size),
            broker,
            scheduler: options.scheduler,
            session: Mutex::new(SessionState::new(options.bot, Utc::now())),
            state: Mutex::new(BotState::Stopped),
            entry: Mutex::new(entry),
            armed: AtomicU64::new(DISARMED),
            generations: AtomicU64::new(0),
            run: Mutex::new(None),
            events,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Validate the config and start the control loop
    ///
    /// Fails with [`BotError::Validation`] listing every invalid field,
    /// [`BotError::AlreadyRunning`] when a run is active, or
    /// [`BotError::BreakerTripped`] until the breaker is re-armed.
    pub async fn start(&self) -> Result<()> {
        let mut run = self.inner.run.lock().await;

        {
            let state = self.inner.state.lock().await;
            match &*state {
                BotState::Starting | BotState::Running => return Err(BotError::AlreadyRunning),
                BotState::BreakerTripped(reason) => {
                    return Err(BotError::BreakerTripped(reason.to_string()))
                }
                BotState::Stopped => {}
            }
        }

        {
            let mut session = self.inner.session.lock().await;
            session.config.validate()?;
            session.bot_running = true;
            session.last_attempt = None;
        }

        let generation = self.inner.arm();
        self.inner.set_state(BotState::Starting).await;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.run_loop(generation, shutdown_rx).await });

        if let Some(previous) = run.replace(RunHandle {
            generation,
            shutdown,
            task,
        }) {
            debug!(generation = previous.generation, "Released previous run");
        }

        info!(generation, "Bot started");
        Ok(())
    }

    /// Stop the control loop
    ///
    /// A cycle already in flight may finish its broker call, but its
    /// results are discarded and no further tick fires.
    pub async fn stop(&self) {
        let run = self.inner.run.lock().await;
        self.inner.armed.store(DISARMED, Ordering::SeqCst);
        if let Some(handle) = run.as_ref() {
            let _ = handle.shutdown.send(true);
        }

        self.inner.session.lock().await.bot_running = false;

        let mut state = self.inner.state.lock().await;
        if state.is_active() {
            *state = BotState::Stopped;
            drop(state);
            info!("Bot stopped");
            self.inner.emit(BotEvent::StateChanged(BotState::Stopped));
        }
    }

    /// Stop and wait for the loop task to exit
    pub async fn shutdown(&self) {
        self.stop().await;
        let handle = self.inner.run.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.task.await {
                warn!("Control loop task ended abnormally: {}", err);
            }
        }
    }

    /// Clear a tripped breaker so the bot can be started again
    ///
    /// Returns false when the breaker was not tripped.
    pub async fn rearm(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if !matches!(*state, BotState::BreakerTripped(_)) {
            return false;
        }
        *state = BotState::Stopped;
        drop(state);

        info!("Circuit breaker re-armed");
        self.inner.emit(BotEvent::StateChanged(BotState::Stopped));
        true
    }

    /// Stop the bot and start a new session at the current time
    ///
    /// Counters are cleared and trades opened before now are ignored from
    /// here on. A tripped breaker is cleared as well.
    pub async fn begin_session(&self) {
        self.stop().await;
        let _run = self.inner.run.lock().await;

        let session_start = Utc::now();
        self.inner.session.lock().await.reset(session_start);
        self.inner.set_state(BotState::Stopped).await;
        info!(%session_start, "New session started");
    }

    /// Replace the bot config; refused while the bot is starting or running
    pub async fn update_config(&self, config: BotConfig) -> Result<()> {
        let _run = self.inner.run.lock().await;
        if self.inner.state.lock().await.is_active() {
            return Err(BotError::ConfigLocked);
        }

        self.inner.session.lock().await.config = config;
        debug!("Bot config updated");
        Ok(())
    }

    /// Current lifecycle state
    pub async fn state(&self) -> BotState {
        self.inner.state.lock().await.clone()
    }

    /// Snapshot of the session state
    pub async fn session(&self) -> SessionState {
        self.inner.session.lock().await.clone()
    }

    /// Generation of the armed run, `None` when disarmed
    pub fn armed_generation(&self) -> Option<u64> {
        match self.inner.armed.load(Ordering::SeqCst) {
            DISARMED => None,
            generation => Some(generation),
        }
    }
}

impl<B: BrokerApi + 'static> Inner<B> {
    fn arm(&self) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        self.armed.store(generation, Ordering::SeqCst);
        generation
    }

    fn is_armed(&self, generation: u64) -> bool {
        self.armed.load(Ordering::SeqCst) == generation
    }

    fn emit(&self, event: BotEvent) {
        if let Err(err) = self.events.try_send(event) {
            debug!("Dropping bot event: {}", err);
        }
    }

    async fn set_state(&self, next: BotState) {
        *self.state.lock().await = next.clone();
        self.emit(BotEvent::StateChanged(next));
    }

    async fn mark_running(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if self.is_armed(generation) && *state == BotState::Starting {
            *state = BotState::Running;
            drop(state);
            self.emit(BotEvent::StateChanged(BotState::Running));
        }
    }

    async fn run_loop(self: Arc<Self>, generation: u64, mut shutdown: watch::Receiver<bool>) {
        self.run_and_report(generation).await;
        if !self.is_armed(generation) {
            return;
        }

        tokio::select! {
            _ = time::sleep(self.scheduler.guard_delay()) => {}
            _ = shutdown.changed() => {
                debug!(generation, "Run cancelled during guard delay");
                return;
            }
        }
        if !self.is_armed(generation) {
            return;
        }

        let period = self.scheduler.tick_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.mark_running(generation).await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            if !self.is_armed(generation) {
                break;
            }
            self.run_and_report(generation).await;
            if !self.is_armed(generation) {
                break;
            }
        }

        debug!(generation, "Control loop exited");
    }

    async fn run_and_report(&self, generation: u64) -> CycleOutcome {
        let outcome = self.run_cycle(generation).await;
        debug!(generation, ?outcome, "Cycle finished");
        self.emit(BotEvent::CycleCompleted {
            generation,
            outcome: outcome.clone(),
        });
        outcome
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self, generation: u64) -> CycleOutcome {
        if !self.is_armed(generation) {
            return CycleOutcome::Disarmed;
        }

        let (session_start, debounced) = {
            let session = self.session.lock().await;
            (
                session.session_start,
                session.debounced(Instant::now(), self.scheduler.debounce()),
            )
        };
        if debounced {
            debug!("Last order too recent, skipping cycle");
            return CycleOutcome::Debounced;
        }

        let reconciliation = self.reconciler.poll(session_start).await;
        let snapshot = {
            let mut session = self.session.lock().await;
            if !self.is_armed(generation) {
                return CycleOutcome::Disarmed;
            }
            if let Some(reconciliation) = &reconciliation {
                session.apply(&reconciliation.summary);
            }
            session.clone()
        };
        if let Some(reconciliation) = reconciliation {
            self.emit(BotEvent::Reconciled(reconciliation.summary));
        }

        if snapshot.active_trade_count > 0 {
            debug!(active = snapshot.active_trade_count, "Waiting for open trades to settle");
            return CycleOutcome::PositionOpen {
                active_trades: snapshot.active_trade_count,
            };
        }

        let total_balance = match self.broker.fetch_wallets().await {
            Ok(wallets) => {
                let balance = total_real_balance(&wallets);
                let mut session = self.session.lock().await;
                if !self.is_armed(generation) {
                    return CycleOutcome::Disarmed;
                }
                session.last_known_balance = Some(balance);
                Some(balance)
            }
            Err(err) => {
                warn!("Balance refresh failed, using last known balance: {}", err);
                snapshot.last_known_balance
            }
        };
        if !self.is_armed(generation) {
            return CycleOutcome::Disarmed;
        }
        let Some(total_balance) = total_balance else {
            warn!("No balance available, breaker cannot be evaluated");
            return CycleOutcome::BalanceUnavailable;
        };

        let breaker = CircuitBreaker::from_config(&snapshot.config);
        if let Some(reason) = breaker.evaluate(snapshot.cumulative_profit, total_balance) {
            if self.trip(generation, reason.clone()).await {
                return CycleOutcome::BreakerTripped(reason);
            }
            return CycleOutcome::Disarmed;
        }

        let amount = snapshot.next_amount();
        let decision = self.entry.lock().await.decide(
            snapshot.consecutive_losses,
            snapshot.last_loss_symbol.as_deref(),
            snapshot.last_loss_direction,
        );

        let request =
            match OpenTradeRequest::new(decision.symbol.clone(), decision.direction, amount) {
                Ok(request) => request,
                Err(err) => return self.submit_failed(err),
            };

        match self.broker.open_trade(&request).await {
            Ok(opened) => {
                info!(
                    trade_id = %opened.id,
                    symbol = %request.symbol,
                    direction = %request.direction,
                    %amount,
                    kind = ?decision.kind,
                    "Order placed"
                );
                self.emit(BotEvent::OrderPlaced {
                    trade_id: opened.id.clone(),
                    symbol: request.symbol.clone(),
                    direction: request.direction,
                    amount,
                    kind: decision.kind,
                });

                {
                    let mut session = self.session.lock().await;
                    if self.is_armed(generation) {
                        session.last_attempt = Some(Instant::now());
                    }
                }

                if let Some(reconciliation) = self.reconciler.poll(session_start).await {
                    let mut session = self.session.lock().await;
                    if self.is_armed(generation) {
                        session.apply(&reconciliation.summary);
                        drop(session);
                        self.emit(BotEvent::Reconciled(reconciliation.summary));
                    }
                }

                CycleOutcome::OrderPlaced {
                    trade_id: opened.id,
                    symbol: request.symbol,
                    direction: request.direction,
                    amount,
                }
            }
            Err(err) => self.submit_failed(err),
        }
    }

    fn submit_failed(&self, err: BotError) -> CycleOutcome {
        if err.is_recoverable() {
            warn!("Order submission failed, retrying next tick: {}", err);
        } else {
            error!("Order submission rejected, retrying next tick: {}", err);
        }
        let reason = err.to_string();
        self.emit(BotEvent::OrderFailed {
            reason: reason.clone(),
        });
        CycleOutcome::SubmitFailed { reason }
    }

    /// Halt the run for `generation`; false if it was already disarmed
    async fn trip(&self, generation: u64, reason: TripReason) -> bool {
        if self
            .armed
            .compare_exchange(generation, DISARMED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        *self.state.lock().await = BotState::BreakerTripped(reason.clone());
        self.session.lock().await.bot_running = false;

        warn!("{}", reason);
        self.emit(BotEvent::StateChanged(BotState::BreakerTripped(reason.clone())));
        self.emit(BotEvent::BreakerTripped(reason));
        true
    }
}
