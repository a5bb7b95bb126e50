//! Main application orchestration.
//!
//! Coordinates all components:
//! - Bar and price feed polling
//! - Gap detection and the zone registry
//! - Decision source and boundary validation
//! - Risk gate checks and daily state
//! - Exit planning and open position management
//! - Signal output and risk snapshot persistence

use crate::config::AppConfig;
use crate::decision::{validate_boundary, DecisionContext, DecisionSource, ZoneMagnetSource};
use crate::error::AppResult;
use crate::feed::{BarFeed, PriceFeed};
use crate::signals::SignalWriter;
use chrono::{DateTime, NaiveDate, Utc};
use fvg_core::{Bar, Price};
use fvg_persistence::SnapshotStore;
use fvg_position::{ExitContext, ExitPlanner, OpenPosition};
use fvg_risk::{GateVerdict, RiskGate};
use fvg_zones::{GapDetector, ZoneRegistry};
use std::time::Duration;
use tokio::select;
use tracing::{info, warn};
use uuid::Uuid;

/// Main application.
pub struct Application {
    config: AppConfig,
    detector: GapDetector,
    registry: ZoneRegistry,
    gate: RiskGate,
    planner: ExitPlanner,
    source: ZoneMagnetSource,
    bar_feed: BarFeed,
    price_feed: PriceFeed,
    signals: SignalWriter,
    store: SnapshotStore,
    position: Option<OpenPosition>,
    /// Full completed-bar series from the last feed read, oldest first.
    bars: Vec<Bar>,
    session_date: NaiveDate,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let detector = GapDetector::new(config.zones.clone());
        let gate = RiskGate::new(config.risk.clone());
        let planner = ExitPlanner::new(config.exits.clone());
        let source = ZoneMagnetSource::new(config.decision.clone());
        let bar_feed = BarFeed::new(&config.feed.bars_path);
        let price_feed = PriceFeed::new(&config.feed.live_path);
        let signals = SignalWriter::new(&config.paths.signals_path)?;
        let store = SnapshotStore::new(&config.paths.state_path);

        Ok(Self {
            config,
            detector,
            registry: ZoneRegistry::new(),
            gate,
            planner,
            source,
            bar_feed,
            price_feed,
            signals,
            store,
            position: None,
            bars: Vec::new(),
            session_date: Utc::now().date_naive(),
        })
    }

    /// Seed the registry from bar history and restore persisted risk
    /// state. Missing or unreadable history is a degraded start, not a
    /// fatal one; the live loop tolerates the same failures.
    fn startup(&mut self) {
        if std::path::Path::new(&self.config.feed.bars_path).exists() {
            self.bar_feed.changed();
            match self.bar_feed.read_bars() {
                Ok(bars) => {
                    self.bar_feed.take_new(&bars);
                    let admitted = self.registry.seed_from_history(&self.detector, &bars);
                    info!(bars = bars.len(), admitted, "registry seeded from bar history");
                    self.bars = bars;
                }
                Err(err) => warn!(%err, "bar history unreadable, starting with an empty registry"),
            }
        } else {
            warn!(
                path = %self.config.feed.bars_path,
                "bar history not found, starting with an empty registry"
            );
        }

        if let Some(snapshot) = self.store.load() {
            self.gate.restore(snapshot, self.session_date);
        }
    }

    /// Run the application until a shutdown signal.
    pub async fn run(mut self) -> AppResult<()> {
        self.startup();

        let interval = Duration::from_secs(self.config.feed.poll_interval_secs.max(1));
        info!(
            poll_secs = interval.as_secs(),
            bars_path = %self.config.feed.bars_path,
            live_path = %self.config.feed.live_path,
            "entering main poll loop"
        );
        let mut ticker = tokio::time::interval(interval);

        loop {
            select! {
                _ = ticker.tick() => {
                    let now = Utc::now();
                    if let Err(err) = self.poll(now) {
                        warn!(%err, "poll iteration failed");
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        info!(risk = %self.gate.summary(), "shutting down");
        self.persist();
        Ok(())
    }

    /// One poll iteration: session rollover, new bars, then the live
    /// price. Feed read failures are logged and skipped.
    fn poll(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        let today = now.date_naive();
        if today != self.session_date {
            info!(%today, "new session day");
            self.gate.roll_day();
            self.session_date = today;
            self.persist();
        }

        if self.bar_feed.changed() {
            self.ingest_bars();
        }

        match self.price_feed.read_last() {
            Ok(Some(price)) => self.on_tick(price, now)?,
            Ok(None) => {}
            Err(err) => warn!(%err, "price feed read failed"),
        }
        Ok(())
    }

    /// Re-read the bar file and process every bar that appeared since
    /// the last poll, oldest first. A feed burst after a stall can
    /// append several bars at once; each one gets its own detection
    /// and fill sweep.
    fn ingest_bars(&mut self) {
        let bars = match self.bar_feed.read_bars() {
            Ok(bars) => bars,
            Err(err) => {
                warn!(%err, "bar feed read failed");
                return;
            }
        };
        let first_new = self.bar_feed.take_new(&bars);
        if first_new >= bars.len() {
            return;
        }
        self.bars = bars;
        for index in first_new..self.bars.len() {
            self.on_new_bar(index);
        }
    }

    /// A completed bar arrived: detect a fresh gap, sweep fills, and
    /// advance the open position's bar count.
    fn on_new_bar(&mut self, index: usize) {
        let Some(bar) = self.bars.get(index) else {
            return;
        };
        if let Some(candidate) = self.detector.candidate_at(&self.bars, index) {
            self.registry.insert(candidate);
        }
        self.registry.apply_bar(bar);
        if let Some(position) = &mut self.position {
            position.on_bar(bar);
        }
        let (bullish, bearish) = self.registry.zone_counts();
        info!(time = %bar.time, close = %bar.close, bullish, bearish, "bar processed");
    }

    /// A live price arrived: sweep tick fills, then manage the open
    /// position or look for an entry.
    fn on_tick(&mut self, price: Price, now: DateTime<Utc>) -> AppResult<()> {
        self.registry.apply_price(price);

        let Some(mut position) = self.position.take() else {
            return self.try_enter(price, now);
        };
        position.on_price(price);

        if position.stop_hit(price) {
            let exit = position.current_stop;
            self.finalize_close(position, exit, "stop hit", now);
            return Ok(());
        }

        let ctx = ExitContext {
            price,
            ema75: self.bars.last().and_then(|bar| bar.ema75),
            recent_bars: &self.bars,
        };
        let actions = self.planner.recommend(&position, &ctx);

        if let Some(reason) = actions.close {
            self.finalize_close(position, price, &reason.to_string(), now);
            return Ok(());
        }

        // The risk ledger and the tracker are already updated by the
        // time a signal row is appended, so a failed write must not
        // unwind them or lose the position. Log and carry on, like the
        // feed paths.
        if let Some(partial) = actions.take_partial {
            let filled = position.take_partial(&partial);
            if filled > 0 {
                let result = fvg_core::TradeResult::from_pnl(
                    position.direction.pnl_points(position.entry, partial.price),
                );
                self.gate.record_exit(
                    &position.trade_id,
                    position.direction,
                    position.entry,
                    partial.price,
                    filled,
                    result,
                    now,
                );
                if let Err(err) = self.signals.write_close(
                    now,
                    position.direction,
                    partial.price,
                    filled,
                    "partial target",
                ) {
                    warn!(%err, trade_id = %position.trade_id, "partial close signal write failed");
                }
            }
            if position.quantity == 0 {
                info!(trade_id = %position.trade_id, "position fully exited via partials");
                self.persist();
                return Ok(());
            }
        }

        if let Some(stop) = actions.move_stop {
            position.move_stop(stop);
            if let Err(err) = self.signals.write_stop_move(now, position.direction, stop) {
                warn!(%err, trade_id = %position.trade_id, "stop move signal write failed");
            }
        }

        self.position = Some(position);
        Ok(())
    }

    /// Look for an entry: decision source, boundary validation, sizing,
    /// then the full pre-trade gate.
    fn try_enter(&mut self, price: Price, now: DateTime<Utc>) -> AppResult<()> {
        if self.gate.can_trade(now).is_block() {
            return Ok(());
        }

        let ctx = DecisionContext {
            price,
            nearest_above: self.registry.nearest_above(price),
            nearest_below: self.registry.nearest_below(price),
            inside_zone: self.registry.zone_containing(price),
        };
        let Some(proposal) = self.source.propose(&ctx) else {
            return Ok(());
        };

        if let Err(err) = validate_boundary(&proposal) {
            warn!(%err, "decision rejected at boundary");
            return Ok(());
        }

        let quantity = self.gate.suggested_size(self.config.risk.max_position_size);
        if let GateVerdict::Block(reason) = self.gate.check_pre_trade(&proposal, quantity, now) {
            info!(%reason, direction = %proposal.direction, "trade blocked");
            return Ok(());
        }

        let plan = self.planner.create_plan(
            proposal.direction,
            proposal.entry,
            proposal.stop,
            proposal.target,
            quantity,
        )?;
        let trade_id = Uuid::new_v4().to_string();
        // The signal row is the order; the entry exists only once it
        // is written.
        self.signals.write_entry(
            now,
            proposal.direction,
            proposal.entry,
            proposal.stop,
            proposal.target,
        )?;
        self.gate
            .record_entry(&trade_id, proposal.direction, quantity, now);
        info!(
            %trade_id,
            direction = %proposal.direction,
            quantity,
            reasoning = %proposal.reasoning,
            plan = %plan.summary(),
            "position opened"
        );
        self.position = Some(OpenPosition::new(
            trade_id,
            proposal.direction,
            proposal.entry,
            quantity,
            plan,
            now,
        ));
        self.persist();
        Ok(())
    }

    /// Close the remaining position at the given price and record it.
    /// The close is booked with the risk gate before the signal row is
    /// written; a failed write is logged, never unwound.
    fn finalize_close(
        &mut self,
        position: OpenPosition,
        exit: Price,
        reason: &str,
        now: DateTime<Utc>,
    ) {
        let result = position.classify_close(exit);
        let pnl = self.gate.record_exit(
            &position.trade_id,
            position.direction,
            position.entry,
            exit,
            position.quantity,
            result,
            now,
        );
        if let Err(err) =
            self.signals
                .write_close(now, position.direction, exit, position.quantity, reason)
        {
            warn!(%err, trade_id = %position.trade_id, "close signal write failed");
        }
        info!(
            trade_id = %position.trade_id,
            %exit,
            %pnl,
            %result,
            reason,
            risk = %self.gate.summary(),
            "position closed"
        );
        self.persist();
    }

    /// Persist the risk snapshot; a failed save is logged, never fatal.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.gate.snapshot(self.session_date)) {
            warn!(%err, "risk snapshot save failed");
        }
    }
}
