//! Session: both controllers wired to one host.
//!
//! The block controller starts first, then the template controller, matching
//! the editor's own boot order. After that the session is driven by
//! [`pump`](Session::pump), which hands every queued change tick to each
//! controller until neither has anything left, then lets the deferred notice
//! land.

use std::sync::Arc;

use blockgate_types::RestrictionTable;

use crate::block_availability::BlockAvailabilityController;
use crate::config::GateConfig;
use crate::flows::SharedChangeBus;
use crate::host::HostHandles;
use crate::notice::DeferredNotice;
use crate::template_availability::{TemplateAvailabilityController, TemplateHost};

/// Circuit breaker for [`Session::pump`]. Controllers converge in a couple
/// of rounds; hitting this means two writers are fighting over host state.
pub const MAX_PUMP_ROUNDS: usize = 64;

/// What one [`Session::pump`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub rounds: usize,
    /// Ticks handled by the block controller.
    pub block_ticks: usize,
    /// Ticks handled by the template controller.
    pub template_ticks: usize,
    /// Whether a deferred notice update was applied.
    pub notice_applied: bool,
}

/// One editing session.
pub struct Session {
    blocks: BlockAvailabilityController,
    templates: TemplateAvailabilityController,
    notice: Arc<DeferredNotice>,
    bus: SharedChangeBus,
    restricted_kinds: usize,
    started: bool,
}

impl Session {
    /// Build both controllers from one config. Nothing runs until [`start`](Self::start).
    ///
    /// The template catalog is captured here, before the block controller
    /// has touched anything.
    pub fn new(config: &GateConfig, host: HostHandles) -> Self {
        let restrictions: Arc<RestrictionTable> = Arc::new(config.restrictions.clone());
        let notice = Arc::new(DeferredNotice::new(host.notices.clone()));

        let templates = TemplateAvailabilityController::new(
            restrictions.clone(),
            TemplateHost {
                documents: host.documents.clone(),
                registry: host.registry.clone(),
                settings: host.settings.clone(),
                notices: notice.clone(),
            },
        )
        .with_notice_config(config.notice.clone())
        .with_policy(config.renarrow);

        let blocks =
            BlockAvailabilityController::new(restrictions, host.documents, host.registry)
                .with_default_template(config.default_template.clone());

        Self {
            blocks,
            templates,
            notice,
            bus: host.bus,
            restricted_kinds: config.restrictions.len(),
            started: false,
        }
    }

    /// Run both controllers once, subscribe them, and settle.
    pub fn start(&mut self) -> PumpStats {
        if self.started {
            return self.pump();
        }
        tracing::info!(
            restricted_kinds = self.restricted_kinds,
            subscribers = self.bus.subscriber_count(),
            "starting block gate session"
        );
        self.blocks.run(&self.bus);
        self.templates.run(&self.bus);
        self.started = true;
        self.pump()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Deliver queued change ticks until both controllers are idle, then
    /// apply the deferred notice.
    pub fn pump(&mut self) -> PumpStats {
        let mut stats = PumpStats::default();

        loop {
            let block_ticks = self.blocks.poll();
            let template_ticks = self.templates.poll();
            if block_ticks == 0 && template_ticks == 0 {
                break;
            }

            stats.rounds += 1;
            stats.block_ticks += block_ticks;
            stats.template_ticks += template_ticks;

            if stats.rounds >= MAX_PUMP_ROUNDS {
                tracing::warn!(
                    rounds = stats.rounds,
                    "change pump did not settle; leaving remaining ticks queued"
                );
                break;
            }
        }

        stats.notice_applied = self.notice.settle();
        tracing::trace!(?stats, "pump settled");
        stats
    }

    pub fn block_controller(&self) -> &BlockAvailabilityController {
        &self.blocks
    }

    pub fn template_controller(&self) -> &TemplateAvailabilityController {
        &self.templates
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("blocks", &self.blocks)
            .field("templates", &self.templates)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
