//! Zone pipeline wiring: turns configured zones into scheduled tasks.
//!
//! Only the scheduling seam lives here. Signconf loading, signing, and
//! output writing attach at the stage callbacks; the configure callback
//! below logs the pass and reschedules the zone's next one.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use signerd_core::SignerdConfig;
use signerd_scheduler::task::{TaskCallback, TASK_CLASS_SIGNER, TASK_SIGNCONF};
use signerd_scheduler::{SchedulerEngine, Task, TaskRun};

/// Ambient state handed to every stage callback.
pub struct SignerContext {
    pub config: SignerdConfig,
}

impl SignerContext {
    pub fn new(config: &SignerdConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

/// Per-zone scheduling state, carried as the task payload.
struct ZoneState {
    resign_interval: Duration,
    passes: u64,
}

fn signconf_callback() -> TaskCallback<SignerContext> {
    Box::new(|owner, payload, _context| {
        let Some(state) = payload.and_then(|p| p.downcast_mut::<ZoneState>()) else {
            warn!(zone = %owner, "zone task carries no state, dropping it");
            return TaskRun::Done;
        };
        state.passes += 1;
        info!(zone = %owner, pass = state.passes, "signing pass");
        TaskRun::At(Utc::now() + state.resign_interval)
    })
}

/// Schedule one configure task per configured zone, due immediately.
/// When the store must be serialized, every task shares the engine's
/// work lock.
pub fn register_zones(engine: &mut SchedulerEngine<SignerContext>, config: &SignerdConfig) {
    let worklock = engine.worklock();
    let now = Utc::now();

    for zone in &config.zones {
        let state = ZoneState {
            resign_interval: Duration::seconds(zone.resign_interval_secs as i64),
            passes: 0,
        };
        let mut task = Task::new(
            zone.name.clone(),
            TASK_CLASS_SIGNER,
            TASK_SIGNCONF,
            Some(signconf_callback()),
            Some(Box::new(state)),
            now,
        );
        if config.scheduler.serialize_store {
            task = task.with_lock(Arc::clone(&worklock));
        }
        engine.schedule_task(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signerd_core::config::ZoneConfig;

    fn config_with_zones(names: &[&str]) -> SignerdConfig {
        SignerdConfig {
            zones: names
                .iter()
                .map(|name| ZoneConfig {
                    name: name.to_string(),
                    resign_interval_secs: 120,
                })
                .collect(),
            ..SignerdConfig::default()
        }
    }

    #[test]
    fn registers_one_task_per_zone() {
        let config = config_with_zones(&["example.com", "example.net"]);
        let context = Arc::new(SignerContext::new(&config));
        let mut engine = SchedulerEngine::new(&config.scheduler, context).unwrap();

        register_zones(&mut engine, &config);
        assert_eq!(engine.pending(), 2);
    }

    #[test]
    fn signconf_callback_reschedules_after_interval() {
        let config = config_with_zones(&["example.com"]);
        let context = SignerContext::new(&config);

        let mut task = Task::new(
            "example.com",
            TASK_CLASS_SIGNER,
            TASK_SIGNCONF,
            Some(signconf_callback()),
            Some(Box::new(ZoneState {
                resign_interval: Duration::seconds(120),
                passes: 0,
            })),
            Utc::now(),
        );

        let before = Utc::now();
        match task.execute(&context) {
            TaskRun::At(due) => assert!(due >= before + Duration::seconds(120)),
            TaskRun::Done => panic!("zone pass must reschedule"),
        }
    }

    #[test]
    fn stateless_zone_task_is_dropped() {
        let config = config_with_zones(&[]);
        let context = SignerContext::new(&config);

        let mut task = Task::new(
            "example.com",
            TASK_CLASS_SIGNER,
            TASK_SIGNCONF,
            Some(signconf_callback()),
            None,
            Utc::now(),
        );
        assert_eq!(task.execute(&context), TaskRun::Done);
    }
}
