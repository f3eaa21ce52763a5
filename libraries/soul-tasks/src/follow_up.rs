//! Import → identify → sort chaining
//!
//! Registered as a queue hook so chained tasks are queued before the queue can
//! report idle.

use crate::config::FollowUpPolicy;
use crate::factory::TaskFactory;
use crate::kind::TaskKind;
use crate::queue::{Queue, TaskReport};
use crate::status::TaskStatus;
use crate::tasks::SortScope;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

pub struct FollowUps;

impl FollowUps {
    /// Chain tasks after every import that brought files in
    pub fn install(queue: &Arc<Queue>, factory: TaskFactory, policy: FollowUpPolicy) {
        if !policy.identify_after_import && !policy.sort_after_import {
            return;
        }
        let weak: Weak<Queue> = Arc::downgrade(queue);
        queue.on_task_finished(move |report| {
            if let Some(queue) = weak.upgrade() {
                Self::chain(&queue, &factory, policy, report);
            }
        });
    }

    fn chain(queue: &Queue, factory: &TaskFactory, policy: FollowUpPolicy, report: &TaskReport) {
        let imported = report.kind == TaskKind::Import
            && matches!(
                report.status,
                TaskStatus::Succeeded | TaskStatus::SucceededWithWarnings
            )
            && !report.items.is_empty();
        if !imported {
            return;
        }

        debug!(
            import = report.id,
            files = report.items.len(),
            "Chaining follow-up tasks"
        );
        if policy.identify_after_import {
            if let Err(e) = queue.add(Box::new(factory.identify(report.items.clone()))) {
                warn!("Cannot queue identification after import {}: {}", report.id, e);
            }
        }
        if policy.sort_after_import {
            let scope = SortScope::songs(report.items.clone());
            if let Err(e) = queue.add(Box::new(factory.sort(scope))) {
                warn!("Cannot queue sort after import {}: {}", report.id, e);
            }
        }
    }
}
