//! `heartbeat`: a scheduled job that logs the size of the live registries.
//!
//! Options: `schedule` (hour number, cron string or recurrence rule object; default hourly).

use bot_core::{EventNode, TemplateError};
use scheduler::Schedule;
use serde_json::{json, Map};
use tracing::info;

use super::{BotModule, ModuleSpec};
use crate::tasks::TaskNode;

const DEFAULT_SCHEDULE: &str = "0 * * * *";

#[derive(Debug, Clone)]
pub struct HeartbeatModule {
    module_id: String,
    schedule: Schedule,
}

impl HeartbeatModule {
    pub const ID: &'static str = "heartbeat";

    pub fn from_spec(spec: ModuleSpec) -> bot_core::Result<Self> {
        let schedule = match spec.options.get("schedule") {
            Some(raw) => serde_json::from_value::<Schedule>(raw.clone()).map_err(|e| TemplateError::Module {
                module_id: spec.module_id.clone(),
                message: format!("invalid schedule {}: {}", raw, e),
            })?,
            None => Schedule::from(DEFAULT_SCHEDULE),
        };
        Ok(Self {
            module_id: spec.module_id,
            schedule,
        })
    }

    pub fn task_name(&self) -> String {
        format!("{}.tick", self.module_id)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

impl BotModule for HeartbeatModule {
    fn id(&self) -> &str {
        &self.module_id
    }

    fn tasks(&self) -> Vec<TaskNode> {
        vec![TaskNode::from_fn(
            self.task_name(),
            self.schedule.clone(),
            |bot| async move {
                let registries = bot.registries().await;
                info!(
                    brain = %bot.brain(),
                    content = registries.content.len(),
                    triggers = registries.trigger.len(),
                    modules = registries.modules.len(),
                    charts = registries.charts.len(),
                    "Heartbeat"
                );
                Ok(())
            },
        )]
    }

    fn events(&self) -> Vec<EventNode> {
        let mut payload = Map::new();
        payload.insert("schedule".to_string(), json!(self.schedule));
        vec![EventNode {
            name: self.task_name(),
            payload,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler::RecurrenceRule;

    fn spec(options: serde_json::Value) -> ModuleSpec {
        match options {
            serde_json::Value::Object(map) => ModuleSpec::with_options("heartbeat", map),
            _ => ModuleSpec::new("heartbeat"),
        }
    }

    #[test]
    fn test_default_schedule_is_hourly() {
        let module = HeartbeatModule::from_spec(ModuleSpec::new("heartbeat")).unwrap();
        assert_eq!(module.schedule(), &Schedule::Cron("0 * * * *".to_string()));
        assert_eq!(module.tasks()[0].name, "heartbeat.tick");
    }

    #[test]
    fn test_schedule_option_forms() {
        let hour = HeartbeatModule::from_spec(spec(json!({"schedule": 9}))).unwrap();
        assert_eq!(hour.schedule(), &Schedule::Hour(9));
        assert_eq!(
            hour.schedule().normalize(),
            Schedule::Rule(RecurrenceRule::daily_at(9))
        );

        let bad = HeartbeatModule::from_spec(spec(json!({"schedule": true})));
        assert!(matches!(bad, Err(TemplateError::Module { .. })));
    }
}
