use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, error};

use crate::m3u_curator_error::M3uCuratorError;
use crate::model::{Config, ConfigPlugin, PluginStage, ResolutionResult};
use crate::processing::plugin::builtin::create_plugin;

/// State handed to plugins. Plugins may edit the result before it is written.
#[derive(Debug, Default)]
pub struct PluginContext {
    pub working_dir: PathBuf,
    pub result: ResolutionResult,
}

impl PluginContext {
    pub fn new(cfg: &Config) -> Self {
        Self {
            working_dir: PathBuf::from(&cfg.working_dir),
            result: ResolutionResult::default(),
        }
    }
}

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, stage: PluginStage, ctx: &mut PluginContext) -> Result<(), M3uCuratorError>;
}

struct RegisteredPlugin {
    priority: i32,
    plugin: Box<dyn Plugin>,
}

/// Plugins keyed by stage, each list ordered by ascending priority.
#[derive(Default)]
pub struct PluginRegistry {
    handlers: HashMap<PluginStage, Vec<RegisteredPlugin>>,
}

impl PluginRegistry {
    pub fn from_config(plugins: &[ConfigPlugin]) -> Result<Self, M3uCuratorError> {
        let mut registry = Self::default();
        for cfg_plugin in plugins {
            let plugin = create_plugin(&cfg_plugin.name, &cfg_plugin.settings)?;
            registry.register(cfg_plugin.stage, cfg_plugin.priority, plugin);
        }
        for stage in enum_iterator::all::<PluginStage>() {
            debug!("{} plugins registered for {}", registry.count(stage), stage);
        }
        Ok(registry)
    }

    /// Plugins with equal priority run in registration order.
    pub fn register(&mut self, stage: PluginStage, priority: i32, plugin: Box<dyn Plugin>) {
        let list = self.handlers.entry(stage).or_default();
        let pos = list.partition_point(|registered| registered.priority <= priority);
        list.insert(pos, RegisteredPlugin { priority, plugin });
    }

    pub fn count(&self, stage: PluginStage) -> usize {
        self.handlers.get(&stage).map_or(0, Vec::len)
    }

    /// Runs every plugin of `stage`. A failing plugin is logged and the next one runs.
    pub fn notify(&self, stage: PluginStage, ctx: &mut PluginContext) {
        let Some(list) = self.handlers.get(&stage) else {
            return;
        };
        for registered in list {
            debug!("running plugin {} for {}", registered.plugin.name(), stage);
            if let Err(err) = registered.plugin.run(stage, ctx) {
                error!("plugin {} failed at {}: {}", registered.plugin.name(), stage, err.message);
            }
        }
    }
}
