use std::path::PathBuf;

use chrono::Local;
use log::info;

use crate::info_err;
use crate::m3u_curator_error::M3uCuratorError;
use crate::model::{ItemOrigin, PluginStage};
use crate::processing::plugin::registry::{Plugin, PluginContext};
use crate::utils::file_utils::write_atomically;

const SUMMARY_PLUGIN: &str = "summary";
const MISSING_REPORT_PLUGIN: &str = "missing_report";

/// Creates a built-in plugin, its settings are checked here.
pub fn create_plugin(name: &str, settings: &serde_json::Value) -> Result<Box<dyn Plugin>, M3uCuratorError> {
    match name {
        SUMMARY_PLUGIN => Ok(Box::new(SummaryPlugin)),
        MISSING_REPORT_PLUGIN => {
            let settings: MissingReportSettings = serde_json::from_value(settings.clone())
                .map_err(|err| info_err!("invalid settings for plugin {}: {}", name, err))?;
            if settings.file.trim().is_empty() {
                return Err(info_err!("plugin {} needs a file", name));
            }
            Ok(Box::new(MissingReportPlugin { settings }))
        }
        _ => Err(info_err!("unknown plugin {}", name)),
    }
}

/// Logs item and missing counts.
pub struct SummaryPlugin;

impl Plugin for SummaryPlugin {
    fn name(&self) -> &str {
        SUMMARY_PLUGIN
    }

    fn run(&self, stage: PluginStage, ctx: &mut PluginContext) -> Result<(), M3uCuratorError> {
        let result = &ctx.result;
        let groups = result.items.iter().filter(|item| matches!(item.origin, ItemOrigin::Group(_))).count();
        let invalid = result.items.iter().filter(|item| item.is_invalid()).count();
        info!("[{}] channels: {}, group channels: {}, invalid: {}, missing: {}",
            stage, result.items.len() - groups, groups, invalid, result.missing.len());
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub enum ReportFormat {
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissingReportSettings {
    /// relative to the working directory
    pub file: String,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Writes the ids of unresolved channels to a file.
pub struct MissingReportPlugin {
    settings: MissingReportSettings,
}

impl MissingReportPlugin {
    fn render(&self, missing: &[String]) -> Result<String, M3uCuratorError> {
        let created_at = Local::now().to_rfc3339();
        match self.settings.format {
            ReportFormat::Text => {
                let mut content = format!("# missing channels {created_at}\n");
                for id in missing {
                    content.push_str(id);
                    content.push('\n');
                }
                Ok(content)
            }
            ReportFormat::Json => {
                let report = serde_json::json!({
                    "created_at": created_at,
                    "missing": missing,
                });
                serde_json::to_string_pretty(&report).map_err(|err| info_err!("cant serialize missing report: {}", err))
            }
        }
    }
}

impl Plugin for MissingReportPlugin {
    fn name(&self) -> &str {
        MISSING_REPORT_PLUGIN
    }

    fn run(&self, _stage: PluginStage, ctx: &mut PluginContext) -> Result<(), M3uCuratorError> {
        let path = ctx.working_dir.join(PathBuf::from(&self.settings.file));
        let content = self.render(&ctx.result.missing)?;
        write_atomically(&path, content.as_bytes())
            .map_err(|err| info_err!("cant write missing report {}: {}", path.display(), err))?;
        info!("missing report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::model::PluginStage;
    use crate::processing::plugin::{create_plugin, PluginContext};

    #[test]
    fn test_create_plugin_checks_settings() {
        assert!(create_plugin("summary", &serde_json::Value::Null).is_ok());
        assert!(create_plugin("missing_report", &serde_json::Value::Null).is_err());
        assert!(create_plugin("missing_report", &json!({"file": ""})).is_err());
        assert!(create_plugin("missing_report", &json!({"file": "m.txt", "colour": "red"})).is_err());
        assert!(create_plugin("missing_report", &json!({"file": "m.txt", "format": "xml"})).is_err());
    }

    #[test]
    fn test_missing_report_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = PluginContext { working_dir: dir.path().to_path_buf(), ..Default::default() };
        ctx.result.missing = vec!["A".to_string(), "C".to_string()];

        let text = create_plugin("missing_report", &json!({"file": "missing.txt"})).unwrap();
        text.run(PluginStage::ChannelsAfter, &mut ctx).unwrap();
        let content = std::fs::read_to_string(dir.path().join("missing.txt")).unwrap();
        assert!(content.starts_with("# missing channels "));
        assert!(content.ends_with("A\nC\n"));

        let as_json = create_plugin("missing_report", &json!({"file": "missing.json", "format": "json"})).unwrap();
        as_json.run(PluginStage::ChannelsAfter, &mut ctx).unwrap();
        let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(dir.path().join("missing.json")).unwrap()).unwrap();
        assert_eq!(report["missing"], json!(["A", "C"]));
    }
}
