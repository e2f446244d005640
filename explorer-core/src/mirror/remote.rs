use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mirror::protocol::{
    CreateTask, DeleteTask, FindTask, ListLists, RequestAccess, SetCompletion, UpdateTask,
};
use crate::mirror::provider::Provider;
use crate::mirror::{FoundTask, MirrorResult, MirrorTask, TaskList, TaskMirror};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A task list reached through a provider binary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }
}

#[async_trait]
impl TaskMirror for Remote {
    async fn request_access(&self) -> MirrorResult<bool> {
        Ok(self
            .provider
            .call_interactive(RequestAccess {
                remote_config: self.remote_config(),
            })
            .await?)
    }

    async fn lists(&self) -> MirrorResult<Vec<TaskList>> {
        Ok(self
            .provider
            .call(ListLists {
                remote_config: self.remote_config(),
            })
            .await?)
    }

    async fn create_task(&self, list_id: &str, task: &MirrorTask) -> MirrorResult<String> {
        Ok(self
            .provider
            .call(CreateTask {
                remote_config: self.remote_config(),
                list_id: list_id.to_string(),
                task: task.clone(),
            })
            .await?)
    }

    async fn update_task(&self, task_id: &str, task: &MirrorTask) -> MirrorResult<()> {
        Ok(self
            .provider
            .call(UpdateTask {
                remote_config: self.remote_config(),
                task_id: task_id.to_string(),
                task: task.clone(),
            })
            .await?)
    }

    async fn delete_task(&self, task_id: &str) -> MirrorResult<()> {
        Ok(self
            .provider
            .call(DeleteTask {
                remote_config: self.remote_config(),
                task_id: task_id.to_string(),
            })
            .await?)
    }

    async fn find_task_by_tag(&self, tag: &str) -> MirrorResult<Option<FoundTask>> {
        Ok(self
            .provider
            .call(FindTask {
                remote_config: self.remote_config(),
                tag: tag.to_string(),
            })
            .await?)
    }

    async fn set_completion(&self, task_id: &str, completed: bool) -> MirrorResult<()> {
        Ok(self
            .provider
            .call(SetCompletion {
                remote_config: self.remote_config(),
                task_id: task_id.to_string(),
                completed,
            })
            .await?)
    }
}
