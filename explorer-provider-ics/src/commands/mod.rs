pub mod create_task;
pub mod delete_task;
pub mod find_task;
pub mod list_lists;
pub mod request_access;
pub mod set_completion;
pub mod update_task;

#[cfg(test)]
mod tests {
    //! Full command round trips against a temporary task directory.

    use chrono::{TimeZone, Utc};
    use explorer_core::mirror::MirrorTask;
    use explorer_core::mirror::protocol::{
        CreateTask, DeleteTask, FindTask, ListLists, RequestAccess, SetCompletion, UpdateTask,
    };
    use explorer_core::reminder::correlation_tag;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::task_dir::TaskNotFound;

    type ConfigMap = serde_json::Map<String, serde_json::Value>;

    fn setup(access: &str) -> (TempDir, ConfigMap) {
        let tmp = tempfile::tempdir().unwrap();
        let config = json!({
            "ics_dir": tmp.path().join("tasks").to_string_lossy(),
            "ics_default_list": "inbox",
            "ics_access": access,
        });
        (tmp, config.as_object().cloned().unwrap())
    }

    fn task(day: u32) -> MirrorTask {
        MirrorTask {
            title: "Buy milk".into(),
            notes: correlation_tag("r-1"),
            due: Some(Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()),
            completed: false,
        }
    }

    async fn create(config: &ConfigMap, day: u32) -> String {
        super::create_task::handle(CreateTask {
            remote_config: config.clone(),
            list_id: "inbox".into(),
            task: task(day),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn access_creates_layout() {
        let (tmp, config) = setup("granted");

        let granted = super::request_access::handle(RequestAccess {
            remote_config: config.clone(),
        })
        .await
        .unwrap();
        assert!(granted);
        assert!(tmp.path().join("tasks/inbox").is_dir());

        let lists = super::list_lists::handle(ListLists {
            remote_config: config,
        })
        .await
        .unwrap();
        assert_eq!(lists.len(), 1);
        assert!(lists[0].is_default);
    }

    #[tokio::test]
    async fn denied_access_refuses_writes() {
        let (tmp, config) = setup("denied");

        let granted = super::request_access::handle(RequestAccess {
            remote_config: config.clone(),
        })
        .await
        .unwrap();
        assert!(!granted);
        assert!(!tmp.path().join("tasks").exists());

        let result = super::create_task::handle(CreateTask {
            remote_config: config,
            list_id: "inbox".into(),
            task: task(20),
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn task_lifecycle() {
        let (_tmp, config) = setup("granted");
        super::request_access::handle(RequestAccess {
            remote_config: config.clone(),
        })
        .await
        .unwrap();

        let id = create(&config, 20).await;

        for day in [21, 22] {
            super::update_task::handle(UpdateTask {
                remote_config: config.clone(),
                task_id: id.clone(),
                task: task(day),
            })
            .await
            .unwrap();
        }

        super::set_completion::handle(SetCompletion {
            remote_config: config.clone(),
            task_id: id.clone(),
            completed: true,
        })
        .await
        .unwrap();

        let found = super::find_task::handle(FindTask {
            remote_config: config.clone(),
            tag: correlation_tag("r-1"),
        })
        .await
        .unwrap();
        let found = found.unwrap();
        assert_eq!(found.task_id, id);
        assert_eq!(found.list_id, "inbox");

        let dir = crate::task_dir::TaskDir::new(
            &crate::remote_config::IcsRemoteConfig::try_from(&config).unwrap(),
        );
        let file = dir.locate(&id).unwrap();
        assert!(file.todo.task.completed);
        assert_eq!(file.todo.task.due, task(22).due);
        assert_eq!(file.todo.alarms, vec![task(22).due.unwrap()]);

        super::delete_task::handle(DeleteTask {
            remote_config: config.clone(),
            task_id: id.clone(),
        })
        .await
        .unwrap();

        let err = super::delete_task::handle(DeleteTask {
            remote_config: config,
            task_id: id,
        })
        .await
        .unwrap_err();
        assert!(err.downcast_ref::<TaskNotFound>().is_some());
    }
}
