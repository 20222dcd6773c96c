use serde::Deserialize;

/// A node of the activity instance tree of a process instance.
///
/// The root node represents the process instance itself.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInstance {
    /// the id of the activity instance
    pub id: String,
    /// the id of the parent activity instance
    pub parent_activity_instance_id: Option<String>,
    /// the id of the activity
    pub activity_id: String,
    /// the name of the activity
    pub activity_name: Option<String>,
    /// the type of the activity, e.g. `userTask`
    pub activity_type: String,
    /// the process instance the activity instance belongs to
    pub process_instance_id: String,
    /// the process definition of the process instance
    pub process_definition_id: String,
    /// child activity instances
    #[serde(default)]
    pub child_activity_instances: Vec<ActivityInstance>,
    /// child transition instances
    #[serde(default)]
    pub child_transition_instances: Vec<TransitionInstance>,
    /// executions of the activity instance
    #[serde(default)]
    pub execution_ids: Vec<String>,
    /// incidents of the activity instance
    #[serde(default)]
    pub incident_ids: Vec<String>,
}

impl ActivityInstance {
    /// Find the first activity instance of an activity in this subtree,
    /// depth first.
    pub fn find(&self, activity_id: &str) -> Option<&ActivityInstance> {
        if self.activity_id == activity_id {
            return Some(self);
        }
        self.child_activity_instances
            .iter()
            .find_map(|child| child.find(activity_id))
    }
}

/// An execution waiting in an asynchronous continuation before or after an
/// activity.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionInstance {
    /// the id of the transition instance
    pub id: String,
    /// the id of the parent activity instance
    pub parent_activity_instance_id: Option<String>,
    /// the id of the activity
    pub activity_id: String,
    /// the name of the activity
    pub activity_name: Option<String>,
    /// the type of the activity
    pub activity_type: Option<String>,
    /// the process instance the transition instance belongs to
    pub process_instance_id: String,
    /// the process definition of the process instance
    pub process_definition_id: String,
    /// the execution of the transition instance
    pub execution_id: String,
    /// incidents of the transition instance
    #[serde(default)]
    pub incident_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tree_is_searchable() {
        let tree: ActivityInstance = serde_json::from_value(json!({
            "id": "pi-1",
            "parentActivityInstanceId": null,
            "activityId": "invoice:1:7",
            "activityType": "processDefinition",
            "processInstanceId": "pi-1",
            "processDefinitionId": "invoice:1:7",
            "childActivityInstances": [{
                "id": "approve:ai-2",
                "parentActivityInstanceId": "pi-1",
                "activityId": "approve",
                "activityName": "Approve Invoice",
                "activityType": "userTask",
                "processInstanceId": "pi-1",
                "processDefinitionId": "invoice:1:7",
                "childActivityInstances": [],
                "childTransitionInstances": [],
                "executionIds": ["ex-3"],
                "incidentIds": []
            }],
            "childTransitionInstances": [{
                "id": "ti-4",
                "parentActivityInstanceId": "pi-1",
                "activityId": "archive",
                "activityType": "serviceTask",
                "processInstanceId": "pi-1",
                "processDefinitionId": "invoice:1:7",
                "executionId": "ex-5"
            }],
            "executionIds": ["pi-1"]
        }))
        .unwrap();

        let approve = tree.find("approve").unwrap();
        assert_eq!(approve.activity_name.as_deref(), Some("Approve Invoice"));
        assert_eq!(approve.execution_ids, ["ex-3"]);
        assert!(tree.find("missing").is_none());
        assert_eq!(tree.child_transition_instances[0].execution_id, "ex-5");
    }
}
