use crate::{
    batch::Batch,
    client::Client,
    request::is_false,
    variable::{Variable, Variables},
    Error, Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

const RESOURCE: &str = "migration";

/// Maps activities of the source definition to activities of the target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationInstruction {
    /// activities of the source process definition
    pub source_activity_ids: Vec<String>,
    /// activities of the target process definition
    pub target_activity_ids: Vec<String>,
    /// whether event triggers are updated to the target definition
    #[serde(default)]
    pub update_event_trigger: bool,
}

impl MigrationInstruction {
    /// Map a single source activity to a single target activity.
    pub fn new<S: Into<String>, T: Into<String>>(source_activity_id: S, target_activity_id: T) -> Self {
        MigrationInstruction {
            source_activity_ids: vec![source_activity_id.into()],
            target_activity_ids: vec![target_activity_id.into()],
            update_event_trigger: false,
        }
    }

    /// Update the event trigger of the mapped activity.
    pub fn with_update_event_trigger(self, update_event_trigger: bool) -> Self {
        MigrationInstruction {
            update_event_trigger,
            ..self
        }
    }
}

/// How instances of one process definition migrate to another.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    /// the definition instances are migrated from
    pub source_process_definition_id: String,
    /// the definition instances are migrated to
    pub target_process_definition_id: String,
    /// the activity mappings
    #[serde(default)]
    pub instructions: Vec<MigrationInstruction>,
    /// variables set on migrated process instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
}

impl MigrationPlan {
    /// An empty plan between two definitions.
    pub fn new<S: Into<String>, T: Into<String>>(source: S, target: T) -> Self {
        MigrationPlan {
            source_process_definition_id: source.into(),
            target_process_definition_id: target.into(),
            ..Default::default()
        }
    }

    /// Add an activity mapping.
    pub fn with_instruction(mut self, instruction: MigrationInstruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Set a variable on migrated process instances.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.variables
            .get_or_insert_with(Variables::new)
            .insert(name.into(), variable);
        self
    }
}

/// Validation failures of a single instruction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationInstructionReport {
    /// the instruction that failed validation
    pub instruction: MigrationInstruction,
    /// why the instruction is invalid
    pub failures: Vec<String>,
}

/// Validation failures of a plan variable.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationVariableReport {
    /// the variable that failed validation
    #[serde(flatten)]
    pub variable: Variable,
    /// why the variable is invalid
    pub failures: Vec<String>,
}

/// Result of validating a migration plan.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlanReport {
    /// failures per instruction
    #[serde(default)]
    pub instruction_reports: Vec<MigrationInstructionReport>,
    /// failures per variable
    #[serde(default)]
    pub variable_reports: BTreeMap<String, MigrationVariableReport>,
}

impl MigrationPlanReport {
    /// Whether the plan passed validation.
    pub fn is_valid(&self) -> bool {
        self.instruction_reports.is_empty() && self.variable_reports.is_empty()
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateMigrationRequest {
    source_process_definition_id: String,
    target_process_definition_id: String,
    #[serde(skip_serializing_if = "is_false")]
    update_event_triggers: bool,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
}

impl Client {
    /// Generates a migration plan mapping equal activities of two definitions.
    pub fn generate_migration_plan<S: Into<String>, T: Into<String>>(
        &self,
        source_process_definition_id: S,
        target_process_definition_id: T,
    ) -> GenerateMigrationPlanBuilder {
        GenerateMigrationPlanBuilder::new(
            self.clone(),
            source_process_definition_id,
            target_process_definition_id,
        )
    }

    /// Validates a migration plan.
    pub fn validate_migration_plan(&self, plan: MigrationPlan) -> ValidateMigrationPlanBuilder {
        ValidateMigrationPlanBuilder::new(self.clone(), plan)
    }

    /// Migrates process instances according to a plan.
    pub fn execute_migration(&self, plan: MigrationPlan) -> ExecuteMigrationBuilder {
        ExecuteMigrationBuilder::new(self.clone(), plan)
    }
}

/// Generates a migration plan.
#[derive(Debug)]
pub struct GenerateMigrationPlanBuilder {
    client: Client,
    request: GenerateMigrationRequest,
}

impl GenerateMigrationPlanBuilder {
    /// Create a new generate migration plan builder.
    pub fn new<S: Into<String>, T: Into<String>>(client: Client, source: S, target: T) -> Self {
        GenerateMigrationPlanBuilder {
            client,
            request: GenerateMigrationRequest {
                source_process_definition_id: source.into(),
                target_process_definition_id: target.into(),
                ..Default::default()
            },
        }
    }

    /// Update event triggers of all generated instructions.
    pub fn with_update_event_triggers(mut self, update_event_triggers: bool) -> Self {
        self.request.update_event_triggers = update_event_triggers;
        self
    }

    /// Set a variable on migrated process instances.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Submit the generate migration plan request.
    #[tracing::instrument(skip(self), name = "generate_migration_plan", err)]
    pub async fn send(self) -> Result<MigrationPlan> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "generate"])
            .json(&self.request)
            .send()
            .await
    }
}

/// Validates a migration plan.
#[derive(Debug)]
pub struct ValidateMigrationPlanBuilder {
    client: Client,
    plan: MigrationPlan,
}

impl ValidateMigrationPlanBuilder {
    /// Create a new validate migration plan builder.
    pub fn new(client: Client, plan: MigrationPlan) -> Self {
        ValidateMigrationPlanBuilder { client, plan }
    }

    /// Submit the validate migration plan request.
    #[tracing::instrument(skip(self), name = "validate_migration_plan", err)]
    pub async fn send(self) -> Result<MigrationPlanReport> {
        trace!(plan = ?self.plan, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "validate"])
            .json(&self.plan)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteMigrationRequest {
    migration_plan: MigrationPlan,
    process_instance_ids: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
}

/// Migrates process instances, either synchronously or as a batch.
#[derive(Debug)]
pub struct ExecuteMigrationBuilder {
    client: Client,
    request: ExecuteMigrationRequest,
}

impl ExecuteMigrationBuilder {
    /// Create a new execute migration builder.
    pub fn new(client: Client, plan: MigrationPlan) -> Self {
        ExecuteMigrationBuilder {
            client,
            request: ExecuteMigrationRequest {
                migration_plan: plan,
                process_instance_ids: Vec::new(),
                skip_custom_listeners: false,
                skip_io_mappings: false,
            },
        }
    }

    /// Migrate the process instance.
    pub fn with_process_instance_id<T: Into<String>>(mut self, id: T) -> Self {
        self.request.process_instance_ids.push(id.into());
        self
    }

    /// Migrate the process instances.
    pub fn with_process_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.request.process_instance_ids.extend(ids);
        self
    }

    /// Skip execution listeners of the migrated activities.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.request.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Skip input and output mappings of the migrated activities.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.request.skip_io_mappings = skip_io_mappings;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.request.process_instance_ids.is_empty() {
            return Err(Error::InvalidParameters(
                "at least one process instance id must be set",
            ));
        }
        Ok(())
    }

    /// Migrate the process instances and wait for completion.
    #[tracing::instrument(skip(self), name = "execute_migration", err)]
    pub async fn send(self) -> Result<()> {
        self.validate()?;
        debug!(count = self.request.process_instance_ids.len(), "migrating process instances");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "execute"])
            .json(&self.request)
            .send_empty()
            .await
    }

    /// Migrate the process instances in a batch.
    #[tracing::instrument(skip(self), name = "execute_migration_async", err)]
    pub async fn send_async(self) -> Result<Batch> {
        self.validate()?;
        debug!(count = self.request.process_instance_ids.len(), "scheduling migration batch");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "executeAsync"])
            .json(&self.request)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_serializes_instructions() {
        let plan = MigrationPlan::new("invoice:1:7", "invoice:2:9")
            .with_instruction(MigrationInstruction::new("approve", "approveInvoice"));

        assert_eq!(
            serde_json::to_value(&plan).unwrap(),
            json!({
                "sourceProcessDefinitionId": "invoice:1:7",
                "targetProcessDefinitionId": "invoice:2:9",
                "instructions": [{
                    "sourceActivityIds": ["approve"],
                    "targetActivityIds": ["approveInvoice"],
                    "updateEventTrigger": false
                }]
            })
        );
    }

    #[test]
    fn report_without_failures_is_valid() {
        let report: MigrationPlanReport =
            serde_json::from_value(json!({"instructionReports": [], "variableReports": {}})).unwrap();
        assert!(report.is_valid());

        let report: MigrationPlanReport = serde_json::from_value(json!({
            "instructionReports": [{
                "instruction": {
                    "sourceActivityIds": ["a"],
                    "targetActivityIds": ["b"],
                    "updateEventTrigger": false
                },
                "failures": ["activity b does not exist"]
            }]
        }))
        .unwrap();
        assert!(!report.is_valid());
    }
}
