//! Receptor mesh catalog
//!
//! The tools, resources and prompts served by `receptor-mcp-server`. Every
//! handler answers with fixed placeholder data; nothing here talks to a
//! Receptor node yet.

use {
    crate::{
        handler::HandlerContext,
        types::{
            PromptArgument, PromptDescriptor, PromptMessage, PromptsGetResult, ResourceContent,
            ResourceDescriptor, ResourcesReadResult,
        },
        McpServer,
    },
    schemars::JsonSchema,
    serde::Deserialize,
    serde_json::{json, value::RawValue, Map, Value},
    std::future::{ready, Ready},
};

const JSON_MIME: &str = "application/json";

/// Register the whole catalog on `server`
pub async fn register_receptor_catalog(server: &McpServer) {
    register_tools(server).await;
    register_resources(server).await;
    register_prompts(server).await;
}

// Tools

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SubmitWorkInput {
    /// Target node ID for work execution
    pub node_id: String,
    /// Type of work to execute (e.g., ai-script, compute-task)
    pub work_type: String,
    /// Work payload data
    pub payload: String,
    /// Additional parameters for work execution
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkIdInput {
    /// Work ID returned from submit_work
    pub work_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListNodesInput {
    /// Optional filter for node selection
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NodeIdInput {
    /// Node ID to get information for
    pub node_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmptyInput {}

type ToolOutput = Ready<anyhow::Result<Value>>;

async fn register_tools(server: &McpServer) {
    server
        .register_typed_tool(
            "submit_work",
            "Submit work to a Receptor node for execution",
            |input: SubmitWorkInput, _ctx| -> ToolOutput {
                ready(Ok(json!({
                    "work_id": "work_123456",
                    "node_id": input.node_id,
                    "work_type": input.work_type,
                    "status": "submitted",
                    "message": "Work submitted successfully (placeholder)",
                })))
            },
        )
        .await;

    server
        .register_typed_tool(
            "get_work_status",
            "Get the status of submitted work",
            |input: WorkIdInput, _ctx| -> ToolOutput {
                ready(Ok(json!({
                    "work_id": input.work_id,
                    "status": "running",
                    "progress": 50,
                    "message": "Work is currently running (placeholder)",
                })))
            },
        )
        .await;

    server
        .register_typed_tool(
            "list_nodes",
            "List all nodes in the Receptor mesh",
            |input: ListNodesInput, _ctx| -> ToolOutput {
                let nodes: Vec<Value> = [
                    ("controller", "controller"),
                    ("worker-01", "worker"),
                    ("worker-02", "worker"),
                ]
                .into_iter()
                .filter(|(id, kind)| {
                    input
                        .filter
                        .as_deref()
                        .map_or(true, |f| id.contains(f) || kind.contains(f))
                })
                .map(|(id, kind)| json!({ "id": id, "status": "connected", "type": kind }))
                .collect();
                ready(Ok(json!({
                    "nodes": nodes,
                    "message": "Node list (placeholder)",
                })))
            },
        )
        .await;

    server
        .register_typed_tool(
            "get_node_info",
            "Get detailed information about a specific node",
            |input: NodeIdInput, _ctx| -> ToolOutput {
                ready(Ok(json!({
                    "node_id": input.node_id,
                    "status": "connected",
                    "capabilities": ["work-command", "control-service"],
                    "connections": ["worker-01", "worker-02"],
                    "message": "Node info (placeholder)",
                })))
            },
        )
        .await;

    server
        .register_typed_tool(
            "get_mesh_status",
            "Get overall mesh network status and topology",
            |_input: EmptyInput, _ctx| -> ToolOutput {
                ready(Ok(json!({
                    "topology": "mesh",
                    "nodes": 3,
                    "connections": 2,
                    "health": "healthy",
                    "message": "Mesh status (placeholder)",
                })))
            },
        )
        .await;

    server
        .register_typed_tool(
            "cancel_work",
            "Cancel running or pending work",
            |input: WorkIdInput, _ctx| -> ToolOutput {
                ready(Ok(json!({
                    "work_id": input.work_id,
                    "status": "cancelled",
                    "message": "Work cancelled successfully (placeholder)",
                })))
            },
        )
        .await;

    server
        .register_typed_tool(
            "get_work_results",
            "Retrieve results from completed work",
            |input: WorkIdInput, _ctx| -> ToolOutput {
                ready(Ok(json!({
                    "work_id": input.work_id,
                    "status": "completed",
                    "results": "Task completed successfully",
                    "logs": "2024-01-01 12:00:00 Task started\n2024-01-01 12:01:00 Task completed",
                    "message": "Work results (placeholder)",
                })))
            },
        )
        .await;
}

// Resources

const MESH_TOPOLOGY: &str = r#"{"topology": "mesh", "nodes": ["controller", "worker-01", "worker-02"], "connections": [{"from": "controller", "to": "worker-01"}, {"from": "controller", "to": "worker-02"}]}"#;
const NODE_STATUS: &str = r#"{"nodes": [{"id": "controller", "status": "connected", "load": 0.2}, {"id": "worker-01", "status": "connected", "load": 0.5}, {"id": "worker-02", "status": "connected", "load": 0.3}]}"#;
const WORK_QUEUE: &str = r#"{"active": [{"work_id": "work_123456", "status": "running", "node_id": "worker-01"}], "pending": []}"#;
const WORK_HISTORY: &str = r#"{"completed": [{"work_id": "work_123455", "status": "completed", "node_id": "worker-01", "duration": "30s"}], "failed": []}"#;

fn static_resource(
    uri: &'static str,
    text: &'static str,
) -> impl Fn(HandlerContext, Box<RawValue>) -> Ready<anyhow::Result<Value>> + Send + Sync + 'static {
    move |_ctx, _params| {
        let result = ResourcesReadResult {
            contents: vec![ResourceContent::text(uri, JSON_MIME, text)],
        };
        ready(serde_json::to_value(result).map_err(Into::into))
    }
}

async fn register_resources(server: &McpServer) {
    let resources = [
        (
            "receptor://mesh/topology",
            "Mesh Topology",
            "Real-time mesh network topology information",
            MESH_TOPOLOGY,
        ),
        (
            "receptor://nodes/status",
            "Node Status",
            "Current status of all nodes in the mesh",
            NODE_STATUS,
        ),
        (
            "receptor://work/queue",
            "Work Queue",
            "Active and pending work items",
            WORK_QUEUE,
        ),
        (
            "receptor://work/history",
            "Work History",
            "Historical work execution data",
            WORK_HISTORY,
        ),
    ];

    for (uri, name, description, text) in resources {
        server
            .register_resource(
                ResourceDescriptor::new(uri, name)
                    .with_description(description)
                    .with_mime_type(JSON_MIME),
                static_resource(uri, text),
            )
            .await;
    }
}

// Prompts

const DEPLOY_WORKFLOW: &str = "I need help deploying a workflow across my Receptor mesh. Here are the steps to consider:\n\n1. **Assess Current Mesh Status**: First, check the health and capacity of your mesh nodes\n2. **Define Workflow Requirements**: Specify the work types, dependencies, and resource requirements\n3. **Plan Node Distribution**: Choose optimal nodes based on capabilities and current load\n4. **Submit Work in Sequence**: Deploy workflow components in the correct order\n5. **Monitor Progress**: Track execution and handle any failures\n\nWhat type of workflow would you like to deploy?";

const TROUBLESHOOT_MESH: &str = "Let's troubleshoot your Receptor mesh network. Common issues and solutions:\n\n**Connection Issues:**\n- Check network connectivity between nodes\n- Verify firewall rules and port accessibility\n- Confirm TLS certificates are valid\n\n**Performance Issues:**\n- Monitor node resource usage (CPU, memory)\n- Check work queue backlogs\n- Analyze network latency between nodes\n\n**Work Execution Problems:**\n- Verify work types are properly configured\n- Check node capabilities and permissions\n- Review work execution logs\n\nWhat specific issue are you experiencing?";

const OPTIMIZE_WORKLOAD: &str = "Here are strategies to optimize your Receptor workloads:\n\n**Load Balancing:**\n- Distribute work evenly across available nodes\n- Use node capabilities to match work types\n- Monitor and adjust based on node performance\n\n**Resource Optimization:**\n- Configure appropriate work concurrency limits\n- Optimize work payload sizes\n- Use work signing for security without performance impact\n\n**Network Efficiency:**\n- Minimize data transfer between nodes\n- Use local resources when possible\n- Consider edge nodes for geographically distributed work\n\n**Monitoring and Tuning:**\n- Track work execution times and success rates\n- Monitor resource utilization trends\n- Adjust timeout values based on work complexity\n\nWhat aspect of your workload would you like to optimize?";

fn static_prompt(
    description: &'static str,
    text: &'static str,
) -> impl Fn(HandlerContext, Box<RawValue>) -> Ready<anyhow::Result<Value>> + Send + Sync + 'static {
    move |_ctx, _params| {
        let result = PromptsGetResult {
            description: Some(description.to_string()),
            messages: vec![PromptMessage::user(text)],
        };
        ready(serde_json::to_value(result).map_err(Into::into))
    }
}

async fn register_prompts(server: &McpServer) {
    server
        .register_prompt(
            PromptDescriptor::new("deploy_workflow")
                .with_description("Guide for deploying complex workflows across the mesh")
                .with_argument(PromptArgument::required("workflow_type", "Type of workflow to deploy"))
                .with_argument(PromptArgument::optional("target_nodes", "Target nodes for deployment")),
            static_prompt("Workflow deployment guidance", DEPLOY_WORKFLOW),
        )
        .await;

    server
        .register_prompt(
            PromptDescriptor::new("troubleshoot_mesh")
                .with_description("Mesh network troubleshooting assistant")
                .with_argument(PromptArgument::optional("issue_type", "Type of issue being experienced")),
            static_prompt("Mesh troubleshooting guidance", TROUBLESHOOT_MESH),
        )
        .await;

    server
        .register_prompt(
            PromptDescriptor::new("optimize_workload")
                .with_description("Workload optimization recommendations")
                .with_argument(PromptArgument::optional("workload_pattern", "Current workload pattern"))
                .with_argument(PromptArgument::optional(
                    "performance_goals",
                    "Performance optimization goals",
                )),
            static_prompt("Workload optimization recommendations", OPTIMIZE_WORKLOAD),
        )
        .await;
}
