use std::sync::Arc;

use squadflow::{Agent, Config, EditorBuilder, ExitChoice, ExitRequest, MemStore, PhoneNumber, WorkflowRecord};

#[tokio::main]
async fn main() {
    let config = Config::load_from_str(include_str!("./config.toml")).unwrap();

    let record = WorkflowRecord::from_json(include_str!("./workflow.json")).unwrap();
    let store = MemStore::new();
    store.insert_agents(
        "client-1",
        vec![
            Agent::new("1", "agent-reception", "Reception"),
            Agent::new("2", "agent-sales", "Sales"),
            Agent::new("3", "agent-support", "Support"),
            Agent::new("4", "agent-billing", "Billing"),
        ],
    );
    store.insert_phone_numbers(
        "client-1",
        vec![PhoneNumber::new("pn-1", "+15550100").assigned_to(record.id.clone()), PhoneNumber::new("pn-2", "+15550101")],
    );
    store.insert_workflow(record.clone());

    let editor = EditorBuilder::new(Arc::new(store.clone())).config(config).client_id("client-1").open(&record.id).await.unwrap();

    let flow = editor.flow();
    for node in flow.graph.nodes() {
        println!("{:<16} {:?}", node.id(), node.position());
    }

    editor.add_agent("agent-billing");
    let edge = editor.connect("agent-sales", "agent-billing").unwrap();
    editor.begin_edge_edit(&edge);
    editor.edit_edge_description(&edge, "caller asks about an invoice");
    editor.edit_edge_message(&edge, "Let me get billing for you.");
    editor.commit_edge_edit(&edge);
    editor.arrange();

    if editor.request_exit() == ExitRequest::Confirm {
        let outcome = editor.resolve_exit(ExitChoice::SaveAndExit).await;
        println!("Exit: {:?}", outcome);
    }

    for notification in editor.notifications().drain() {
        println!("[{}] {}", notification.level.as_ref(), notification.message);
    }

    let saved = store.workflow(&record.id).unwrap();
    println!("Saved: {}", saved.to_json().unwrap());
}
