use flowcanvas::{NodeKind, Workflow, WorkflowEditor};

fn main() {
    let text = include_str!("./workflow.json");

    let workflow = Workflow::from_json(text).unwrap();
    let mut editor = WorkflowEditor::from_workflow(workflow);

    let crm = editor.add_node(NodeKind::Integration, "Update CRM");
    editor.connect("node3", &crm).unwrap();

    for edge in editor.derived_edges() {
        println!("{} -> {}", edge.source, edge.target);
    }

    let graph = editor.graph().unwrap();
    println!("{}", graph.schema());
}
