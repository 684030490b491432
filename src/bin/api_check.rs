use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use taskdesk::config::TaskDeskConfig;
use taskdesk::core::view::{SortOrder, TaskFilter, parse_due_date, visible_tasks};
use taskdesk::sync::{CredentialProvider, HttpTaskGateway, KeyringCredentials, StaticToken, TaskGateway};

#[tokio::main]
async fn main() {
    if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
        let _ = journal
            .with_syslog_identifier("taskdesk-check".to_string())
            .install();
    }
    log::set_max_level(log::LevelFilter::Info);

    let config = TaskDeskConfig::load();
    println!("=== Task API check: {} ===\n", config.api_url);

    let credentials: Arc<dyn CredentialProvider> = match TaskDeskConfig::env_token() {
        Some(token) => Arc::new(StaticToken(token)),
        None => Arc::new(KeyringCredentials::new(config.keyring_server())),
    };
    if credentials.bearer_token().await.is_none() {
        println!("No token available, requests go out unauthenticated.\n");
    }

    let gateway = match HttpTaskGateway::new(&config.api_url, credentials) {
        Ok(g) => g,
        Err(e) => { println!("Client error: {}", e); return; }
    };

    let persons = match gateway.list_persons().await {
        Ok(p) => p,
        Err(e) => { println!("GET /person failed: {}", e); Vec::new() }
    };
    let tasks = match gateway.list_tasks().await {
        Ok(t) => t,
        Err(e) => { println!("GET /todo failed: {}", e); return; }
    };

    println!("Remote: {} tasks, {} persons\n", tasks.len(), persons.len());

    let names: HashMap<i64, &str> = persons.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut seen_ids = HashSet::new();
    let mut missing_id = 0;
    let mut duplicate_ids = Vec::new();
    let mut dangling_person = Vec::new();
    let mut name_mismatch = Vec::new();
    let mut undated = Vec::new();
    let mut count_mismatch = Vec::new();

    for task in &tasks {
        let label = format!("{} ({})", task.title, task.id.map(|i| i.to_string()).unwrap_or_else(|| "no id".to_string()));
        match task.id {
            Some(id) if !seen_ids.insert(id) => duplicate_ids.push(label.clone()),
            None => missing_id += 1,
            _ => {}
        }
        if let Some(pid) = task.person_id {
            match names.get(&pid) {
                None if !persons.is_empty() => dangling_person.push(format!("{} -> person {}", label, pid)),
                Some(name) if task.person_name.as_deref().is_some_and(|n| n != *name) => {
                    name_mismatch.push(format!(
                        "{}: task says {:?}, person list says {:?}",
                        label, task.person_name.as_deref().unwrap_or(""), name
                    ));
                }
                _ => {}
            }
        }
        if task.due_date.as_deref().and_then(parse_due_date).is_none() {
            undated.push(format!("{} [{}]", label, task.due_date.as_deref().unwrap_or("none")));
        }
        let listed = task.attachment_names().len();
        if !task.attachments.is_empty() && listed != task.number_of_attachments as usize {
            count_mismatch.push(format!("{}: count {} vs {} listed", label, task.number_of_attachments, listed));
        }
    }

    let report = |title: &str, items: &[String]| {
        println!("{}: {}", title, items.len());
        for item in items {
            println!("    {}", item);
        }
    };

    println!("Tasks without id: {}", missing_id);
    report("Duplicate ids", &duplicate_ids[..]);
    report("Unknown person references", &dangling_person[..]);
    report("Person name mismatches", &name_mismatch[..]);
    report("Missing or unparseable due dates", &undated[..]);
    report("Attachment count mismatches", &count_mismatch[..]);

    for filter in [TaskFilter::Completed, TaskFilter::Pending, TaskFilter::Unassigned] {
        println!("{:>10}: {}", filter, visible_tasks(&tasks, filter, SortOrder::Ascending).len());
    }

    println!("\n=== Done ===");
}
