use crate::core::form::FormState;
use crate::core::person::Person;
use crate::core::task::{Task, TaskId, TaskPayload};
use crate::core::view::{self, SortOrder, TaskFilter};
use crate::error::{TaskError, TaskResult};
use crate::message::{FormMessage, Notice};
use crate::sync::TaskGateway;

const DELETE_PROMPT: &str = "Delete this task?";

/// Presents notices to the user (dialog, toast, log line...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Asks the user to confirm a destructive action.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Notifier that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(text) => log::info!("{}", text),
            Notice::Error(text) => log::error!("{}", text),
        }
    }
}

/// Owns the task collection, the form, and the view settings.
///
/// The collection only changes after the gateway confirms a mutation.
/// Sorting and filtering happen on read in [`visible_tasks`](Self::visible_tasks).
pub struct TaskListController<G, N, C> {
    gateway: G,
    notifier: N,
    confirmer: C,
    tasks: Vec<Task>,
    persons: Vec<Person>,
    form: FormState,
    loading: bool,
    filter: TaskFilter,
    sort_order: SortOrder,
}

impl<G, N, C> TaskListController<G, N, C>
where
    G: TaskGateway,
    N: Notifier,
    C: Confirmer,
{
    pub fn new(gateway: G, notifier: N, confirmer: C) -> Self {
        Self {
            gateway,
            notifier,
            confirmer,
            tasks: Vec::new(),
            persons: Vec::new(),
            form: FormState::default(),
            loading: false,
            filter: TaskFilter::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_editing()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == Some(id))
    }

    /// Initial load: persons first, then tasks. A person failure does not stop the task load.
    pub async fn mount(&mut self) -> TaskResult<()> {
        if let Err(e) = self.load_persons().await {
            log::debug!("Continuing without persons: {}", e);
        }
        self.load_tasks().await
    }

    pub async fn load_persons(&mut self) -> TaskResult<()> {
        self.loading = true;
        let result = self.gateway.list_persons().await;
        self.loading = false;

        match result {
            Ok(persons) => {
                log::debug!("Loaded {} persons", persons.len());
                self.persons = persons;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load persons: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn load_tasks(&mut self) -> TaskResult<()> {
        self.loading = true;
        let result = self.gateway.list_tasks().await;
        self.loading = false;

        match result {
            Ok(mut tasks) => {
                tasks.sort_by(view::compare_due_date);
                log::info!("Loaded {} tasks", tasks.len());
                self.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load tasks: {}", e);
                self.notifier
                    .notify(Notice::Error(format!("Failed to load tasks: {}", e)));
                Err(e.into())
            }
        }
    }

    pub fn apply(&mut self, message: FormMessage) {
        let draft = &mut self.form.draft;
        match message {
            FormMessage::TitleChanged(title) => draft.title = title,
            FormMessage::DescriptionChanged(description) => draft.description = description,
            FormMessage::DueDateChanged(due) => draft.due_date = due,
            FormMessage::PersonSelected(person) => draft.person_id = person,
            FormMessage::CompletedChanged(completed) => draft.completed = completed,
            FormMessage::FilesSelected(files) => self.form.files = files,
            FormMessage::FilesCleared => self.form.files.clear(),
        }
    }

    /// Snapshot a loaded task into the form and switch to edit mode.
    pub fn begin_edit(&mut self, id: TaskId) -> TaskResult<()> {
        let form = FormState::editing(self.task(id).ok_or(TaskError::UnknownTask(id))?);
        self.form = form;
        log::debug!("Editing task {}", id);
        Ok(())
    }

    /// Back to create mode, dropping the draft and staged files.
    pub fn cancel_edit(&mut self) {
        self.form.reset();
    }

    /// Validate the form and create or update the task it describes.
    pub async fn submit(&mut self) -> TaskResult<Task> {
        let payload = match self.form.payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.notifier.notify(Notice::Error(e.to_string()));
                return Err(e.into());
            }
        };

        self.loading = true;
        let editing = self.form.editing_id();
        let result = match editing {
            Some(id) => self.gateway.update_task(id, &payload, &self.form.files).await,
            None => self.gateway.create_task(&payload, &self.form.files).await,
        };
        self.loading = false;

        match result {
            Ok(task) => {
                if editing.is_some() {
                    self.replace_task(task.clone());
                    self.notifier.notify(Notice::Info("Task updated".to_string()));
                } else {
                    self.tasks.insert(0, task.clone());
                    self.notifier.notify(Notice::Info("Task created".to_string()));
                }
                self.form.reset();
                Ok(task)
            }
            Err(e) => {
                log::error!("Save failed: {}", e);
                self.notifier.notify(Notice::Error(format!("Save failed: {}", e)));
                Err(e.into())
            }
        }
    }

    /// Flip completion on a loaded task. The form is left alone.
    pub async fn toggle_complete(&mut self, id: TaskId) -> TaskResult<Task> {
        let payload = match self.task(id) {
            Some(task) => TaskPayload::toggled(task),
            None => return Err(TaskError::UnknownTask(id)),
        };

        self.loading = true;
        let result = self.gateway.update_task(id, &payload, &[]).await;
        self.loading = false;

        match result {
            Ok(task) => {
                self.replace_task(task.clone());
                Ok(task)
            }
            Err(e) => {
                log::error!("Toggle failed: {}", e);
                self.notifier.notify(Notice::Error(format!("Toggle failed: {}", e)));
                Err(e.into())
            }
        }
    }

    /// Delete after confirmation. Returns `Ok(false)` when the user declines.
    pub async fn delete(&mut self, id: TaskId) -> TaskResult<bool> {
        if !self.confirmer.confirm(DELETE_PROMPT) {
            log::debug!("Delete of task {} declined", id);
            return Ok(false);
        }

        self.loading = true;
        let result = self.gateway.delete_task(id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.tasks.retain(|t| t.id != Some(id));
                self.notifier.notify(Notice::Info("Deleted".to_string()));
                Ok(true)
            }
            Err(e) => {
                log::error!("Delete failed: {}", e);
                self.notifier.notify(Notice::Error(format!("Delete failed: {}", e)));
                Err(e.into())
            }
        }
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
    }

    /// Show everything, earliest due first.
    pub fn reset_view(&mut self) {
        self.filter = TaskFilter::All;
        self.sort_order = SortOrder::Ascending;
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        view::visible_tasks(&self.tasks, self.filter, self.sort_order)
    }

    fn replace_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id.is_some() && t.id == task.id) {
            Some(slot) => *slot = task,
            None => log::debug!("Updated task {:?} is not in the collection", task.id),
        }
    }
}
