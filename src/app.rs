use crate::domain::achievements::{self, Achievement};
use crate::domain::plan::plan_subtasks;
use crate::domain::settings::{DAILY_HOUR_OPTIONS, POMODORO_PRESETS};
use crate::domain::tips::{self, Quote};
use crate::domain::{next_task_id, FocusError, PlannedStep, ProductiveTime, Settings, Stats, Task, UiMode, View};
use crate::notifications;
use crate::persistence::{BridgeInfo, FocusRepository};
use crate::session::{ActiveSession, SessionTarget};
use crate::sync::SyncClient;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::time::Instant;
use tracing::{error, info, warn};

/// Label used when a focus session is started without one
pub const DEFAULT_FOCUS_LABEL: &str = "Фокус-сессия";

/// Acknowledgment shown after a session completes
#[derive(Clone)]
pub struct CompletionModal {
    pub label: String,
    pub break_minutes: f64,
    pub xp_gained: u32,
    /// The bound subtask reached its estimate with this session
    pub subtask_finished: bool,
    pub unlocked: Vec<&'static Achievement>,
    pub micro_break: &'static str,
    /// Where dismissing the modal leads
    pub return_view: View,
}

/// What a text form is collecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPurpose {
    NewTask,
    FocusLabel,
    RenameSubtask { task_id: String, subtask_id: String },
    RenameDraftStep(usize),
}

/// Input form state for text entry
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub purpose: FormPurpose,
    /// (label, value) pairs
    pub fields: Vec<(&'static str, String)>,
    pub editing_field: usize,
}

impl InputFormState {
    fn new(purpose: FormPurpose, fields: Vec<(&'static str, String)>) -> Self {
        Self {
            purpose,
            fields,
            editing_field: 0,
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|(_, v)| v.trim()).unwrap_or("")
    }
}

/// Plan preview of a task being created
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub deadline: Option<String>,
    pub steps: Vec<PlannedStep>,
    pub selected: usize,
}

impl TaskDraft {
    pub fn total_pomodoros(&self) -> u32 {
        self.steps.iter().map(|s| s.estimated_pomodoros).sum()
    }
}

/// Choices made on the onboarding screen
#[derive(Debug, Clone)]
pub struct OnboardingState {
    /// 0 = daily hours, 1 = productive time, 2 = pomodoro preset
    pub step: usize,
    pub hours_choice: usize,
    pub time_choice: usize,
    pub preset_choice: usize,
}

impl OnboardingState {
    pub const STEPS: usize = 3;

    fn from_settings(settings: &Settings) -> Self {
        let hours_choice = DAILY_HOUR_OPTIONS
            .iter()
            .position(|(h, _)| *h == settings.daily_hours)
            .unwrap_or(1);
        let time_choice = ProductiveTime::all()
            .iter()
            .position(|t| *t == settings.productive_time)
            .unwrap_or(0);
        let preset_choice = POMODORO_PRESETS
            .iter()
            .position(|p| p.work == settings.pomodoro_length)
            .unwrap_or(0);
        Self {
            step: 0,
            hours_choice,
            time_choice,
            preset_choice,
        }
    }

    fn option_count(&self) -> usize {
        match self.step {
            0 => DAILY_HOUR_OPTIONS.len(),
            1 => ProductiveTime::all().len(),
            _ => POMODORO_PRESETS.len(),
        }
    }

    fn choice_mut(&mut self) -> &mut usize {
        match self.step {
            0 => &mut self.hours_choice,
            1 => &mut self.time_choice,
            _ => &mut self.preset_choice,
        }
    }
}

/// Main application state
pub struct AppState {
    repo: FocusRepository,
    sync: Option<SyncClient>,
    pub settings: Settings,
    pub tasks: Vec<Task>,
    pub stats: Stats,
    pub last_session_date: Option<NaiveDate>,
    pub last_label: Option<String>,
    pub bridge: BridgeInfo,

    pub view: View,
    pub ui_mode: UiMode,
    /// Selection in the task list
    pub selected_index: usize,
    /// Selection in the task details view
    pub selected_subtask: usize,
    pub current_task_id: Option<String>,
    pub session: Option<ActiveSession>,
    pub modal: Option<CompletionModal>,
    pub input_form: Option<InputFormState>,
    pub draft: Option<TaskDraft>,
    pub onboarding: OnboardingState,
    pub quote: Quote,
    /// One-line feedback shown in the footer
    pub status: Option<String>,

    /// XP granted when a subtask is checked off by hand
    pub subtask_bonus_xp: u32,
    pub needs_save: bool,
    pub last_tick: Instant,
}

impl AppState {
    pub fn new(repo: FocusRepository) -> Self {
        let settings = repo.load_settings();
        let tasks = repo.load_tasks();
        let stats = repo.load_stats();
        let last_session_date = repo.load_last_session_date();
        let last_label = repo.load_last_label();
        let bridge = repo.load_bridge();
        let sync = SyncClient::from_bridge(&bridge);

        let view = if settings.is_onboarded {
            View::Home
        } else {
            View::Onboarding
        };
        let onboarding = OnboardingState::from_settings(&settings);

        info!(
            "Loaded {} tasks, {} sessions, level {}",
            tasks.len(),
            stats.total_sessions,
            stats.level
        );

        Self {
            repo,
            sync,
            settings,
            tasks,
            stats,
            last_session_date,
            last_label,
            bridge,
            view,
            ui_mode: UiMode::Normal,
            selected_index: 0,
            selected_subtask: 0,
            current_task_id: None,
            session: None,
            modal: None,
            input_form: None,
            draft: None,
            onboarding,
            quote: tips::random_quote(),
            status: None,
            subtask_bonus_xp: 0,
            needs_save: false,
            last_tick: Instant::now(),
        }
    }

    /// Bind this client to a chat session; values given on the command line win
    pub fn bind_bridge(&mut self, overrides: BridgeInfo) {
        if self.bridge.merge(overrides) {
            if let Err(e) = self.repo.save_bridge(&self.bridge) {
                warn!("Failed to save bridge binding: {}", e);
            }
        }
        self.sync = SyncClient::from_bridge(&self.bridge);
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Task shown in the details view
    pub fn current_task(&self) -> Option<&Task> {
        self.current_task_id.as_deref().and_then(|id| self.find_task(id))
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    fn session_bound_to(&self, task_id: &str, subtask_id: Option<&str>) -> bool {
        match self.session.as_ref().map(|s| &s.target) {
            Some(SessionTarget::Subtask { task_id: t, subtask_id: s }) => {
                t == task_id && subtask_id.map_or(true, |id| id == s)
            }
            _ => false,
        }
    }

    /// Log a missing entity and fall back to the task list
    fn missing(&mut self, err: FocusError) -> FocusError {
        error!("{}", err);
        self.go_home();
        err
    }

    fn task_or_missing(&mut self, task_id: &str) -> Result<usize, FocusError> {
        match self.tasks.iter().position(|t| t.id == task_id) {
            Some(index) => Ok(index),
            None => Err(self.missing(FocusError::TaskNotFound(task_id.to_string()))),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    // ---- Navigation ----

    pub fn go_home(&mut self) {
        self.view = View::Home;
        self.ui_mode = UiMode::Normal;
        self.current_task_id = None;
        self.input_form = None;
        self.draft = None;
        self.selected_index = self.selected_index.min(self.tasks.len().saturating_sub(1));
    }

    pub fn open_task(&mut self, task_id: &str) -> Result<(), FocusError> {
        let index = self.task_or_missing(task_id)?;
        self.selected_index = index;
        self.selected_subtask = self.tasks[index]
            .sub_tasks
            .iter()
            .position(|s| !s.completed)
            .unwrap_or(0);
        self.current_task_id = Some(task_id.to_string());
        self.view = View::TaskDetails;
        self.ui_mode = UiMode::Normal;
        Ok(())
    }

    pub fn open_selected_task(&mut self) {
        if let Some(id) = self.tasks.get(self.selected_index).map(|t| t.id.clone()) {
            let _ = self.open_task(&id);
        }
    }

    /// Show statistics, re-running the achievement rules to repair any
    /// unlock lost to an interrupted write
    pub fn open_statistics_at(&mut self, now: DateTime<Utc>) {
        let unlocked = achievements::evaluate(&mut self.stats, now);
        if !unlocked.is_empty() {
            info!("Repaired {} missing achievements", unlocked.len());
            if let Err(e) = self.repo.save_stats(&self.stats) {
                error!("Failed to save stats: {}", e);
            }
        }
        self.view = View::Statistics;
        self.ui_mode = UiMode::Normal;
    }

    pub fn open_statistics(&mut self) {
        self.open_statistics_at(Utc::now());
    }

    /// Return to the running session's timer screen
    pub fn open_pomodoro(&mut self) {
        if self.session.is_some() {
            self.view = View::Pomodoro;
        }
    }

    /// Leave the timer screen; the session keeps counting in the background
    pub fn leave_pomodoro(&mut self) {
        let task_id = self.session.as_ref().and_then(|s| s.task_id()).map(str::to_string);
        match task_id {
            Some(id) => {
                if self.open_task(&id).is_err() {
                    self.go_home();
                }
            }
            None => self.go_home(),
        }
    }

    pub fn move_selection_up(&mut self) {
        match self.view {
            View::Home => self.selected_index = self.selected_index.saturating_sub(1),
            View::TaskDetails => self.selected_subtask = self.selected_subtask.saturating_sub(1),
            View::CreateTask => {
                if let Some(draft) = &mut self.draft {
                    draft.selected = draft.selected.saturating_sub(1);
                }
            }
            View::Onboarding => {
                let choice = self.onboarding.choice_mut();
                *choice = choice.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn move_selection_down(&mut self) {
        match self.view {
            View::Home => {
                if self.selected_index + 1 < self.tasks.len() {
                    self.selected_index += 1;
                }
            }
            View::TaskDetails => {
                let count = self.current_task().map(|t| t.sub_tasks.len()).unwrap_or(0);
                if self.selected_subtask + 1 < count {
                    self.selected_subtask += 1;
                }
            }
            View::CreateTask => {
                if let Some(draft) = &mut self.draft {
                    if draft.selected + 1 < draft.steps.len() {
                        draft.selected += 1;
                    }
                }
            }
            View::Onboarding => {
                let count = self.onboarding.option_count();
                let choice = self.onboarding.choice_mut();
                if *choice + 1 < count {
                    *choice += 1;
                }
            }
            _ => {}
        }
    }

    // ---- Onboarding ----

    /// Confirm the current onboarding step; the last step saves the settings
    pub fn onboarding_confirm(&mut self) {
        if self.onboarding.step + 1 < OnboardingState::STEPS {
            self.onboarding.step += 1;
            return;
        }
        let (hours, _) = DAILY_HOUR_OPTIONS[self.onboarding.hours_choice.min(DAILY_HOUR_OPTIONS.len() - 1)];
        let time = ProductiveTime::all()[self.onboarding.time_choice.min(ProductiveTime::all().len() - 1)];
        let preset = POMODORO_PRESETS[self.onboarding.preset_choice.min(POMODORO_PRESETS.len() - 1)];
        self.complete_onboarding(hours, time, preset.work, preset.rest);
    }

    pub fn onboarding_back(&mut self) {
        self.onboarding.step = self.onboarding.step.saturating_sub(1);
    }

    /// Re-open onboarding to change preferences
    pub fn restart_onboarding(&mut self) {
        self.onboarding = OnboardingState::from_settings(&self.settings);
        self.view = View::Onboarding;
        self.ui_mode = UiMode::Normal;
    }

    pub fn complete_onboarding(&mut self, daily_hours: u32, productive_time: ProductiveTime, pomodoro_length: f64, break_length: f64) {
        self.settings.daily_hours = daily_hours;
        self.settings.productive_time = productive_time;
        self.settings.pomodoro_length = pomodoro_length;
        self.settings.break_length = break_length;
        self.settings.is_onboarded = true;
        if let Err(e) = self.repo.save_settings(&self.settings) {
            error!("Failed to save settings: {}", e);
            self.needs_save = true;
        }
        info!("Onboarding complete: {}h/day, {:?}, {} min sessions", daily_hours, productive_time, pomodoro_length);
        self.go_home();
        self.push_sync();
    }

    // ---- Sessions ----

    /// Arm a session on a subtask. Earlier subtasks must all be completed.
    pub fn start_subtask_session(&mut self, task_id: &str, subtask_id: &str) -> Result<(), FocusError> {
        if self.session.is_some() {
            return Err(FocusError::SessionAlreadyActive);
        }
        let index = self.task_or_missing(task_id)?;
        if let Err(err) = self.tasks[index].ensure_startable(subtask_id) {
            if matches!(err, FocusError::SubTaskNotFound { .. }) {
                return Err(self.missing(err));
            }
            warn!("Refusing to start session: {}", err);
            self.set_status(match err {
                FocusError::SubTaskLocked(_) => "Сначала завершите предыдущие шаги",
                _ => "Этот шаг уже выполнен",
            });
            return Err(err);
        }

        let target = SessionTarget::Subtask {
            task_id: task_id.to_string(),
            subtask_id: subtask_id.to_string(),
        };
        self.session = Some(ActiveSession::armed(target, self.settings.pomodoro_duration()));
        self.current_task_id = Some(task_id.to_string());
        self.view = View::Pomodoro;
        self.ui_mode = UiMode::Normal;
        self.status = None;
        Ok(())
    }

    /// Arm the session on the subtask selected in the details view
    pub fn start_selected_subtask(&mut self) {
        let Some((task_id, subtask_id)) = self.selected_subtask_ids() else {
            return;
        };
        if let Err(e) = self.start_subtask_session(&task_id, &subtask_id) {
            if e == FocusError::SessionAlreadyActive {
                self.set_status("Сессия уже идёт");
            }
        }
    }

    /// Arm an unscheduled session. The label is remembered for next time.
    pub fn start_focus_session(&mut self, label: &str) -> Result<(), FocusError> {
        if self.session.is_some() {
            return Err(FocusError::SessionAlreadyActive);
        }
        let label = match label.trim() {
            "" => DEFAULT_FOCUS_LABEL.to_string(),
            other => other.to_string(),
        };
        if let Err(e) = self.repo.save_last_label(&label) {
            warn!("Failed to save focus label: {}", e);
        }
        self.last_label = Some(label.clone());
        self.session = Some(ActiveSession::armed(SessionTarget::Focus { label }, self.settings.pomodoro_duration()));
        self.view = View::Pomodoro;
        self.ui_mode = UiMode::Normal;
        self.status = None;
        Ok(())
    }

    /// Start, pause or resume the armed session
    pub fn toggle_timer_at(&mut self, now: DateTime<Utc>) -> Result<(), FocusError> {
        let session = self.session.as_mut().ok_or(FocusError::NoActiveSession)?;
        session.timer.toggle(now);
        Ok(())
    }

    pub fn toggle_timer(&mut self) {
        if let Err(e) = self.toggle_timer_at(Utc::now()) {
            warn!("{}", e);
        }
    }

    pub fn request_cancel_session(&mut self) {
        if self.session.is_some() {
            self.ui_mode = UiMode::ConfirmCancelSession;
        }
    }

    /// Discard the session without touching stats
    pub fn cancel_session(&mut self) -> Result<(), FocusError> {
        let session = self.session.take().ok_or(FocusError::NoActiveSession)?;
        self.ui_mode = UiMode::Normal;
        info!("Session cancelled: {:?}", session.target);
        match session.target {
            SessionTarget::Subtask { task_id, .. } => {
                if self.open_task(&task_id).is_err() {
                    self.go_home();
                }
            }
            SessionTarget::Focus { .. } => self.go_home(),
        }
        Ok(())
    }

    /// Advance time: completes the session once its countdown is due
    pub fn tick_at(&mut self, now: DateTime<Local>) {
        self.last_tick = Instant::now();
        let due = self
            .session
            .as_ref()
            .map_or(false, |s| s.is_due(now.with_timezone(&Utc)));
        if due {
            if let Err(e) = self.complete_session_at(now) {
                error!("Failed to complete session: {}", e);
            }
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Local::now());
    }

    /// Finish the active session: stats, streak, subtask progress,
    /// achievements, persistence, then the completion modal.
    pub fn complete_session_at(&mut self, now: DateTime<Local>) -> Result<(), FocusError> {
        let mut session = self.session.take().ok_or(FocusError::NoActiveSession)?;

        if let SessionTarget::Subtask { task_id, subtask_id } = &session.target {
            let lookup = self.find_task(task_id).map(|t| t.subtask(subtask_id).is_some());
            match lookup {
                None => return Err(self.missing(FocusError::TaskNotFound(task_id.clone()))),
                Some(false) => {
                    return Err(self.missing(FocusError::SubTaskNotFound {
                        task_id: task_id.clone(),
                        subtask_id: subtask_id.clone(),
                    }))
                }
                Some(true) => {}
            }
        }

        let now_utc = now.with_timezone(&Utc);
        session.timer.complete(now_utc);

        let today = now.date_naive();
        let xp_before = self.stats.xp;
        self.stats
            .apply_session(self.settings.pomodoro_length, today, self.last_session_date);
        self.last_session_date = Some(today);

        let (label, subtask_finished, return_view) = match &session.target {
            SessionTarget::Subtask { task_id, subtask_id } => {
                let task = self
                    .find_task_mut(task_id)
                    .ok_or_else(|| FocusError::TaskNotFound(task_id.clone()))?;
                let finished = task.record_pomodoro(subtask_id)?;
                let title = task.subtask(subtask_id).map(|s| s.title.clone()).unwrap_or_default();
                (title, finished, View::TaskDetails)
            }
            SessionTarget::Focus { label } => (label.clone(), false, View::Home),
        };

        let unlocked = achievements::evaluate(&mut self.stats, now_utc);
        self.persist_completion(today);

        info!(
            "Session complete: {} (sessions {}, streak {}, xp {})",
            label, self.stats.total_sessions, self.stats.current_streak, self.stats.xp
        );
        notifications::notify_session_complete(&label, self.settings.break_length);
        for achievement in &unlocked {
            info!("Achievement unlocked: {}", achievement.id);
            notifications::notify_achievement(achievement.icon, achievement.title);
        }

        self.modal = Some(CompletionModal {
            label,
            break_minutes: self.settings.break_length,
            xp_gained: self.stats.xp - xp_before,
            subtask_finished,
            unlocked,
            micro_break: tips::random_micro_break(),
            return_view,
        });
        self.view = View::Pomodoro;
        self.ui_mode = UiMode::Modal;
        self.push_sync();
        Ok(())
    }

    /// Write the blobs a completed session touched. Failures are logged and
    /// left for the next autosave.
    fn persist_completion(&mut self, today: NaiveDate) {
        let mut failed = false;
        if let Err(e) = self.repo.save_stats(&self.stats) {
            error!("Failed to save stats: {}", e);
            failed = true;
        }
        if let Err(e) = self.repo.save_tasks(&self.tasks) {
            error!("Failed to save tasks: {}", e);
            failed = true;
        }
        if let Err(e) = self.repo.save_last_session_date(today) {
            error!("Failed to save last session date: {}", e);
            failed = true;
        }
        self.needs_save = failed;
    }

    pub fn dismiss_modal(&mut self) {
        if let Some(modal) = self.modal.take() {
            self.ui_mode = UiMode::Normal;
            match modal.return_view {
                View::TaskDetails => match self.current_task_id.clone() {
                    Some(id) => {
                        if self.open_task(&id).is_err() {
                            self.go_home();
                        }
                    }
                    None => self.go_home(),
                },
                _ => self.go_home(),
            }
        }
    }

    // ---- Task creation ----

    pub fn open_create_task(&mut self) {
        self.draft = None;
        self.input_form = Some(InputFormState::new(
            FormPurpose::NewTask,
            vec![("Описание", String::new()), ("Дедлайн (необязательно)", String::new())],
        ));
        self.view = View::CreateTask;
        self.ui_mode = UiMode::EditingForm;
    }

    /// Turn a description into an editable plan preview
    pub fn prepare_draft(&mut self, description: &str, deadline: Option<String>) -> Result<(), FocusError> {
        let title = description.trim();
        if title.is_empty() {
            return Err(FocusError::EmptyDescription);
        }
        self.draft = Some(TaskDraft {
            title: title.to_string(),
            deadline: deadline.filter(|d| !d.trim().is_empty()),
            steps: plan_subtasks(title),
            selected: 0,
        });
        self.view = View::CreateTask;
        self.ui_mode = UiMode::Normal;
        Ok(())
    }

    pub fn draft_adjust_estimate(&mut self, delta: i32) {
        if let Some(draft) = &mut self.draft {
            if let Some(step) = draft.steps.get_mut(draft.selected) {
                step.estimated_pomodoros = (step.estimated_pomodoros as i32 + delta).max(1) as u32;
            }
        }
    }

    /// Drop the selected step; the last remaining step stays
    pub fn draft_remove_step(&mut self) {
        if let Some(draft) = &mut self.draft {
            if draft.steps.len() > 1 && draft.selected < draft.steps.len() {
                draft.steps.remove(draft.selected);
                draft.selected = draft.selected.min(draft.steps.len() - 1);
            }
        }
    }

    pub fn draft_start_rename(&mut self) {
        if let Some(draft) = &self.draft {
            if let Some(step) = draft.steps.get(draft.selected) {
                self.input_form = Some(InputFormState::new(
                    FormPurpose::RenameDraftStep(draft.selected),
                    vec![("Название шага", step.title.clone())],
                ));
                self.ui_mode = UiMode::EditingForm;
            }
        }
    }

    /// Save the previewed plan as a new task and open it
    pub fn save_draft_at(&mut self, now: DateTime<Utc>) -> Result<String, FocusError> {
        let draft = self.draft.take().ok_or(FocusError::EmptyDescription)?;
        let id = self.create_task(&draft.title, draft.deadline.clone(), &draft.steps, now)?;
        self.open_task(&id)?;
        Ok(id)
    }

    pub fn save_draft(&mut self) {
        if let Err(e) = self.save_draft_at(Utc::now()) {
            warn!("Failed to create task: {}", e);
        }
    }

    /// Append a new task built from a plan
    pub fn create_task(&mut self, title: &str, deadline: Option<String>, plan: &[PlannedStep], now: DateTime<Utc>) -> Result<String, FocusError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FocusError::EmptyDescription);
        }
        if let Some(step) = plan.iter().find(|s| s.estimated_pomodoros < 1) {
            return Err(FocusError::InvalidEstimate(step.estimated_pomodoros));
        }
        let id = next_task_id(&self.tasks, now);
        let task = Task::new(id.clone(), title.to_string(), deadline, plan, now);
        info!("Created task {} with {} steps / {} pomodoros", id, task.sub_tasks.len(), task.total_pomodoros);
        self.tasks.push(task);
        self.needs_save = true;
        Ok(id)
    }

    // ---- Task and subtask edits ----

    fn selected_subtask_ids(&self) -> Option<(String, String)> {
        let task = self.current_task()?;
        let subtask = task.sub_tasks.get(self.selected_subtask)?;
        Some((task.id.clone(), subtask.id.clone()))
    }

    pub fn rename_subtask(&mut self, task_id: &str, subtask_id: &str, title: &str) -> Result<(), FocusError> {
        let index = self.task_or_missing(task_id)?;
        match self.tasks[index].rename_subtask(subtask_id, title) {
            Err(err @ FocusError::SubTaskNotFound { .. }) => Err(self.missing(err)),
            other => {
                self.needs_save |= other.is_ok();
                other
            }
        }
    }

    pub fn resize_subtask(&mut self, task_id: &str, subtask_id: &str, estimate: u32) -> Result<(), FocusError> {
        let index = self.task_or_missing(task_id)?;
        match self.tasks[index].resize_subtask(subtask_id, estimate) {
            Err(err @ FocusError::SubTaskNotFound { .. }) => Err(self.missing(err)),
            other => {
                self.needs_save |= other.is_ok();
                other
            }
        }
    }

    pub fn resize_selected_subtask(&mut self, delta: i32) {
        let Some((task_id, subtask_id)) = self.selected_subtask_ids() else {
            return;
        };
        let current = self
            .find_task(&task_id)
            .and_then(|t| t.subtask(&subtask_id))
            .map(|s| s.estimated_pomodoros)
            .unwrap_or(1);
        let estimate = (current as i32 + delta).max(0) as u32;
        if let Err(e) = self.resize_subtask(&task_id, &subtask_id, estimate) {
            self.set_status(e.to_string());
        }
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<(), FocusError> {
        if self.session_bound_to(task_id, Some(subtask_id)) {
            return Err(FocusError::SessionAlreadyActive);
        }
        let index = self.task_or_missing(task_id)?;
        match self.tasks[index].delete_subtask(subtask_id) {
            Ok(removed) => {
                info!("Deleted subtask {} from {}", removed.id, task_id);
                let count = self.tasks[index].sub_tasks.len();
                self.selected_subtask = self.selected_subtask.min(count.saturating_sub(1));
                self.needs_save = true;
                Ok(())
            }
            Err(err) => Err(self.missing(err)),
        }
    }

    pub fn delete_selected_subtask(&mut self) {
        if let Some((task_id, subtask_id)) = self.selected_subtask_ids() {
            if let Err(e) = self.delete_subtask(&task_id, &subtask_id) {
                self.set_status(e.to_string());
            }
        }
    }

    /// Remove a task; leaves the details view if it was showing it
    pub fn delete_task(&mut self, task_id: &str) -> Result<Task, FocusError> {
        if self.session_bound_to(task_id, None) {
            return Err(FocusError::SessionAlreadyActive);
        }
        let index = self.task_or_missing(task_id)?;
        let removed = self.tasks.remove(index);
        info!("Deleted task {}", removed.id);
        self.needs_save = true;
        if self.current_task_id.as_deref() == Some(task_id) {
            self.go_home();
        }
        self.selected_index = self.selected_index.min(self.tasks.len().saturating_sub(1));
        Ok(removed)
    }

    pub fn request_delete_task(&mut self) {
        let exists = match self.view {
            View::TaskDetails => self.current_task().is_some(),
            _ => self.tasks.get(self.selected_index).is_some(),
        };
        if exists {
            self.ui_mode = UiMode::ConfirmDeleteTask;
        }
    }

    pub fn confirm_delete_task(&mut self) {
        self.ui_mode = UiMode::Normal;
        let id = match self.view {
            View::TaskDetails => self.current_task_id.clone(),
            _ => self.tasks.get(self.selected_index).map(|t| t.id.clone()),
        };
        if let Some(id) = id {
            if let Err(e) = self.delete_task(&id) {
                self.set_status(e.to_string());
            }
        }
    }

    /// Check a subtask off in one step, granting the configured bonus XP
    pub fn toggle_subtask_done_at(&mut self, task_id: &str, subtask_id: &str, now: DateTime<Utc>) -> Result<(), FocusError> {
        if self.session_bound_to(task_id, Some(subtask_id)) {
            return Err(FocusError::SessionAlreadyActive);
        }
        let index = self.task_or_missing(task_id)?;
        match self.tasks[index].check_subtask(subtask_id) {
            Err(err @ FocusError::SubTaskNotFound { .. }) => return Err(self.missing(err)),
            Err(err) => return Err(err),
            Ok(()) => {}
        }
        self.needs_save = true;

        if self.subtask_bonus_xp > 0 {
            self.stats.add_xp(self.subtask_bonus_xp);
            for achievement in achievements::evaluate(&mut self.stats, now) {
                info!("Achievement unlocked: {}", achievement.id);
            }
        }
        Ok(())
    }

    pub fn toggle_selected_subtask_done(&mut self) {
        if let Some((task_id, subtask_id)) = self.selected_subtask_ids() {
            if let Err(e) = self.toggle_subtask_done_at(&task_id, &subtask_id, Utc::now()) {
                self.set_status(e.to_string());
            }
        }
    }

    pub fn start_rename_selected_subtask(&mut self) {
        let Some((task_id, subtask_id)) = self.selected_subtask_ids() else {
            return;
        };
        let title = self
            .find_task(&task_id)
            .and_then(|t| t.subtask(&subtask_id))
            .map(|s| s.title.clone())
            .unwrap_or_default();
        self.input_form = Some(InputFormState::new(
            FormPurpose::RenameSubtask { task_id, subtask_id },
            vec![("Название шага", title)],
        ));
        self.ui_mode = UiMode::EditingForm;
    }

    pub fn open_focus_form(&mut self) {
        if self.session.is_some() {
            self.view = View::Pomodoro;
            return;
        }
        let label = self.last_label.clone().unwrap_or_default();
        self.input_form = Some(InputFormState::new(FormPurpose::FocusLabel, vec![("Над чем работаем?", label)]));
        self.ui_mode = UiMode::EditingForm;
    }

    pub fn new_quote(&mut self) {
        self.quote = tips::random_quote();
    }

    // ---- Form editing ----

    pub fn input_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.editing_field = (form.editing_field + 1) % form.fields.len().max(1);
        }
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            let field = form.editing_field;
            if let Some((_, value)) = form.fields.get_mut(field) {
                value.push(c);
            }
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            let field = form.editing_field;
            if let Some((_, value)) = form.fields.get_mut(field) {
                value.pop();
            }
        }
    }

    pub fn submit_input_form(&mut self) {
        let Some(form) = self.input_form.take() else {
            return;
        };
        self.ui_mode = UiMode::Normal;
        let result = match &form.purpose {
            FormPurpose::NewTask => {
                let deadline = Some(form.value(1).to_string());
                self.prepare_draft(form.value(0), deadline)
            }
            FormPurpose::FocusLabel => self.start_focus_session(form.value(0)),
            FormPurpose::RenameSubtask { task_id, subtask_id } => self.rename_subtask(task_id, subtask_id, form.value(0)),
            FormPurpose::RenameDraftStep(index) => {
                let title = form.value(0);
                if title.is_empty() {
                    Err(FocusError::EmptyDescription)
                } else {
                    if let Some(step) = self.draft.as_mut().and_then(|d| d.steps.get_mut(*index)) {
                        step.title = title.to_string();
                    }
                    Ok(())
                }
            }
        };

        if let Err(e) = result {
            self.set_status(e.to_string());
            // Keep the create form open on an empty description
            if form.purpose == FormPurpose::NewTask {
                self.input_form = Some(form);
                self.ui_mode = UiMode::EditingForm;
            }
        }
    }

    pub fn cancel_input_form(&mut self) {
        let purpose = self.input_form.take().map(|f| f.purpose);
        self.ui_mode = UiMode::Normal;
        if purpose == Some(FormPurpose::NewTask) {
            self.go_home();
        }
    }

    // ---- Persistence ----

    /// Save settings, tasks and stats
    pub fn save(&mut self) -> Result<()> {
        self.repo.save_settings(&self.settings).context("Failed to save settings")?;
        self.repo.save_tasks(&self.tasks).context("Failed to save tasks")?;
        self.repo.save_stats(&self.stats).context("Failed to save stats")?;
        self.needs_save = false;
        self.push_sync();
        Ok(())
    }

    /// Push a snapshot to the relay in the background, if bound
    fn push_sync(&self) {
        if let Some(client) = &self.sync {
            client.push_in_background(client.payload(&self.settings, &self.tasks, &self.stats));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimerState;
    use crate::persistence::{FileStore, MemoryStore};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn create_test_app() -> AppState {
        let mut app = AppState::new(FocusRepository::new(Box::new(MemoryStore::default())));
        app.complete_onboarding(4, ProductiveTime::Morning, 25.0, 5.0);
        app
    }

    fn noon(day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap()
    }

    /// Arm, start and run a session to completion at `start`
    fn run_subtask_session(app: &mut AppState, task_id: &str, subtask_id: &str, start: DateTime<Local>) {
        app.start_subtask_session(task_id, subtask_id).unwrap();
        app.toggle_timer_at(start.with_timezone(&Utc)).unwrap();
        app.tick_at(start + Duration::minutes(25));
        assert!(app.modal.is_some());
        app.dismiss_modal();
    }

    fn run_focus_session(app: &mut AppState, start: DateTime<Local>) {
        app.start_focus_session("Reading").unwrap();
        app.toggle_timer_at(start.with_timezone(&Utc)).unwrap();
        app.tick_at(start + Duration::minutes(25));
        app.dismiss_modal();
    }

    fn create_exam_task(app: &mut AppState) -> String {
        app.prepare_draft("подготовиться к экзамену", None).unwrap();
        app.save_draft_at(Utc::now()).unwrap()
    }

    #[test]
    fn test_app_starts_in_onboarding() {
        let app = AppState::new(FocusRepository::new(Box::new(MemoryStore::default())));
        assert_eq!(app.view, View::Onboarding);
        assert_eq!(app.stats.level, 1);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_onboarding_flow_saves_choices() {
        let mut app = AppState::new(FocusRepository::new(Box::new(MemoryStore::default())));
        // Daily hours: pick "6+"
        app.move_selection_down();
        app.move_selection_down();
        app.onboarding_confirm();
        // Productive time: pick evening
        app.move_selection_down();
        app.move_selection_down();
        app.onboarding_confirm();
        // Preset: intense 50/10
        app.move_selection_down();
        app.onboarding_confirm();

        assert_eq!(app.view, View::Home);
        assert!(app.settings.is_onboarded);
        assert_eq!(app.settings.daily_hours, 6);
        assert_eq!(app.settings.productive_time, ProductiveTime::Evening);
        assert_eq!(app.settings.pomodoro_length, 50.0);
        assert_eq!(app.settings.break_length, 10.0);
    }

    #[test]
    fn test_exam_scenario() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        assert_eq!(app.view, View::TaskDetails);

        let task = app.find_task(&task_id).unwrap();
        assert_eq!(task.sub_tasks.len(), 5);
        assert_eq!(task.total_pomodoros, 12);
        let first = task.sub_tasks[0].id.clone();
        let estimate = task.sub_tasks[0].estimated_pomodoros;
        assert_eq!(estimate, 2);

        for n in 1..=estimate {
            run_subtask_session(&mut app, &task_id, &first, noon(10) + Duration::hours(n as i64));
            let subtask = app.find_task(&task_id).unwrap().subtask(&first).unwrap().clone();
            assert_eq!(subtask.completed_pomodoros, n);
            assert_eq!(subtask.completed, n == estimate);
        }

        let task = app.find_task(&task_id).unwrap();
        assert_eq!(task.completed_pomodoros, 2);
        assert_eq!(app.stats.total_sessions, 2);
        assert_eq!(app.stats.xp, 20);
        // Back on the details view after dismissing
        assert_eq!(app.view, View::TaskDetails);
    }

    #[test]
    fn test_session_xp_and_level() {
        let mut app = create_test_app();
        for i in 0..12 {
            let xp_before = app.stats.xp;
            run_focus_session(&mut app, noon(10) + Duration::minutes(30 * i));
            assert_eq!(app.stats.xp, xp_before + 10);
            assert_eq!(app.stats.level, app.stats.xp / 100 + 1);
        }
        assert_eq!(app.stats.level, 2);
        assert_eq!(app.stats.total_focus_time, 300.0);
    }

    #[test]
    fn test_streak_over_days() {
        let mut app = create_test_app();
        run_focus_session(&mut app, noon(10));
        run_focus_session(&mut app, noon(10) + Duration::hours(1));
        assert_eq!(app.stats.current_streak, 1);

        run_focus_session(&mut app, noon(11));
        assert_eq!(app.stats.current_streak, 2);

        run_focus_session(&mut app, noon(14));
        assert_eq!(app.stats.current_streak, 1);
        assert_eq!(app.stats.longest_streak, 2);
    }

    #[test]
    fn test_completion_modal_contents() {
        let mut app = create_test_app();
        app.start_focus_session("Essay").unwrap();
        app.toggle_timer_at(noon(10).with_timezone(&Utc)).unwrap();
        app.tick_at(noon(10) + Duration::minutes(25));

        assert_eq!(app.ui_mode, UiMode::Modal);
        let modal = app.modal.clone().unwrap();
        assert_eq!(modal.label, "Essay");
        assert_eq!(modal.break_minutes, 5.0);
        assert_eq!(modal.xp_gained, 10);
        let unlocked: Vec<&str> = modal.unlocked.iter().map(|a| a.id).collect();
        assert_eq!(unlocked, vec!["first_steps"]);
        assert!(tips::MICRO_BREAKS.contains(&modal.micro_break));
        assert!(app.session.is_none());
    }

    #[test]
    fn test_session_not_due_before_time() {
        let mut app = create_test_app();
        app.start_focus_session("Essay").unwrap();
        app.toggle_timer_at(noon(10).with_timezone(&Utc)).unwrap();
        app.tick_at(noon(10) + Duration::minutes(24));
        assert!(app.modal.is_none());
        assert_eq!(app.session.as_ref().unwrap().timer.state(), TimerState::Running);
    }

    #[test]
    fn test_armed_session_waits_for_start() {
        let mut app = create_test_app();
        app.start_focus_session("Essay").unwrap();
        app.tick_at(noon(10) + Duration::hours(3));
        assert!(app.modal.is_none());
        assert_eq!(app.session.as_ref().unwrap().timer.state(), TimerState::Armed);
    }

    #[test]
    fn test_second_session_rejected() {
        let mut app = create_test_app();
        app.start_focus_session("One").unwrap();
        assert_eq!(app.start_focus_session("Two"), Err(FocusError::SessionAlreadyActive));
    }

    #[test]
    fn test_gating_blocks_later_subtask() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        let third = app.find_task(&task_id).unwrap().sub_tasks[2].id.clone();

        let err = app.start_subtask_session(&task_id, &third).unwrap_err();
        assert_eq!(err, FocusError::SubTaskLocked(third));
        assert!(app.session.is_none());
        assert!(app.status.is_some());
    }

    #[test]
    fn test_missing_task_routes_home() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        assert_eq!(app.view, View::TaskDetails);

        let err = app.start_subtask_session("task-404", "x").unwrap_err();
        assert_eq!(err, FocusError::TaskNotFound("task-404".to_string()));
        assert_eq!(app.view, View::Home);

        app.open_task(&task_id).unwrap();
        let err = app.start_subtask_session(&task_id, "nope").unwrap_err();
        assert!(matches!(err, FocusError::SubTaskNotFound { .. }));
        assert_eq!(app.view, View::Home);
    }

    #[test]
    fn test_cancel_keeps_label_and_stats() {
        let mut app = create_test_app();
        app.start_focus_session("Deep work").unwrap();
        app.toggle_timer_at(noon(10).with_timezone(&Utc)).unwrap();
        app.cancel_session().unwrap();

        assert!(app.session.is_none());
        assert_eq!(app.stats.total_sessions, 0);
        assert_eq!(app.last_label.as_deref(), Some("Deep work"));
        assert_eq!(app.view, View::Home);

        app.open_focus_form();
        assert_eq!(app.input_form.as_ref().unwrap().value(0), "Deep work");
    }

    #[test]
    fn test_empty_focus_label_uses_default() {
        let mut app = create_test_app();
        app.start_focus_session("   ").unwrap();
        assert_eq!(app.last_label.as_deref(), Some(DEFAULT_FOCUS_LABEL));
    }

    #[test]
    fn test_delete_current_task_routes_home() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        assert_eq!(app.view, View::TaskDetails);

        app.request_delete_task();
        assert_eq!(app.ui_mode, UiMode::ConfirmDeleteTask);
        app.confirm_delete_task();

        assert!(app.find_task(&task_id).is_none());
        assert_eq!(app.view, View::Home);
        assert!(app.needs_save);
    }

    #[test]
    fn test_cannot_delete_task_under_session() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        let first = app.find_task(&task_id).unwrap().sub_tasks[0].id.clone();
        app.start_subtask_session(&task_id, &first).unwrap();

        assert_eq!(app.delete_task(&task_id).unwrap_err(), FocusError::SessionAlreadyActive);
        assert!(app.find_task(&task_id).is_some());
    }

    #[test]
    fn test_resize_and_delete_keep_aggregates() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        let ids: Vec<String> = app.find_task(&task_id).unwrap().sub_tasks.iter().map(|s| s.id.clone()).collect();

        run_subtask_session(&mut app, &task_id, &ids[0], noon(10));
        app.resize_subtask(&task_id, &ids[1], 6).unwrap();
        app.delete_subtask(&task_id, &ids[4]).unwrap();

        let task = app.find_task(&task_id).unwrap();
        let total: u32 = task.sub_tasks.iter().map(|s| s.estimated_pomodoros).sum();
        let done: u32 = task.sub_tasks.iter().map(|s| s.completed_pomodoros).sum();
        assert_eq!(task.total_pomodoros, total);
        assert_eq!(task.completed_pomodoros, done);
        assert_eq!(task.total_pomodoros, 13);
    }

    #[test]
    fn test_subtask_checkbox_bonus_defaults_to_zero() {
        let mut app = create_test_app();
        let task_id = create_exam_task(&mut app);
        let first = app.find_task(&task_id).unwrap().sub_tasks[0].id.clone();

        app.toggle_subtask_done_at(&task_id, &first, Utc::now()).unwrap();
        assert!(app.find_task(&task_id).unwrap().sub_tasks[0].completed);
        assert_eq!(app.stats.xp, 0);
        assert_eq!(app.stats.total_sessions, 0);
    }

    #[test]
    fn test_subtask_checkbox_bonus_when_configured() {
        let mut app = create_test_app();
        app.subtask_bonus_xp = 5;
        let task_id = create_exam_task(&mut app);
        let second = app.find_task(&task_id).unwrap().sub_tasks[1].id.clone();

        app.toggle_subtask_done_at(&task_id, &second, Utc::now()).unwrap();
        assert_eq!(app.stats.xp, 5);
        assert!(matches!(
            app.toggle_subtask_done_at(&task_id, &second, Utc::now()),
            Err(FocusError::SubTaskAlreadyDone(_))
        ));
        assert_eq!(app.stats.xp, 5);
    }

    #[test]
    fn test_statistics_view_repairs_achievements() {
        let mut app = create_test_app();
        app.stats.total_sessions = 8;
        app.open_statistics_at(Utc::now());
        assert_eq!(app.view, View::Statistics);
        assert!(app.stats.has_achievement("first_steps"));
        assert!(app.stats.has_achievement("weekly_warrior"));

        let count = app.stats.achievements.len();
        app.open_statistics_at(Utc::now());
        assert_eq!(app.stats.achievements.len(), count);
    }

    #[test]
    fn test_draft_editing() {
        let mut app = create_test_app();
        app.open_create_task();
        for c in "Курсовая работа".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form();

        let draft = app.draft.clone().unwrap();
        assert_eq!(draft.steps.len(), 5);

        app.move_selection_down();
        app.draft_remove_step();
        app.draft_adjust_estimate(1);
        app.draft_start_rename();
        for _ in 0..40 {
            app.input_form_backspace();
        }
        for c in "Конспект".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form();

        let draft = app.draft.clone().unwrap();
        assert_eq!(draft.steps.len(), 4);
        assert_eq!(draft.steps[1].title, "Конспект");
        assert_eq!(draft.steps[1].estimated_pomodoros, 3);
        assert_eq!(draft.total_pomodoros(), 10);

        let id = app.save_draft_at(Utc::now()).unwrap();
        assert_eq!(app.find_task(&id).unwrap().total_pomodoros, 10);
    }

    #[test]
    fn test_empty_description_keeps_form_open() {
        let mut app = create_test_app();
        app.open_create_task();
        app.submit_input_form();
        assert!(app.draft.is_none());
        assert_eq!(app.ui_mode, UiMode::EditingForm);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_completion_is_persisted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let open = || AppState::new(FocusRepository::new(Box::new(FileStore::new(temp_dir.path()))));

        let mut app = open();
        app.complete_onboarding(2, ProductiveTime::Afternoon, 25.0, 5.0);
        let task_id = create_exam_task(&mut app);
        app.save().unwrap();
        let first = app.find_task(&task_id).unwrap().sub_tasks[0].id.clone();
        run_subtask_session(&mut app, &task_id, &first, noon(10));

        let reopened = open();
        assert_eq!(reopened.view, View::Home);
        assert_eq!(reopened.stats.total_sessions, 1);
        assert_eq!(reopened.stats.current_streak, 1);
        assert_eq!(reopened.last_session_date, Some(noon(10).date_naive()));
        assert_eq!(reopened.find_task(&task_id).unwrap().completed_pomodoros, 1);
    }
}
