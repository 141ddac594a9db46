//! The interactive confirm/edit loop.
//!
//! One `ask` invocation translates the request once, then cycles: render the
//! candidate command, check its danger while the explanation request is
//! already in flight, render warning and explanation, and act on the user's
//! choice until the command is executed or the user leaves.

use std::sync::Arc;
use tracing::warn;

use crate::backend::Backend;
use crate::error::{AppError, AssessError, EditError, TranslateError};
use crate::executor::ShellExecutor;
use crate::session::{DangerAssessment, Session, UserChoice};
use crate::ui::Ui;

pub struct Assistant {
    backend: Arc<dyn Backend>,
    ui: Arc<dyn Ui>,
    executor: Arc<ShellExecutor>,
}

fn join_error(err: tokio::task::JoinError) -> AppError {
    AppError::Other(anyhow::anyhow!("background task failed: {err}"))
}

impl Assistant {
    pub fn new(backend: Arc<dyn Backend>, ui: Arc<dyn Ui>, executor: Arc<ShellExecutor>) -> Self {
        Self {
            backend,
            ui,
            executor,
        }
    }

    /// Drives one natural-language request to execution or exit.
    ///
    /// Translation failure is fatal and reported before anything is rendered.
    /// Inside the loop only two failures are swallowed: an unparseable danger
    /// assessment (degrades to "not dangerous") and an unusable revision (the
    /// prior command is kept). Everything else unwinds to the caller.
    pub async fn run(&self, prompt: &str) -> Result<(), AppError> {
        let command = match self.backend.translate(prompt).await {
            Ok(command) => command,
            Err(TranslateError::NoCommand) => return Err(AppError::Translation),
            Err(TranslateError::Backend(err)) => return Err(err.into()),
        };

        let mut session = Session::new(prompt, command);

        loop {
            if session.first_run {
                session.first_run = false;
            } else if !session.edit_prompt.is_empty() {
                match self
                    .backend
                    .edit(&session.command, &session.edit_prompt)
                    .await
                {
                    Ok(revised) => session.command = revised,
                    Err(EditError::Unusable) => {
                        warn!("Revision produced nothing usable; keeping the current command");
                    }
                    Err(EditError::Backend(err)) => return Err(err.into()),
                }
            }

            self.ui.show_command(&session.command);

            // The explanation request goes out first so it overlaps with the
            // danger check; it is joined only after the warning is rendered.
            let explanation_task = {
                let backend = self.backend.clone();
                let command = session.command.clone();
                tokio::spawn(async move { backend.explain(&command).await })
            };

            let assessment = match self.backend.assess_danger(&session.command).await {
                Ok(assessment) => assessment,
                Err(AssessError::Unrecognized) => DangerAssessment::safe(),
                Err(AssessError::Backend(err)) => {
                    explanation_task.abort();
                    return Err(err.into());
                }
            };

            if assessment.is_dangerous {
                self.ui.show_warning(&assessment.consequences);
            }

            let explanation = explanation_task.await.map_err(join_error)??;
            self.ui.show_explanation(&explanation);

            session.edit_prompt.clear();

            let choice = {
                let ui = self.ui.clone();
                tokio::task::spawn_blocking(move || ui.choose_action())
                    .await
                    .map_err(join_error)??
            };

            match choice {
                UserChoice::Exit => return Ok(()),
                UserChoice::ReviseQuery => {
                    let ui = self.ui.clone();
                    session.edit_prompt = tokio::task::spawn_blocking(move || ui.read_revision())
                        .await
                        .map_err(join_error)??;
                }
                UserChoice::EditManually => {
                    let ui = self.ui.clone();
                    let current = session.command.clone();
                    session.command =
                        tokio::task::spawn_blocking(move || ui.read_manual_edit(&current))
                            .await
                            .map_err(join_error)??;
                }
                UserChoice::RunCommand => {
                    self.executor.run(&session.command)?;
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::executor::ProcessRunner;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::process::{Command, ExitStatus};
    use std::sync::Mutex;

    /// Backend whose answers are scripted per call.
    #[derive(Default)]
    struct MockBackend {
        translation: Mutex<Option<Result<String, TranslateError>>>,
        assessments: Mutex<VecDeque<Result<DangerAssessment, AssessError>>>,
        explanations: Mutex<VecDeque<Result<String, BackendError>>>,
        edits: Mutex<VecDeque<Result<String, EditError>>>,
    }

    impl MockBackend {
        fn translating_to(command: &str) -> Self {
            let backend = Self::default();
            *backend.translation.lock().unwrap() = Some(Ok(command.to_string()));
            backend
        }

        fn with_safe_iterations(self, count: usize) -> Self {
            for _ in 0..count {
                self.assessments
                    .lock()
                    .unwrap()
                    .push_back(Ok(DangerAssessment::safe()));
                self.explanations
                    .lock()
                    .unwrap()
                    .push_back(Ok("explanation".to_string()));
            }
            self
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn translate(&self, _prompt: &str) -> Result<String, TranslateError> {
            self.translation
                .lock()
                .unwrap()
                .take()
                .expect("translate called more than once")
        }

        async fn assess_danger(&self, _command: &str) -> Result<DangerAssessment, AssessError> {
            self.assessments
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected assess_danger call")
        }

        async fn explain(&self, _command: &str) -> Result<String, BackendError> {
            self.explanations
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected explain call")
        }

        async fn edit(&self, _command: &str, _instruction: &str) -> Result<String, EditError> {
            self.edits
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected edit call")
        }
    }

    /// UI that records rendering order and replays scripted input.
    #[derive(Default)]
    struct ScriptedUi {
        events: Mutex<Vec<String>>,
        choices: Mutex<VecDeque<UserChoice>>,
        revisions: Mutex<VecDeque<String>>,
        manual_edits: Mutex<VecDeque<String>>,
    }

    impl ScriptedUi {
        fn choosing(choices: &[UserChoice]) -> Self {
            let ui = Self::default();
            ui.choices.lock().unwrap().extend(choices.iter().cloned());
            ui
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Ui for ScriptedUi {
        fn show_command(&self, command: &str) {
            self.events.lock().unwrap().push(format!("command:{command}"));
        }

        fn show_warning(&self, consequences: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("warning:{consequences}"));
        }

        fn show_explanation(&self, explanation: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("explanation:{explanation}"));
        }

        fn choose_action(&self) -> Result<UserChoice> {
            self.events.lock().unwrap().push("menu".to_string());
            Ok(self
                .choices
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected choose_action call"))
        }

        fn read_revision(&self) -> Result<String> {
            Ok(self
                .revisions
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected read_revision call"))
        }

        fn read_manual_edit(&self, current: &str) -> Result<String> {
            let scripted = self.manual_edits.lock().unwrap().pop_front();
            Ok(scripted.unwrap_or_else(|| current.to_string()))
        }
    }

    /// Runner that records executions and always succeeds.
    struct NullRunner {
        commands: Arc<Mutex<Vec<String>>>,
    }

    impl ProcessRunner for NullRunner {
        fn run_shell(&self, command: &str) -> Result<ExitStatus> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(Command::new("true").status()?)
        }
    }

    fn assistant(
        backend: MockBackend,
        ui: ScriptedUi,
    ) -> (Assistant, Arc<ScriptedUi>, Arc<Mutex<Vec<String>>>) {
        let ui = Arc::new(ui);
        let commands = Arc::new(Mutex::new(Vec::new()));
        let executor = Arc::new(ShellExecutor::with_runner(Box::new(NullRunner {
            commands: commands.clone(),
        })));
        (
            Assistant::new(Arc::new(backend), ui.clone(), executor),
            ui,
            commands,
        )
    }

    #[tokio::test]
    async fn safe_command_renders_without_warning_then_exits() {
        let backend = MockBackend::translating_to("ls -la");
        backend
            .assessments
            .lock()
            .unwrap()
            .push_back(Ok(DangerAssessment::safe()));
        backend
            .explanations
            .lock()
            .unwrap()
            .push_back(Ok("lists files, including hidden ones".to_string()));
        let (assistant, ui, commands) =
            assistant(backend, ScriptedUi::choosing(&[UserChoice::Exit]));

        assistant.run("list files").await.unwrap();

        assert_eq!(
            ui.events(),
            vec![
                "command:ls -la",
                "explanation:lists files, including hidden ones",
                "menu",
            ]
        );
        assert!(commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangerous_command_warns_before_the_explanation() {
        let backend = MockBackend::translating_to("rm -rf /");
        backend.assessments.lock().unwrap().push_back(Ok(DangerAssessment {
            is_dangerous: true,
            consequences: "irreversibly deletes all files".to_string(),
        }));
        backend
            .explanations
            .lock()
            .unwrap()
            .push_back(Ok("removes everything".to_string()));
        let (assistant, ui, _) =
            assistant(backend, ScriptedUi::choosing(&[UserChoice::Exit]));

        assistant.run("delete everything").await.unwrap();

        assert_eq!(
            ui.events(),
            vec![
                "command:rm -rf /",
                "warning:irreversibly deletes all files",
                "explanation:removes everything",
                "menu",
            ]
        );
    }

    #[tokio::test]
    async fn translation_failure_is_fatal_before_any_rendering() {
        let backend = MockBackend::default();
        *backend.translation.lock().unwrap() = Some(Err(TranslateError::NoCommand));
        let (assistant, ui, commands) = assistant(backend, ScriptedUi::default());

        let err = assistant.run("do the impossible").await.unwrap_err();
        assert!(matches!(err, AppError::Translation));
        assert!(ui.events().is_empty());
        assert!(commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn classifier_failure_degrades_to_not_dangerous() {
        let backend = MockBackend::translating_to("ls");
        backend
            .assessments
            .lock()
            .unwrap()
            .push_back(Err(AssessError::Unrecognized));
        backend
            .explanations
            .lock()
            .unwrap()
            .push_back(Ok("lists files".to_string()));
        let (assistant, ui, _) =
            assistant(backend, ScriptedUi::choosing(&[UserChoice::Exit]));

        assistant.run("list files").await.unwrap();

        let events = ui.events();
        assert!(!events.iter().any(|e| e.starts_with("warning:")));
        assert!(events.iter().any(|e| e.starts_with("explanation:")));
    }

    #[tokio::test]
    async fn backend_failure_in_the_classifier_unwinds() {
        let backend = MockBackend::translating_to("ls");
        backend
            .assessments
            .lock()
            .unwrap()
            .push_back(Err(AssessError::Backend(BackendError::RateLimit)));
        backend
            .explanations
            .lock()
            .unwrap()
            .push_back(Ok("never shown".to_string()));
        let (assistant, _, _) = assistant(backend, ScriptedUi::default());

        let err = assistant.run("list files").await.unwrap_err();
        assert!(matches!(err, AppError::Backend(BackendError::RateLimit)));
    }

    #[tokio::test]
    async fn empty_revision_re_renders_the_same_command() {
        let backend = MockBackend::translating_to("ls -la").with_safe_iterations(2);
        let ui = ScriptedUi::choosing(&[UserChoice::ReviseQuery, UserChoice::Exit]);
        ui.revisions.lock().unwrap().push_back(String::new());
        let (assistant, ui, _) = assistant(backend, ui);

        assistant.run("list files").await.unwrap();

        let commands: Vec<_> = ui
            .events()
            .into_iter()
            .filter(|e| e.starts_with("command:"))
            .collect();
        // No edit was scripted; the mock would panic if the backend were asked.
        assert_eq!(commands, vec!["command:ls -la", "command:ls -la"]);
    }

    #[tokio::test]
    async fn failed_revision_keeps_the_prior_command() {
        let backend = MockBackend::translating_to("ls -la").with_safe_iterations(2);
        backend
            .edits
            .lock()
            .unwrap()
            .push_back(Err(EditError::Unusable));
        let ui = ScriptedUi::choosing(&[UserChoice::ReviseQuery, UserChoice::Exit]);
        ui.revisions
            .lock()
            .unwrap()
            .push_back("sort by size".to_string());
        let (assistant, ui, _) = assistant(backend, ui);

        assistant.run("list files").await.unwrap();

        let commands: Vec<_> = ui
            .events()
            .into_iter()
            .filter(|e| e.starts_with("command:"))
            .collect();
        assert_eq!(commands, vec!["command:ls -la", "command:ls -la"]);
    }

    #[tokio::test]
    async fn successful_revision_replaces_the_command() {
        let backend = MockBackend::translating_to("ls -la").with_safe_iterations(2);
        backend
            .edits
            .lock()
            .unwrap()
            .push_back(Ok("ls -laS".to_string()));
        let ui = ScriptedUi::choosing(&[UserChoice::ReviseQuery, UserChoice::Exit]);
        ui.revisions
            .lock()
            .unwrap()
            .push_back("sort by size".to_string());
        let (assistant, ui, _) = assistant(backend, ui);

        assistant.run("list files").await.unwrap();

        let commands: Vec<_> = ui
            .events()
            .into_iter()
            .filter(|e| e.starts_with("command:"))
            .collect();
        assert_eq!(commands, vec!["command:ls -la", "command:ls -laS"]);
    }

    #[tokio::test]
    async fn manual_edit_replaces_the_command_without_a_backend_call() {
        let backend = MockBackend::translating_to("ls -la").with_safe_iterations(2);
        let ui = ScriptedUi::choosing(&[UserChoice::EditManually, UserChoice::RunCommand]);
        ui.manual_edits
            .lock()
            .unwrap()
            .push_back("ls -lah --color".to_string());
        let (assistant, ui, commands) = assistant(backend, ui);

        assistant.run("list files").await.unwrap();

        let rendered: Vec<_> = ui
            .events()
            .into_iter()
            .filter(|e| e.starts_with("command:"))
            .collect();
        assert_eq!(rendered, vec!["command:ls -la", "command:ls -lah --color"]);
        assert_eq!(
            commands.lock().unwrap().as_slice(),
            ["ls -lah --color"]
        );
    }

    #[tokio::test]
    async fn running_the_command_ends_the_loop() {
        let backend = MockBackend::translating_to("df -h").with_safe_iterations(1);
        let (assistant, _, commands) =
            assistant(backend, ScriptedUi::choosing(&[UserChoice::RunCommand]));

        assistant.run("disk usage").await.unwrap();

        assert_eq!(commands.lock().unwrap().as_slice(), ["df -h"]);
    }
}
